use crate::input::Input;
use crate::memory::{Memory, ParseError, Word};
use crate::opcode::{DecodeError, Instruction, Mode, Opcode};

/// Result of executing a single instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  /// Execution continues at this address
  Continue(usize),
  /// The machine reached a halt instruction
  Halted,
}

/// An Intcode virtual machine.
///
/// The interpreter exclusively owns its memory, so independent machines can
/// run on separate threads as long as each gets its own copy of the program.
#[derive(Debug, Clone)]
pub struct Interpreter<I> {
  // address of the opcode word about to execute
  ip: usize,
  memory: Memory,
  input: I,
  output: Vec<Word>,
}

impl<I> Interpreter<I>
where
  I: Input,
{
  /// Parse `program` and prepare a machine that reads from `input`
  pub fn new(program: &str, input: I) -> Result<Self, Error> {
    let memory = program.parse()?;
    Ok(Self::with_memory(memory, input))
  }

  /// Prepare a machine over an already parsed memory image
  pub fn with_memory(memory: Memory, input: I) -> Self {
    Self {
      ip: 0,
      memory,
      input,
      output: Vec::new(),
    }
  }

  pub fn ip(&self) -> usize {
    self.ip
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn output(&self) -> &[Word] {
    &self.output
  }

  /// Patch a memory cell, typically before the run starts
  pub fn poke(&mut self, address: usize, value: Word) -> Result<(), Error> {
    self.memory.write(address, value).ok_or(Error::Address {
      address: address as Word,
      ip: self.ip,
    })
  }

  /// Give up the machine, keeping its final memory and output
  pub fn into_parts(self) -> (Memory, Vec<Word>) {
    (self.memory, self.output)
  }

  /// Execute the instruction at `ip`.
  ///
  /// On success `ip` already points at the next instruction. A machine
  /// sitting on a halt keeps reporting [`Step::Halted`] without changing.
  pub fn step(&mut self) -> Result<Step, Error> {
    let ip = self.ip;
    let word = self.memory.read(ip).ok_or(Error::Address {
      address: ip as Word,
      ip,
    })?;
    let instruction = Instruction::decode(word).map_err(|err| match err {
      DecodeError::UnknownOpcode(opcode) => Error::UnknownOpcode { opcode, ip },
      DecodeError::UnknownMode(word) => Error::UnknownMode { word, ip },
    })?;
    log::trace!("{ip:>6}: {word:<6} {:?}", instruction.opcode);

    let mut task = Task::new(self, ip, instruction);
    let next = match instruction.opcode {
      Opcode::Add => add(&mut task)?,
      Opcode::Multiply => multiply(&mut task)?,
      Opcode::Input => input(&mut task)?,
      Opcode::Output => output(&mut task)?,
      Opcode::JumpIfTrue => jump_if_true(&mut task)?,
      Opcode::JumpIfFalse => jump_if_false(&mut task)?,
      Opcode::LessThan => less_than(&mut task)?,
      Opcode::Equals => equals(&mut task)?,
      Opcode::Halt => return Ok(Step::Halted),
    };
    self.ip = next;
    Ok(Step::Continue(next))
  }

  /// Step until the machine halts or fails.
  ///
  /// There is no step limit; a program that never halts never returns.
  pub fn run(&mut self) -> Result<(), Error> {
    let mut steps = 0usize;
    while let Step::Continue(_) = self.step()? {
      steps += 1;
    }
    log::debug!("halted at {} after {steps} steps", self.ip);
    Ok(())
  }
}

/// An error that stopped the machine. None of these are recoverable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("malformed program")]
  Parse(#[from] ParseError),

  #[error("unknown opcode {opcode} at address {ip}")]
  UnknownOpcode { opcode: Word, ip: usize },

  #[error("invalid parameter modes in `{word}` at address {ip}")]
  UnknownMode { word: Word, ip: usize },

  #[error("parameter {parameter} of the instruction at address {ip} is written to but uses immediate mode")]
  ImmediateWrite { ip: usize, parameter: usize },

  #[error("address {address} is outside memory (instruction at address {ip})")]
  Address { address: Word, ip: usize },

  #[error("input exhausted at address {ip}")]
  InputExhausted { ip: usize },

  #[error("arithmetic overflow at address {ip}")]
  Overflow { ip: usize },
}

/// The instruction currently executing, with access to its parameters
struct Task<'vm, I> {
  vm: &'vm mut Interpreter<I>,
  ip: usize,
  instruction: Instruction,
}

impl<'vm, I> Task<'vm, I>
where
  I: Input,
{
  fn new(vm: &'vm mut Interpreter<I>, ip: usize, instruction: Instruction) -> Self {
    Self { vm, ip, instruction }
  }

  fn fault(&self, address: Word) -> Error {
    Error::Address {
      address,
      ip: self.ip,
    }
  }

  fn address(&self, address: Word) -> Result<usize, Error> {
    usize::try_from(address).map_err(|_| self.fault(address))
  }

  // raw parameter word, before any mode is applied
  fn param(&self, index: usize) -> Result<Word, Error> {
    let address = self.ip + 1 + index;
    self
      .vm
      .memory
      .read(address)
      .ok_or_else(|| self.fault(address as Word))
  }

  fn operand(&self, index: usize) -> Result<Word, Error> {
    let raw = self.param(index)?;
    match self.instruction.mode(index) {
      Mode::Immediate => Ok(raw),
      Mode::Position => {
        let address = self.address(raw)?;
        self.vm.memory.read(address).ok_or_else(|| self.fault(raw))
      }
    }
  }

  fn destination(&self, index: usize) -> Result<usize, Error> {
    if self.instruction.mode(index) == Mode::Immediate {
      return Err(Error::ImmediateWrite {
        ip: self.ip,
        parameter: index + 1,
      });
    }
    let raw = self.param(index)?;
    let address = self.address(raw)?;
    if address >= self.vm.memory.len() {
      return Err(self.fault(raw));
    }
    Ok(address)
  }

  fn store(&mut self, address: usize, value: Word) -> Result<(), Error> {
    match self.vm.memory.write(address, value) {
      Some(()) => Ok(()),
      None => Err(self.fault(address as Word)),
    }
  }

  fn advance(&self) -> usize {
    self.ip + self.instruction.opcode.width()
  }

  fn jump(&self, target: Word) -> Result<usize, Error> {
    self.address(target)
  }
}

// m[c] ← a + b
fn add<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.operand(0)?;
  let b = task.operand(1)?;
  let c = task.destination(2)?;
  let sum = a.checked_add(b).ok_or(Error::Overflow { ip: task.ip })?;
  task.store(c, sum)?;
  Ok(task.advance())
}

// m[c] ← a × b
fn multiply<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.operand(0)?;
  let b = task.operand(1)?;
  let c = task.destination(2)?;
  let product = a.checked_mul(b).ok_or(Error::Overflow { ip: task.ip })?;
  task.store(c, product)?;
  Ok(task.advance())
}

// m[a] ← next(input)
fn input<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.destination(0)?;
  let value = task
    .vm
    .input
    .next_value()
    .ok_or(Error::InputExhausted { ip: task.ip })?;
  log::debug!("read {value} into {a}");
  task.store(a, value)?;
  Ok(task.advance())
}

// output ← a
fn output<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.operand(0)?;
  task.vm.output.push(a);
  Ok(task.advance())
}

// if a ≠ 0 : ip ← b
fn jump_if_true<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.operand(0)?;
  let b = task.operand(1)?;
  if a != 0 {
    task.jump(b)
  } else {
    Ok(task.advance())
  }
}

// if a = 0 : ip ← b
fn jump_if_false<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.operand(0)?;
  let b = task.operand(1)?;
  if a == 0 {
    task.jump(b)
  } else {
    Ok(task.advance())
  }
}

// m[c] ← a < b ? 1 : 0
fn less_than<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.operand(0)?;
  let b = task.operand(1)?;
  let c = task.destination(2)?;
  task.store(c, Word::from(a < b))?;
  Ok(task.advance())
}

// m[c] ← a = b ? 1 : 0
fn equals<I: Input>(task: &mut Task<'_, I>) -> Result<usize, Error> {
  let a = task.operand(0)?;
  let b = task.operand(1)?;
  let c = task.destination(2)?;
  task.store(c, Word::from(a == b))?;
  Ok(task.advance())
}
