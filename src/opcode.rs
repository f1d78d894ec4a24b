use crate::memory::Word;

/// Operation selector, the two least significant decimal digits of an
/// instruction word.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// | Operation | Semantics            | Width |
  /// |-----------|----------------------|-------|
  /// | Add       | `m[c] ← a + b`       | 4     |
  Add = 1,

  /// | Operation | Semantics            | Width |
  /// |-----------|----------------------|-------|
  /// | Multiply  | `m[c] ← a × b`       | 4     |
  Multiply = 2,

  /// Pulls the next value from the input source.
  ///
  /// | Operation | Semantics            | Width |
  /// |-----------|----------------------|-------|
  /// | Input     | `m[a] ← next(input)` | 2     |
  Input = 3,

  /// | Operation | Semantics            | Width |
  /// |-----------|----------------------|-------|
  /// | Output    | `output ← a`         | 2     |
  Output = 4,

  /// | Operation    | Semantics              | Width |
  /// |--------------|------------------------|-------|
  /// | Jump If True | `if a ≠ 0 : ip ← b`    | 3     |
  ///
  /// The width only applies when the branch is not taken.
  JumpIfTrue = 5,

  /// | Operation     | Semantics              | Width |
  /// |---------------|------------------------|-------|
  /// | Jump If False | `if a = 0 : ip ← b`    | 3     |
  ///
  /// The width only applies when the branch is not taken.
  JumpIfFalse = 6,

  /// | Operation | Semantics                  | Width |
  /// |-----------|----------------------------|-------|
  /// | Less Than | `m[c] ← a < b ? 1 : 0`     | 4     |
  LessThan = 7,

  /// | Operation | Semantics                  | Width |
  /// |-----------|----------------------------|-------|
  /// | Equals    | `m[c] ← a = b ? 1 : 0`     | 4     |
  Equals = 8,

  /// | Operation | Semantics          | Width |
  /// |-----------|--------------------|-------|
  /// | Halt      | `(stop execution)` | 1     |
  Halt = 99,
}

impl Opcode {
  /// Number of parameter words following the opcode word
  pub fn parameters(self) -> usize {
    match self {
      Self::Add | Self::Multiply | Self::LessThan | Self::Equals => 3,
      Self::JumpIfTrue | Self::JumpIfFalse => 2,
      Self::Input | Self::Output => 1,
      Self::Halt => 0,
    }
  }

  /// Number of words the instruction occupies, opcode word included
  pub fn width(self) -> usize {
    self.parameters() + 1
  }
}

impl TryFrom<Word> for Opcode {
  type Error = Word;

  fn try_from(value: Word) -> Result<Self, Self::Error> {
    match value {
      1 => Ok(Self::Add),
      2 => Ok(Self::Multiply),
      3 => Ok(Self::Input),
      4 => Ok(Self::Output),
      5 => Ok(Self::JumpIfTrue),
      6 => Ok(Self::JumpIfFalse),
      7 => Ok(Self::LessThan),
      8 => Ok(Self::Equals),
      99 => Ok(Self::Halt),
      other => Err(other),
    }
  }
}

/// How a parameter word is turned into an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  /// The word is an address, the operand is the cell it points at
  #[default]
  Position,
  /// The word is the operand
  Immediate,
}

impl TryFrom<Word> for Mode {
  type Error = Word;

  fn try_from(digit: Word) -> Result<Self, Self::Error> {
    match digit {
      0 => Ok(Self::Position),
      1 => Ok(Self::Immediate),
      other => Err(other),
    }
  }
}

/// Reasons a word cannot be decoded into an [`Instruction`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
  #[error("unknown opcode {0}")]
  UnknownOpcode(Word),

  #[error("invalid parameter modes in instruction word {0}")]
  UnknownMode(Word),
}

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
  pub opcode: Opcode,
  /// Modes for parameters 1, 2 and 3, in that order
  pub modes: [Mode; 3],
}

impl Instruction {
  /// Split a raw word like `1002` into its opcode (`2`) and modes
  /// (`[Position, Immediate, Position]`).
  ///
  /// A word with no digits above the last two gets all-position modes. Mode
  /// digits are read right to left starting at the hundreds place; missing
  /// ones default to [`Mode::Position`].
  pub fn decode(word: Word) -> Result<Self, DecodeError> {
    let raw = word % 100;
    let opcode = Opcode::try_from(raw).map_err(DecodeError::UnknownOpcode)?;
    let mut modes = [Mode::Position; 3];
    if raw != word {
      let mut digits = word / 100;
      for mode in modes.iter_mut() {
        *mode = Mode::try_from(digits % 10).map_err(|_| DecodeError::UnknownMode(word))?;
        digits /= 10;
      }
      // only three parameters ever exist
      if digits != 0 {
        return Err(DecodeError::UnknownMode(word));
      }
    }
    Ok(Self { opcode, modes })
  }

  /// Mode of the parameter at `index` (zero based)
  pub fn mode(&self, index: usize) -> Mode {
    self.modes[index]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use super::Mode::{Immediate, Position};

  #[test]
  fn decode_classic() {
    let instruction = Instruction::decode(1).unwrap();
    assert_eq!(instruction.opcode, Opcode::Add);
    assert_eq!(instruction.modes, [Position; 3]);
  }

  #[test]
  fn decode_complete() {
    let instruction = Instruction::decode(1002).unwrap();
    assert_eq!(instruction.opcode, Opcode::Multiply);
    assert_eq!(instruction.modes, [Position, Immediate, Position]);
  }

  #[test]
  fn decode_all_immediate() {
    let instruction = Instruction::decode(11108).unwrap();
    assert_eq!(instruction.opcode, Opcode::Equals);
    assert_eq!(instruction.modes, [Immediate; 3]);
  }

  #[test]
  fn decode_first_mode_only() {
    let instruction = Instruction::decode(104).unwrap();
    assert_eq!(instruction.opcode, Opcode::Output);
    assert_eq!(instruction.modes, [Immediate, Position, Position]);
  }

  #[test]
  fn decode_halt() {
    assert_eq!(Instruction::decode(99).unwrap().opcode, Opcode::Halt);
  }

  #[test]
  fn decode_unknown_opcode() {
    assert_eq!(Instruction::decode(98), Err(DecodeError::UnknownOpcode(98)));
    assert_eq!(Instruction::decode(0), Err(DecodeError::UnknownOpcode(0)));
    assert_eq!(Instruction::decode(1042), Err(DecodeError::UnknownOpcode(42)));
    assert_eq!(Instruction::decode(-1), Err(DecodeError::UnknownOpcode(-1)));
  }

  #[test]
  fn decode_unknown_mode() {
    assert_eq!(Instruction::decode(201), Err(DecodeError::UnknownMode(201)));
    assert_eq!(Instruction::decode(100001), Err(DecodeError::UnknownMode(100001)));
  }

  #[test]
  fn widths() {
    assert_eq!(Opcode::Add.width(), 4);
    assert_eq!(Opcode::Multiply.width(), 4);
    assert_eq!(Opcode::Input.width(), 2);
    assert_eq!(Opcode::Output.width(), 2);
    assert_eq!(Opcode::JumpIfTrue.width(), 3);
    assert_eq!(Opcode::JumpIfFalse.width(), 3);
    assert_eq!(Opcode::LessThan.width(), 4);
    assert_eq!(Opcode::Equals.width(), 4);
    assert_eq!(Opcode::Halt.width(), 1);
  }
}
