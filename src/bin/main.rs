//! Run an Intcode program from a file.
//!
//! # Usage
//! ```text
//! intcode <program> [OPTIONS]
//! ```
//!
//! # Options
//! - `-i, --input <n>`: queue a value for the input instruction (repeatable)
//! - `-r, --repeat-input <n>`: offer the same value to every input instruction
//! - `-s, --set <addr>=<value>`: patch a memory cell before running (repeatable)
//! - `-m, --max-steps <n>`: give up after executing `n` instructions
//!
//! Log verbosity follows `RUST_LOG`, e.g. `RUST_LOG=trace` prints every
//! decoded instruction.

use std::env;
use std::fs;
use std::iter;
use std::process;

use intcode::input::Input;
use intcode::memory::Word;
use intcode::vm::{Interpreter, Step};

struct Options {
  path: String,
  input: Vec<Word>,
  repeat_input: Option<Word>,
  patches: Vec<(usize, Word)>,
  max_steps: Option<usize>,
}

fn main() {
  env_logger::init();

  let args: Vec<String> = env::args().collect();
  let options = match parse_args(&args[1..]) {
    Ok(Some(options)) => options,
    Ok(None) => {
      print_usage(&args[0]);
      process::exit(0);
    }
    Err(message) => {
      log::error!("{message}");
      print_usage(&args[0]);
      process::exit(1);
    }
  };

  if let Err(message) = execute(options) {
    log::error!("{message}");
    process::exit(1);
  }
}

fn print_usage(program: &str) {
  eprintln!("Usage: {program} <program> [OPTIONS]");
  eprintln!();
  eprintln!("Options:");
  eprintln!("  -i, --input <n>            queue an input value (repeatable)");
  eprintln!("  -r, --repeat-input <n>     answer every input instruction with <n>");
  eprintln!("  -s, --set <addr>=<value>   patch memory before running (repeatable)");
  eprintln!("  -m, --max-steps <n>        stop after <n> instructions");
  eprintln!("  -h, --help                 show this message");
}

/// Returns `None` when help was requested
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
  let mut path = None;
  let mut input = Vec::new();
  let mut repeat_input = None;
  let mut patches = Vec::new();
  let mut max_steps = None;

  let mut i = 0;
  while i < args.len() {
    let flag = args[i].as_str();
    match flag {
      "--help" | "-h" => return Ok(None),
      "--input" | "-i" => input.push(parse_number(flag, value_of(args, i)?)?),
      "--repeat-input" | "-r" => repeat_input = Some(parse_number(flag, value_of(args, i)?)?),
      "--set" | "-s" => {
        let value = value_of(args, i)?;
        let (address, cell) = value
          .split_once('=')
          .ok_or_else(|| format!("{flag} expects <addr>=<value>, got '{value}'"))?;
        patches.push((parse_number(flag, address)?, parse_number(flag, cell)?));
      }
      "--max-steps" | "-m" => max_steps = Some(parse_number(flag, value_of(args, i)?)?),
      other if other.starts_with('-') => return Err(format!("unknown option '{other}'")),
      other => {
        if path.is_some() {
          return Err(format!("unexpected argument '{other}'"));
        }
        path = Some(other.to_owned());
        i += 1;
        continue;
      }
    }
    i += 2;
  }

  let path = path.ok_or("missing program path")?;
  if repeat_input.is_some() && !input.is_empty() {
    return Err("--input and --repeat-input cannot be combined".to_owned());
  }
  Ok(Some(Options {
    path,
    input,
    repeat_input,
    patches,
    max_steps,
  }))
}

fn value_of(args: &[String], i: usize) -> Result<&str, String> {
  args
    .get(i + 1)
    .map(String::as_str)
    .ok_or_else(|| format!("{} requires an argument", args[i]))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
  value
    .trim()
    .parse()
    .map_err(|_| format!("invalid value for {flag}: '{value}'"))
}

fn execute(options: Options) -> Result<(), String> {
  let source = fs::read_to_string(&options.path)
    .map_err(|err| format!("cannot read {}: {err}", options.path))?;

  let input: Box<dyn Iterator<Item = Word>> = match options.repeat_input {
    Some(value) => Box::new(iter::repeat(value)),
    None => Box::new(options.input.into_iter()),
  };
  let mut vm = Interpreter::new(&source, input).map_err(|err| report(&err))?;
  log::info!("loaded {} cells from {}", vm.memory().len(), options.path);

  for (address, value) in options.patches {
    vm.poke(address, value).map_err(|err| report(&err))?;
  }

  match options.max_steps {
    Some(limit) => run_bounded(&mut vm, limit)?,
    None => vm.run().map_err(|err| report(&err))?,
  }

  for value in vm.output() {
    println!("{value}");
  }
  if let Some(first) = vm.memory().read(0) {
    println!("mem[0] = {first}");
  }
  Ok(())
}

fn run_bounded<I: Input>(vm: &mut Interpreter<I>, limit: usize) -> Result<(), String> {
  for _ in 0..limit {
    if vm.step().map_err(|err| report(&err))? == Step::Halted {
      return Ok(());
    }
  }
  Err(format!("no halt within {limit} steps (ip = {})", vm.ip()))
}

// include the source chain, e.g. the integer parse failure behind a parse error
fn report(err: &dyn std::error::Error) -> String {
  let mut message = err.to_string();
  let mut source = err.source();
  while let Some(cause) = source {
    message.push_str(": ");
    message.push_str(&cause.to_string());
    source = cause.source();
  }
  message
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
  }

  #[test]
  fn help_anywhere() {
    assert!(parse_args(&args("prog.txt --help")).unwrap().is_none());
    assert!(parse_args(&args("-i 5 -h prog.txt")).unwrap().is_none());
  }

  #[test]
  fn flags_before_path() {
    let options = parse_args(&args("-i 5 -i -3 prog.txt -s 1=12 -m 100"))
      .unwrap()
      .unwrap();
    assert_eq!(options.path, "prog.txt");
    assert_eq!(options.input, vec![5, -3]);
    assert_eq!(options.patches, vec![(1, 12)]);
    assert_eq!(options.max_steps, Some(100));
    assert_eq!(options.repeat_input, None);
  }

  #[test]
  fn rejects_bad_arguments() {
    assert!(parse_args(&args("")).is_err());
    assert!(parse_args(&args("-i 5")).is_err());
    assert!(parse_args(&args("prog.txt -i")).is_err());
    assert!(parse_args(&args("prog.txt --verbose")).is_err());
    assert!(parse_args(&args("prog.txt other.txt")).is_err());
    assert!(parse_args(&args("prog.txt -s 12")).is_err());
    assert!(parse_args(&args("prog.txt -i 1 -r 2")).is_err());
  }
}
