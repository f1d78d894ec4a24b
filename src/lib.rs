//! An Intcode virtual machine
//!
//! Programs are flat, comma separated lists of signed integers that share a
//! single address space for code and data. The machine supports opcodes
//! `1..=8` and `99`, with position and immediate parameter modes.

pub mod input;
pub mod memory;
pub mod opcode;
pub mod vm;
