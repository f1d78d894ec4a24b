use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// The type of a single memory cell
pub type Word = i64;

/// A token in the program text that is not a signed decimal integer
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("token {index} (`{token}`) is not an integer")]
pub struct ParseError {
  pub index: usize,
  pub token: String,
  #[source]
  pub source: ParseIntError,
}

/// The single address space shared by code and data.
///
/// Memory never grows; every access is bounds checked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Memory {
  cells: Vec<Word>,
}

impl Memory {
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn as_slice(&self) -> &[Word] {
    &self.cells
  }

  /// Read the cell at `address`, or `None` if it lies outside memory
  pub fn read(&self, address: usize) -> Option<Word> {
    self.cells.get(address).copied()
  }

  /// Overwrite the cell at `address`, or `None` if it lies outside memory
  pub fn write(&mut self, address: usize, value: Word) -> Option<()> {
    self.cells.get_mut(address).map(|prev| {
      *prev = value;
    })
  }
}

impl From<Vec<Word>> for Memory {
  fn from(cells: Vec<Word>) -> Self {
    Self { cells }
  }
}

impl From<Memory> for Vec<Word> {
  fn from(memory: Memory) -> Self {
    memory.cells
  }
}

impl PartialEq<[Word]> for Memory {
  fn eq(&self, other: &[Word]) -> bool {
    self.cells == other
  }
}

impl<const N: usize> PartialEq<[Word; N]> for Memory {
  fn eq(&self, other: &[Word; N]) -> bool {
    self.cells == other
  }
}

impl FromStr for Memory {
  type Err = ParseError;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    let cells = text
      .split(',')
      .enumerate()
      .map(|(index, token)| {
        let token = token.trim();
        token.parse().map_err(|source| ParseError {
          index,
          token: token.to_owned(),
          source,
        })
      })
      .collect::<Result<Vec<Word>, _>>()?;
    Ok(Self { cells })
  }
}

impl fmt::Display for Memory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut cells = self.cells.iter();
    if let Some(first) = cells.next() {
      write!(f, "{first}")?;
      for cell in cells {
        write!(f, ",{cell}")?;
      }
    }
    Ok(())
  }
}
