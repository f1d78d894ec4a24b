use crate::memory::Word;

/// A pull-based source of values for the input instruction.
///
/// Every iterator over words is an input source, so a finite queue is just
/// `vec![..].into_iter()` and a value offered forever is
/// `std::iter::repeat(value)`.
pub trait Input {
  /// Take the next value, or `None` once the source is exhausted
  fn next_value(&mut self) -> Option<Word>;
}

impl<I> Input for I
where
  I: Iterator<Item = Word>,
{
  fn next_value(&mut self) -> Option<Word> {
    self.next()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::iter;

  #[test]
  fn queue_in_offer_order() {
    let mut input = vec![3 as Word, 1, 2].into_iter();
    assert_eq!(input.next_value(), Some(3));
    assert_eq!(input.next_value(), Some(1));
    assert_eq!(input.next_value(), Some(2));
    assert_eq!(input.next_value(), None);
  }

  #[test]
  fn repeated_scalar_never_runs_out() {
    let mut input = iter::repeat::<Word>(5);
    for _ in 0..100 {
      assert_eq!(input.next_value(), Some(5));
    }
  }
}
