use crate::HasLength;

impl HasLength for str {
  fn length(&self) -> usize {
    self.chars().count()
  }
}
