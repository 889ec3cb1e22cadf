use crate::HasLength;

/// Character count is used for strings, so multi-byte names are
/// not punished for their encoding.
#[must_use]
pub fn validate_length<T: HasLength + ?Sized>(
  value: &T,
  min: Option<usize>,
  max: Option<usize>,
) -> bool {
  let length = value.length();
  if let Some(m) = min {
    if length < m {
      return false;
    }
  }
  if let Some(m) = max {
    if length > m {
      return false;
    }
  }
  true
}
