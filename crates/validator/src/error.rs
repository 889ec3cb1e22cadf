use indexmap::IndexMap;
use serde::{ser::SerializeMap, Serialize};
use std::borrow::Cow;

/// Collects messages for a single value.
#[derive(Debug, Default)]
pub struct MessageBuilder(Vec<Cow<'static, str>>);

impl MessageBuilder {
  #[must_use]
  pub const fn new() -> Self {
    Self(Vec::new())
  }

  pub fn insert(&mut self, message: impl Into<Cow<'static, str>>) -> &mut Self {
    self.0.push(message.into());
    self
  }

  #[must_use]
  pub fn build(&mut self) -> ValidateError {
    ValidateError::Messages(std::mem::take(&mut self.0))
  }
}

/// Collects the errors of a struct, keyed by field name in
/// insertion order.
#[derive(Debug, Default)]
pub struct FieldBuilder(IndexMap<Cow<'static, str>, ValidateError>);

impl FieldBuilder {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Empty errors are skipped so callers can insert the
  /// result of every field check unconditionally.
  pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: ValidateError) -> &mut Self {
    if !value.is_empty() {
      self.0.insert(key.into(), value);
    }
    self
  }

  #[must_use]
  pub fn build(&mut self) -> ValidateError {
    ValidateError::Fields(std::mem::take(&mut self.0))
  }
}

/// Tree of validation failures. Serializes to the JSON shape clients
/// receive, `{"field": {"_errors": ["message"]}}`.
#[derive(Clone, PartialEq, Eq)]
pub enum ValidateError {
  Fields(IndexMap<Cow<'static, str>, ValidateError>),
  Messages(Vec<Cow<'static, str>>),
}

impl std::fmt::Display for ValidateError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Invalid data occurred")
  }
}

impl std::error::Error for ValidateError {}

impl std::fmt::Debug for ValidateError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ValidateError::Fields(n) => n.fmt(f),
      ValidateError::Messages(n) => f.debug_map().entry(&"_errors", &n).finish(),
    }
  }
}

impl ValidateError {
  #[must_use]
  pub fn field_builder() -> FieldBuilder {
    FieldBuilder::new()
  }

  #[must_use]
  pub fn msg_builder() -> MessageBuilder {
    MessageBuilder::new()
  }

  #[must_use]
  pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
    Self::Messages(vec![message.into()])
  }

  /// Shorthand for an error tree with one message under one field.
  #[must_use]
  pub fn field(key: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
    FieldBuilder::new()
      .insert(key, Self::message(message))
      .build()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    match self {
      ValidateError::Fields(n) => n.is_empty(),
      ValidateError::Messages(n) => n.is_empty(),
    }
  }

  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(self)
    }
  }

  /// Looks up the error of a direct field, if any.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<&ValidateError> {
    match self {
      ValidateError::Fields(n) => n.get(key),
      ValidateError::Messages(..) => None,
    }
  }
}

impl Serialize for ValidateError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    match self {
      ValidateError::Fields(fields) => {
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in fields {
          map.serialize_entry(key, value)?;
        }
        map.end()
      }
      ValidateError::Messages(messages) => {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("_errors", messages)?;
        map.end()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_test::Token;

  fn signup_error(email: &str, password: &str) -> ValidateError {
    let mut password_errors = ValidateError::msg_builder();
    if password.len() < 12 {
      password_errors.insert("Password is too short");
    }
    if password.trim() != password {
      password_errors.insert("Password has surrounding whitespace");
    }

    let mut fields = ValidateError::field_builder();
    if !email.contains('@') {
      fields.insert("email", ValidateError::message("Invalid e-mail address"));
    }
    fields.insert("password", password_errors.build());
    fields.build()
  }

  #[test]
  fn test_debug_fmt() {
    let error = signup_error("ada", " short");
    assert_eq!(
      format!("{error:?}"),
      r#"{"email": {"_errors": ["Invalid e-mail address"]}, "password": {"_errors": ["Password is too short", "Password has surrounding whitespace"]}}"#
    );
  }

  #[test]
  fn test_serializes_field_tree() {
    serde_test::assert_ser_tokens(
      &signup_error("ada", "correct horse battery"),
      &[
        Token::Map { len: Some(1) },
        Token::Str("email"),
        Token::Map { len: Some(1) },
        Token::Str("_errors"),
        Token::Seq { len: Some(1) },
        Token::Str("Invalid e-mail address"),
        Token::SeqEnd,
        Token::MapEnd,
        Token::MapEnd,
      ],
    );
  }

  #[test]
  fn test_field_shorthand() {
    let error = ValidateError::field("email", "This email address exists");
    assert_eq!(
      error.get("email"),
      Some(&ValidateError::message("This email address exists"))
    );
    assert!(error.get("password").is_none());
    assert!(ValidateError::message("nope").get("email").is_none());
  }

  #[test]
  fn test_empty_errors_pass() {
    assert!(signup_error("ada@example.com", "correct horse battery")
      .into_result()
      .is_ok());
    assert!(MessageBuilder::new().build().is_empty());

    let mut fields = FieldBuilder::new();
    fields.insert("first_name", MessageBuilder::new().build());
    assert!(fields.build().is_empty());
  }

  #[test]
  fn test_builders_reset_after_build() {
    let mut messages = ValidateError::msg_builder();
    messages.insert("first");
    assert!(!messages.build().is_empty());
    assert!(messages.build().is_empty());
  }
}
