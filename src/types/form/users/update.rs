use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use crate::util::{validation, Sensitive};

/// Profile update request. `email` and `password` are accepted so
/// clients may send a full user payload back, but they are never
/// applied through this path.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Request {
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub password: Option<Sensitive<String>>,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
}

/// Fields of a user that can be changed after registration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Changes {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
}

impl Request {
  #[must_use]
  pub fn into_changes(self) -> Changes {
    Changes {
      first_name: self.first_name,
      last_name: self.last_name,
    }
  }
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    if let Some(first_name) = self.first_name.as_deref() {
      fields.insert("first_name", validation::check_name(first_name));
    }
    if let Some(last_name) = self.last_name.as_deref() {
      fields.insert("last_name", validation::check_name(last_name));
    }
    fields.build().into_result()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_strips_email_and_password() {
    let request: Request = serde_json::from_value(serde_json::json!({
      "email": "someone-else@example.com",
      "password": "new password please",
      "first_name": "Grace",
    }))
    .unwrap();

    assert!(request.validate().is_ok());
    assert_eq!(
      request.into_changes(),
      Changes {
        first_name: Some("Grace".into()),
        last_name: None,
      }
    );
  }

  #[test]
  fn test_rejects_blank_names() {
    let request = Request {
      last_name: Some(String::new()),
      ..Default::default()
    };
    assert!(request.validate().unwrap_err().get("last_name").is_some());
  }
}
