use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub email: String,
  pub password: Sensitive<String>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    if self.email.trim().is_empty() {
      fields.insert("email", ValidateError::message("E-mail address is required"));
    }
    if self.password.is_empty() {
      fields.insert("password", ValidateError::message("Password is required"));
    }
    fields.build().into_result()
  }
}
