use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use crate::util::validation;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Request {
  pub email: String,
  pub first_name: String,
  pub last_name: String,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut fields = ValidateError::field_builder();
    fields.insert("email", validation::check_email(&self.email));
    fields.insert("first_name", validation::check_name(&self.first_name));
    fields.insert("last_name", validation::check_name(&self.last_name));
    fields.build().into_result()
  }
}
