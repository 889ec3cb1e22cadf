use serde::{Deserialize, Serialize};

use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub password: Sensitive<String>,
}
