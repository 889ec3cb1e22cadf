use serde::{Deserialize, Serialize};

use crate::types::id::{marker::UserMarker, Id};
use crate::util::Sensitive;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub user_id: Id<UserMarker>,
  pub token: Sensitive<String>,
}
