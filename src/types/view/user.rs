use serde::{Deserialize, Serialize};

use crate::schema;
use crate::types::id::{marker::UserMarker, Id};

/// Public representation of a user. Password hashes never
/// leave the server so there is no field for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserView {
  pub id: Id<UserMarker>,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub full_name: String,
  pub is_verified: bool,
}

impl From<&schema::User> for UserView {
  fn from(user: &schema::User) -> Self {
    let full_name = format!("{} {}", user.first_name, user.last_name);
    Self {
      id: user.id,
      email: user.email.clone(),
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
      full_name: full_name.trim().to_string(),
      is_verified: user.is_verified,
    }
  }
}

/// Response of every route that hands out an auth token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggedIn {
  pub user: UserView,
  pub token: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn user(first_name: &str, last_name: &str) -> schema::User {
    schema::User {
      id: Id::new(3),
      created_at: Utc::now().naive_utc(),
      email: "ada@example.com".into(),
      username: "ada@example.com".into(),
      first_name: first_name.into(),
      last_name: last_name.into(),
      password_hash: "$argon2id$secret".into(),
      is_verified: false,
      updated_at: None,
    }
  }

  #[test]
  fn test_full_name() {
    assert_eq!(UserView::from(&user("Ada", "Lovelace")).full_name, "Ada Lovelace");
    assert_eq!(UserView::from(&user("Ada", "")).full_name, "Ada");
  }

  #[test]
  fn test_never_exposes_password() {
    let json = serde_json::to_value(UserView::from(&user("Ada", "Lovelace"))).unwrap();
    let object = json.as_object().unwrap();
    assert!(!object.contains_key("password"));
    assert!(!object.contains_key("password_hash"));
    assert!(!json.to_string().contains("argon2"));
    assert_eq!(object["id"], "3");
    assert_eq!(object["is_verified"], false);
  }
}
