use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::*;
use crate::{
  schema::{AuthToken, User, VerificationToken},
  store::{MemoryStore, Store},
  types::{
    self,
    form::{
      invitations::create,
      users::{login, register, update},
    },
  },
  util::Sensitive,
};

const PASSWORD: &str = "correct horse battery";

fn ttl() -> Duration {
  Duration::hours(24)
}

fn register_form(email: &str) -> register::Request {
  register::Request {
    email: email.into(),
    username: None,
    first_name: "Ada".into(),
    last_name: "Lovelace".into(),
    password: PASSWORD.into(),
  }
}

async fn register(store: &MemoryStore, email: &str) -> User {
  create_user(store, &register_form(email)).await.unwrap()
}

fn invitation_form(email: &str) -> create::Request {
  create::Request {
    email: email.into(),
    first_name: "Grace".into(),
    last_name: "Hopper".into(),
  }
}

#[track_caller]
fn assert_form_error(error: &crate::error::Error, field: &str) {
  match error.as_type() {
    types::Error::InvalidFormBody(body) => {
      assert!(body.get(field).is_some(), "{field} has no error in {body:?}");
    }
    other => panic!("expected invalid form body, got {other:?}"),
  }
}

mod users {
  use super::*;

  #[tokio::test]
  async fn test_create_user_provisions_tokens() {
    let store = MemoryStore::new();
    let user = register(&store, "Ada@Example.com").await;

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.username, user.email);
    assert!(!user.is_verified);
    assert_ne!(user.password_hash, PASSWORD);

    assert_eq!(store.auth_tokens_for(user.id).await.unwrap().len(), 1);
    let tokens = store.verification_tokens_for(user.id).await.unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_active);
  }

  #[tokio::test]
  async fn test_create_user_rejects_duplicate_email() {
    let store = MemoryStore::new();
    register(&store, "ada@example.com").await;

    let error = create_user(&store, &register_form("ADA@example.com")).await.unwrap_err();
    assert_form_error(&error, "email");
    assert_eq!(store.user_count().await, 1);
  }

  #[tokio::test]
  async fn test_create_user_rejects_invalid_form() {
    let store = MemoryStore::new();
    let mut form = register_form("not-an-email");
    form.password = "short".into();

    let error = create_user(&store, &form).await.unwrap_err();
    assert_form_error(&error, "email");
    assert_form_error(&error, "password");
    assert_eq!(store.user_count().await, 0);
  }

  #[tokio::test]
  async fn test_update_user_only_changes_names() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;

    let form: update::Request = serde_json::from_value(serde_json::json!({
      "email": "mallory@example.com",
      "password": "a whole new password",
      "first_name": "Augusta",
    }))
    .unwrap();

    let updated = update_user(&store, &user, form).await.unwrap();
    assert_eq!(updated.first_name, "Augusta");
    assert_eq!(updated.last_name, "Lovelace");
    assert_eq!(updated.email, "ada@example.com");
    assert_eq!(updated.password_hash, user.password_hash);
  }

  #[tokio::test]
  async fn test_login() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;

    let form = login::Request {
      email: " ADA@example.com".into(),
      password: PASSWORD.into(),
    };
    assert_eq!(login(&store, &form).await.unwrap().id, user.id);

    let form = login::Request {
      email: "ada@example.com".into(),
      password: "wrong horse battery".into(),
    };
    let error = login(&store, &form).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::Unauthorized);

    let form = login::Request {
      email: "grace@example.com".into(),
      password: PASSWORD.into(),
    };
    let error = login(&store, &form).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::Unauthorized);
  }

  #[tokio::test]
  async fn test_logged_in_response() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let token = get_auth_token(&store, user.id).await.unwrap();

    let response = get_logged_in_user_response(&store, &user).await.unwrap();
    assert_eq!(response.token, token.key);
    assert_eq!(response.user.email, "ada@example.com");
    assert_eq!(response.user.full_name, "Ada Lovelace");

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("password"));
    assert!(!json.contains(&user.password_hash));
  }

  #[tokio::test]
  async fn test_readonly_store() {
    let store = MemoryStore::readonly();
    let error = create_user(&store, &register_form("ada@example.com")).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::ReadonlyMode);
  }
}

mod auth_tokens {
  use super::*;

  #[tokio::test]
  async fn test_rotation_yields_new_key() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let before = get_auth_token(&store, user.id).await.unwrap();

    let rotated = update_or_create_auth_token(&store, user.id).await.unwrap();
    assert_ne!(before.key, rotated.key);
    assert_eq!(get_auth_token(&store, user.id).await.unwrap(), rotated);
    assert_eq!(store.auth_tokens_for(user.id).await.unwrap().len(), 1);

    let error = authenticate(&store, &before.key).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::Unauthorized);
    assert_eq!(authenticate(&store, &rotated.key).await.unwrap().id, user.id);
  }

  #[tokio::test]
  async fn test_missing_token_is_internal() {
    let store = MemoryStore::new();
    let user = store
      .push_raw_user(&crate::schema::NewUser {
        email: "ada@example.com".into(),
        username: "ada@example.com".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        password_hash: "hash".into(),
      })
      .await;

    let error = get_auth_token(&store, user.id).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::Internal);

    // Creates the first token when there is none
    let token = update_or_create_auth_token(&store, user.id).await.unwrap();
    assert_eq!(get_auth_token(&store, user.id).await.unwrap(), token);
  }

  #[tokio::test]
  async fn test_duplicated_tokens_are_internal() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    store
      .push_raw_auth_token(AuthToken {
        key: "0".repeat(40),
        user_id: user.id,
        created_at: Utc::now().naive_utc(),
      })
      .await;

    let error = get_auth_token(&store, user.id).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::Internal);

    let error = update_or_create_auth_token(&store, user.id).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::Internal);
  }

  #[tokio::test]
  async fn test_authenticate_unknown_key() {
    let store = MemoryStore::new();
    let error = authenticate(&store, "deadbeef").await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::Unauthorized);
  }
}

mod verification {
  use super::*;

  async fn current_token(store: &MemoryStore, user: &User) -> VerificationToken {
    store.verification_tokens_for(user.id).await.unwrap().remove(0)
  }

  #[tokio::test]
  async fn test_check_accepts_issued_token() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let token = current_token(&store, &user).await;

    let checked = check_verification_token(&store, &token.token.to_string(), user.id, ttl())
      .await
      .unwrap();
    assert_eq!(checked, token);
  }

  #[tokio::test]
  async fn test_check_rejects_wrong_tokens() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;

    for submitted in [Uuid::new_v4().to_string(), "not-a-uuid".to_string(), String::new()] {
      let error = check_verification_token(&store, &submitted, user.id, ttl())
        .await
        .unwrap_err();
      assert_eq!(error.as_type(), &types::Error::VerificationFailed, "{submitted:?}");
    }
  }

  #[tokio::test]
  async fn test_check_rejects_expired_token() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let token = current_token(&store, &user).await;
    store.backdate_verification_token(user.id, Duration::hours(25)).await;

    let error = check_verification_token(&store, &token.token.to_string(), user.id, ttl())
      .await
      .unwrap_err();
    assert_eq!(error.as_type(), &types::Error::VerificationFailed);
  }

  #[tokio::test]
  async fn test_check_with_largest_ttl() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let token = current_token(&store, &user).await.token.to_string();

    let checked = check_verification_token(&store, &token, user.id, Duration::max_value())
      .await
      .unwrap();
    assert!(checked.is_active);

    verify_user(&store, &token, user.id, Duration::max_value()).await.unwrap();
    let error = check_verification_token(&store, &token, user.id, Duration::max_value())
      .await
      .unwrap_err();
    assert_eq!(error.as_type(), &types::Error::VerificationFailed);
  }

  #[tokio::test]
  async fn test_check_without_single_token_is_not_found() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let other = register(&store, "grace@example.com").await;
    let token = current_token(&store, &user).await;

    // `other` has a token but it is checked against an unknown user
    let unknown = crate::types::id::Id::new(other.id.get() + 100);
    let error = check_verification_token(&store, &token.token.to_string(), unknown, ttl())
      .await
      .unwrap_err();
    assert_eq!(error.as_type(), &types::Error::NotFound);

    store
      .push_raw_verification_token(VerificationToken {
        user_id: user.id,
        token: Uuid::new_v4(),
        is_active: true,
        created_at: Utc::now().naive_utc(),
      })
      .await;
    let error = check_verification_token(&store, &token.token.to_string(), user.id, ttl())
      .await
      .unwrap_err();
    assert_eq!(error.as_type(), &types::Error::NotFound);
  }

  #[tokio::test]
  async fn test_verify_user_consumes_token() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let token = current_token(&store, &user).await.token.to_string();

    let verified = verify_user(&store, &token, user.id, ttl()).await.unwrap();
    assert!(verified.is_verified);
    assert!(!current_token(&store, &user).await.is_active);

    let error = verify_user(&store, &token, user.id, ttl()).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::VerificationFailed);
  }

  #[tokio::test]
  async fn test_reissue_reactivates_with_new_value() {
    let store = MemoryStore::new();
    let user = register(&store, "ada@example.com").await;
    let first = current_token(&store, &user).await;
    verify_user(&store, &first.token.to_string(), user.id, ttl()).await.unwrap();

    let second = update_or_create_verification_token(&store, user.id).await.unwrap();
    assert!(second.is_active);
    assert_ne!(second.token, first.token);
    assert_eq!(store.verification_tokens_for(user.id).await.unwrap().len(), 1);

    check_verification_token(&store, &second.token.to_string(), user.id, ttl())
      .await
      .unwrap();
  }
}

mod invitations {
  use super::*;

  #[tokio::test]
  async fn test_create_invitation() {
    let store = MemoryStore::new();
    let inviter = register(&store, "ada@example.com").await;

    let invitation = create_invitation(&store, &inviter, &invitation_form("Grace@Example.com"))
      .await
      .unwrap();
    assert!(invitation.is_active);
    assert_eq!(invitation.email, "grace@example.com");
    assert_eq!(invitation.invited_by, inviter.id);
    assert_eq!(get_invitation(&store, invitation.id).await.unwrap(), invitation);
  }

  #[tokio::test]
  async fn test_create_invitation_for_registered_email() {
    let store = MemoryStore::new();
    let inviter = register(&store, "ada@example.com").await;

    let error = create_invitation(&store, &inviter, &invitation_form("ada@example.com"))
      .await
      .unwrap_err();
    assert_form_error(&error, "email");
  }

  #[tokio::test]
  async fn test_get_unknown_invitation() {
    let store = MemoryStore::new();
    let error = get_invitation(&store, crate::types::id::Id::new(9)).await.unwrap_err();
    assert_eq!(error.as_type(), &types::Error::NotFound);
  }

  #[tokio::test]
  async fn test_accept_creates_user_and_deactivates() {
    let store = MemoryStore::new();
    let inviter = register(&store, "ada@example.com").await;
    let invitation = create_invitation(&store, &inviter, &invitation_form("grace@example.com"))
      .await
      .unwrap();

    let user = accept_invitation_and_create_user(&store, &invitation, PASSWORD.into())
      .await
      .unwrap();
    assert_eq!(user.email, invitation.email);
    assert_eq!(user.first_name, "Grace");
    assert_eq!(user.last_name, "Hopper");
    assert_eq!(store.auth_tokens_for(user.id).await.unwrap().len(), 1);
    assert_eq!(store.verification_tokens_for(user.id).await.unwrap().len(), 1);

    let invitation = get_invitation(&store, invitation.id).await.unwrap();
    assert!(!invitation.is_active);
  }

  #[tokio::test]
  async fn test_accept_inactive_invitation() {
    let store = MemoryStore::new();
    let inviter = register(&store, "ada@example.com").await;
    let mut invitation = create_invitation(&store, &inviter, &invitation_form("grace@example.com"))
      .await
      .unwrap();
    invitation.is_active = false;

    let error = accept_invitation_and_create_user(&store, &invitation, PASSWORD.into())
      .await
      .unwrap_err();
    assert_eq!(error.as_type(), &types::Error::InvitationExpired);
    assert_eq!(store.user_count().await, 1);
  }

  #[tokio::test]
  async fn test_accept_twice_with_stale_invitation() {
    let store = MemoryStore::new();
    let inviter = register(&store, "ada@example.com").await;
    let invitation = create_invitation(&store, &inviter, &invitation_form("grace@example.com"))
      .await
      .unwrap();

    accept_invitation_and_create_user(&store, &invitation, PASSWORD.into())
      .await
      .unwrap();

    // `invitation` still says it is active, the store knows better
    let error = accept_invitation_and_create_user(&store, &invitation, PASSWORD.into())
      .await
      .unwrap_err();
    assert_eq!(error.as_type(), &types::Error::InvitationExpired);
    assert_eq!(store.user_count().await, 2);
  }

  #[tokio::test]
  async fn test_concurrent_accepts_register_once() {
    let store = Arc::new(MemoryStore::new());
    let inviter = register(&store, "ada@example.com").await;
    let invitation = create_invitation(&*store, &inviter, &invitation_form("grace@example.com"))
      .await
      .unwrap();

    let (first, second) = tokio::join!(
      accept_invitation_and_create_user(&*store, &invitation, Sensitive::from(PASSWORD)),
      accept_invitation_and_create_user(&*store, &invitation, Sensitive::from(PASSWORD)),
    );
    let loser = match (first, second) {
      (Ok(..), Err(error)) | (Err(error), Ok(..)) => error,
      other => panic!("expected exactly one accept to succeed, got {other:?}"),
    };
    assert_eq!(loser.as_type(), &types::Error::InvitationExpired);
    assert_eq!(store.user_count().await, 2);
  }

  #[tokio::test]
  async fn test_accept_validates_password() {
    let store = MemoryStore::new();
    let inviter = register(&store, "ada@example.com").await;
    let invitation = create_invitation(&store, &inviter, &invitation_form("grace@example.com"))
      .await
      .unwrap();

    let error = accept_invitation_and_create_user(&store, &invitation, "short".into())
      .await
      .unwrap_err();
    assert_form_error(&error, "password");
    assert!(get_invitation(&store, invitation.id).await.unwrap().is_active);
  }
}
