//! Account workflows: registration, auth tokens, e-mail
//! verification and invitations.
//!
//! Every function here works against any [`Store`] so routes
//! and tests share the exact same behavior.
//!
//! [`Store`]: crate::store::Store

mod auth_token;
mod invitations;
mod users;
mod verification;

pub use auth_token::{authenticate, get_auth_token, update_or_create_auth_token};
pub use invitations::{accept_invitation_and_create_user, create_invitation, get_invitation};
pub use users::{create_user, get_logged_in_user_response, login, update_user};
pub use verification::{check_verification_token, update_or_create_verification_token, verify_user};

#[cfg(test)]
mod tests;
