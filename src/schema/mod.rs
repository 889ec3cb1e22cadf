mod auth_token;
mod invitation;
mod user;
mod verification_token;

pub use auth_token::AuthToken;
pub use invitation::{Invitation, NewInvitation};
pub use user::{NewUser, User};
pub use verification_token::VerificationToken;
