mod login;
mod me;
mod register;
mod token;
mod verification;

pub use login::login;
pub use me::{me, update_me};
pub use register::register;
pub use token::rotate_token;
pub use verification::{resend_verification, verify};
