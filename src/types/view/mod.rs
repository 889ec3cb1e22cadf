mod invitation;
mod user;

pub use invitation::InvitationView;
pub use user::{LoggedIn, UserView};
