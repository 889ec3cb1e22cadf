pub mod actor;
pub mod controllers;
pub mod error;
pub mod util;

pub use actor::Actor;
