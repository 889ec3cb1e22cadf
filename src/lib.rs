#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod accounts;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod schema;
pub mod store;
pub mod types;
pub mod util;

pub use app::App;

pub(crate) mod internal;
