pub mod accept;
pub mod create;
