//! Data models

pub mod user;
pub mod contact;

pub use user::*;
pub use contact::*;
