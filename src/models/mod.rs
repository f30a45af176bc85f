//! Data models for the clip curation backend.
//!
//! Wire shapes follow the remote clip API, which the browser views also consume.

mod clip;
mod message;
mod preferences;
mod rating;
mod site_config;
mod user;

pub use clip::*;
pub use message::*;
pub use preferences::*;
pub use rating::*;
pub use site_config::*;
pub use user::*;
