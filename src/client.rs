//! Canvas client and its per-resource facades.
//!
//! The facades are thin borrowed views over a shared [`Connection`]; they
//! build URLs and settings and tag returned entities with the ids they were
//! fetched under.
//!
//! [`Connection`]: crate::transport::Connection

pub mod accounts;
pub mod assignments;
pub mod builder;
pub mod core;
pub mod courses;
pub mod current_user;
pub mod terms;

pub use accounts::Accounts;
pub use assignments::{Assignments, OverrideDates};
pub use builder::CanvasClientBuilder;
pub use core::CanvasClient;
pub use courses::Courses;
pub use current_user::CurrentUser;
pub use terms::Terms;
