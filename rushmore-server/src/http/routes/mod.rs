//! Route handlers organized by resource

pub mod health;
pub mod home;
pub mod posts;
pub mod comments;
pub mod categories;
