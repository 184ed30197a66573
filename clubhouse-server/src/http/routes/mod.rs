//! Route handlers organized by page

pub mod articles;
pub mod auth;
pub mod events;
pub mod health;
pub mod home;
pub mod members;
pub mod profile;
