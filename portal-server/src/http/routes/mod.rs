//! Route handlers organized by resource

pub mod admin;
pub mod apps;
pub mod health;
pub mod portal;
