//! Domain models for Dancing Pony.
//!
//! These are the core types shared across all crates.

pub mod dish;
pub mod permission;
pub mod rating;
pub mod restaurant;
pub mod tenant;
pub mod user;
