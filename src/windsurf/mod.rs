//! Windsurf API integration module
//!
//! Provides the client for reading and writing add-on credit caps.

pub mod api;
pub mod client;
pub mod models;

pub use api::UsageCapApi;
pub use client::{Operation, UsageCapClient};
pub use models::*;
