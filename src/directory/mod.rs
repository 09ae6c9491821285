//! Azure AD directory lookups through Microsoft Graph.

pub mod client;
pub mod models;

pub use client::GraphClient;
pub use models::{is_account_enabled, UserQuery, UserRecord};
