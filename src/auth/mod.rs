//! Azure AD authentication module.
//!
//! Provides the OAuth2 client-credentials flow used to obtain a Graph token.

pub mod oauth;
