//! Tiny client-side bridge for Google Identity Services (GIS) sign-in.
//!
//! This library mediates between an application and the `accounts.id` SDK Google
//! serves to the browser: it loads the SDK script once, receives the credential Google
//! issues after sign-in, decodes it into a user profile and keeps the session state.
//! [google document](https://developers.google.com/identity/gsi/web/reference/js-reference)
//! # Feature
//! - Load the GSI client script exactly once and remove it on teardown
//! - Decode the credential (Base64URLDecode) to get user information
//! - Sign in with One Tap and map "not displayed" reasons to messages
//! - Sign out (disable auto select)
//! - Localized messages (`en`, `zh`) and locale prefix routing
//! # Caution
//! - The credential signature is **not** verified. The decoded profile is for display
//!   only and must not be sent to a backend as proof of identity.
//! - The vendor SDK and the document are reached through the `IdentityProvider` and
//!   `ScriptHost` traits; this crate ships no browser bindings of its own.
//! # Examples
//! For example usage, see the `demos` directory.
pub mod bridge;
pub mod config;
pub mod credential;
pub mod error;
pub mod i18n;
pub mod provider;
pub mod routing;
pub mod script;
