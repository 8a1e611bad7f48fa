//! Marginalia core domain types.
//!
//! Zero internal dependencies so the database, notification and API crates
//! can all share the same ids, errors and the mute-token codec.

pub mod error;
pub mod mute_token;
pub mod types;
