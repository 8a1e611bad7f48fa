//! Domain model structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity struct matching the database row
//! and, where rows are inserted from Rust, a create DTO.

pub mod comment;
pub mod paper;
pub mod unsubscribe;
pub mod user;
