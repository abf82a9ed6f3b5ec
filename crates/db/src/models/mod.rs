//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` DTOs for the write operations touching that entity
//! - Conversions into the core snapshot types where the workflow needs them

pub mod applicant;
pub mod member;
pub mod position;
pub mod project;
pub mod user;
