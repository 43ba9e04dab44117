//! # repogen
//!
//! Generate GORM-style data access code from database schemas
//!
//! This crate provides a CLI tool and library that inspects a relational
//! schema, applies user-configurable type overrides, and emits Go model
//! structs plus CRUD repository implementations and tests.

pub mod codegen;
pub mod config;
pub mod error;
pub mod generator;
pub mod overrides;
pub mod schema;
pub mod tables;

pub mod prelude {
    pub use crate::codegen::RepoCodegen;
    pub use crate::config::{Dialect, FieldMapping, GenerationRequest};
    pub use crate::error::RepogenError;
    pub use crate::generator::ModelGenerator;
    pub use crate::overrides::{OverrideResolver, TypeOverride};
    pub use crate::schema::TableSpec;
    pub use crate::tables::resolve_tables;
}

#[cfg(feature = "postgres")]
pub use generator::PostgresGenerator;
