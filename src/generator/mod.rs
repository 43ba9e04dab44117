//! Model generation
//!
//! Defines the contract with the model generator (the collaborator that
//! knows how to read a schema and render model structs) and the coordinator
//! that drives it over the resolved table set. Live implementations are
//! feature-gated per database.

use crate::overrides::OverrideResolver;
use crate::prelude::RepogenError;
use crate::schema::TableSpec;
use tracing::{debug, info};

/// Contract with the model generator
///
/// Implementations accumulate model artifacts per table and write them to
/// disk in one `execute` pass, so a listing or rendering failure surfaces
/// before any model file is touched. File writes themselves are
/// best-effort: a failure mid-execute leaves earlier files on disk.
pub trait ModelGenerator {
    /// Enumerate all table names in the schema, in the source's order
    fn list_tables(&mut self) -> Result<Vec<String>, RepogenError>;

    /// Inspect one table and accumulate its model artifact, consulting the
    /// override resolver per column
    fn generate_model(
        &mut self,
        table: &TableSpec,
        overrides: &OverrideResolver,
    ) -> Result<(), RepogenError>;

    /// Write all accumulated model artifacts to disk
    fn execute(&mut self) -> Result<(), RepogenError>;
}

/// Drive the generator over the resolved table set, then run its execution
/// phase
pub fn emit_models<G: ModelGenerator + ?Sized>(
    generator: &mut G,
    tables: &[TableSpec],
    overrides: &OverrideResolver,
) -> Result<(), RepogenError> {
    for table in tables {
        debug!(table = %table.name, model = %table.model_name, "Generating model");
        generator.generate_model(table, overrides)?;
    }

    generator.execute()?;
    info!(tables = tables.len(), "Model generation complete");
    Ok(())
}

// Feature-gated database implementations
#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresGenerator;
