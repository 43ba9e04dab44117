//! Table resolution
//!
//! Decides which tables are in scope for one generation run: an explicit
//! allow-list is used verbatim, otherwise the schema is enumerated and
//! filtered against the exclude list and dialect quirks.

use crate::config::{Dialect, GenerationRequest};
use crate::generator::ModelGenerator;
use crate::prelude::RepogenError;
use crate::schema::TableSpec;
use tracing::{debug, trace};

/// Internal-table prefix SQLite reserves for its own bookkeeping
const SQLITE_INTERNAL_PREFIX: &str = "sqlite";

/// Resolve the ordered set of tables to generate
///
/// An explicit table list is passed through without existence validation;
/// unknown names surface later from the generator. Otherwise the full
/// schema listing is filtered. Filtering only runs when an exclude entry
/// exists or the dialect is SQLite; the pass-through path must stay
/// observably equivalent to filtering with nothing to exclude.
pub fn resolve_tables<G: ModelGenerator + ?Sized>(
    request: &GenerationRequest,
    generator: &mut G,
) -> Result<Vec<TableSpec>, RepogenError> {
    if !request.tables.is_empty() {
        debug!(count = request.tables.len(), "Using explicit table list");
        return Ok(request
            .tables
            .iter()
            .map(|name| TableSpec::from_table_name(name))
            .collect());
    }

    let all_tables = generator.list_tables()?;
    debug!(count = all_tables.len(), "Enumerated schema tables");

    let needs_filtering =
        !request.exclude_tables.is_empty() || request.dialect == Dialect::Sqlite;

    let names: Vec<String> = if needs_filtering {
        all_tables
            .into_iter()
            .filter(|name| should_keep(name, request))
            .collect()
    } else {
        all_tables
    };

    trace!(tables = ?names, "Resolved table set");
    Ok(names
        .iter()
        .map(|name| TableSpec::from_table_name(name))
        .collect())
}

fn should_keep(table_name: &str, request: &GenerationRequest) -> bool {
    if request.dialect == Dialect::Sqlite && table_name.starts_with(SQLITE_INTERNAL_PREFIX) {
        trace!(table = table_name, "Dropping SQLite internal table");
        return false;
    }
    if request.exclude_tables.iter().any(|t| t == table_name) {
        trace!(table = table_name, "Dropping excluded table");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::testing::FakeGenerator;

    fn request(dialect: Dialect) -> GenerationRequest {
        GenerationRequest::new(dialect)
    }

    #[test]
    fn test_explicit_list_used_verbatim() {
        let mut req = request(Dialect::Mysql);
        req.tables = vec!["wallets".to_string(), "no_such_table".to_string()];
        // Listing is never consulted for an explicit list
        let mut generator = FakeGenerator::with_tables(&[]);
        generator.fail_listing = true;

        let specs = resolve_tables(&req, &mut generator).unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "wallets");
        assert_eq!(specs[0].model_name, "Wallets");
        assert_eq!(specs[1].name, "no_such_table");
    }

    #[test]
    fn test_full_listing_without_excludes_passes_through() {
        let mut generator = FakeGenerator::with_tables(&["users", "orders", "wallets"]);
        let specs = resolve_tables(&request(Dialect::Mysql), &mut generator).unwrap();

        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["users", "orders", "wallets"]);
    }

    #[test]
    fn test_exclude_list_drops_exact_matches() {
        let mut req = request(Dialect::Mysql);
        req.exclude_tables = vec!["schema_migrations".to_string()];
        let mut generator =
            FakeGenerator::with_tables(&["users", "schema_migrations", "orders"]);

        let specs = resolve_tables(&req, &mut generator).unwrap();

        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["users", "orders"]);
    }

    #[test]
    fn test_sqlite_internal_tables_dropped_without_excludes() {
        let mut generator =
            FakeGenerator::with_tables(&["users", "sqlite_sequence", "orders"]);

        let specs = resolve_tables(&request(Dialect::Sqlite), &mut generator).unwrap();

        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["users", "orders"]);
    }

    #[test]
    fn test_sqlite_prefix_applies_regardless_of_exclude_list() {
        let mut req = request(Dialect::Sqlite);
        req.exclude_tables = vec!["orders".to_string()];
        let mut generator =
            FakeGenerator::with_tables(&["sqlite_master", "users", "orders"]);

        let specs = resolve_tables(&req, &mut generator).unwrap();

        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["users"]);
    }

    #[test]
    fn test_fast_path_equivalent_to_filtering_path() {
        // Same listing resolved with no excludes (fast path) and with an
        // exclude list that matches nothing (filtering path) must agree.
        let tables = ["users", "orders", "wallets"];

        let mut fast = FakeGenerator::with_tables(&tables);
        let fast_specs = resolve_tables(&request(Dialect::Mysql), &mut fast).unwrap();

        let mut req = request(Dialect::Mysql);
        req.exclude_tables = vec!["not_present".to_string()];
        let mut filtered = FakeGenerator::with_tables(&tables);
        let filtered_specs = resolve_tables(&req, &mut filtered).unwrap();

        assert_eq!(fast_specs, filtered_specs);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut req = request(Dialect::Mysql);
        req.exclude_tables = vec!["audit".to_string()];

        let mut first = FakeGenerator::with_tables(&["users", "audit", "orders"]);
        let mut second = FakeGenerator::with_tables(&["users", "audit", "orders"]);

        let a = resolve_tables(&req, &mut first).unwrap();
        let b = resolve_tables(&req, &mut second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_listing_failure_is_introspection_error() {
        let mut generator = FakeGenerator::with_tables(&[]);
        generator.fail_listing = true;

        let result = resolve_tables(&request(Dialect::Mysql), &mut generator);

        match result {
            Err(RepogenError::Introspection(message)) => {
                assert!(message.contains("connection refused"));
            }
            other => panic!("expected introspection error, got {other:?}"),
        }
    }
}
