//! Column type overrides
//!
//! Rewrites the inferred output type of a column based on either an exact
//! field-key match (from the YAML config) or a built-in SQL-type rule.
//! Field-key rules are more specific and always win: a `tinyint` column can
//! be forced to a real bool while every other `tinyint(4)` still defaults
//! to int32. Precedence is encoded by check order, not by map iteration.

use crate::config::FieldMapping;
use tracing::trace;

/// Import path pulled in by the decimal rule
pub const DECIMAL_IMPORT: &str = "github.com/shopspring/decimal";

/// Resolved override for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOverride {
    pub type_name: String,
    pub import: Option<String>,
}

/// One field-key scoped rule, derived from a [`FieldMapping`]
#[derive(Debug, Clone)]
struct FieldRule {
    field_key: String,
    type_name: String,
    import: Option<String>,
}

/// Resolves per-column type overrides for one generation run
///
/// SQL-type rules are statically defined; field-key rules are built from
/// the request's field mappings at construction time.
#[derive(Debug, Default, Clone)]
pub struct OverrideResolver {
    field_rules: Vec<FieldRule>,
}

impl OverrideResolver {
    pub fn new(mappings: &[FieldMapping]) -> Self {
        let field_rules = mappings
            .iter()
            .map(|m| FieldRule {
                field_key: m.field_key.clone(),
                type_name: m.type_name.clone(),
                import: m.import.clone(),
            })
            .collect();
        Self { field_rules }
    }

    /// Resolve the override for a column, or None to defer to the
    /// generator's default type inference
    ///
    /// Resolution order: exact field-key match first, then built-in
    /// SQL-type rules.
    pub fn resolve(
        &self,
        sql_type: &str,
        column_type: Option<&str>,
        field_key: &str,
    ) -> Option<TypeOverride> {
        if let Some(rule) = self.field_rules.iter().find(|r| r.field_key == field_key) {
            trace!(field_key, type_name = %rule.type_name, "Field-key override matched");
            return Some(TypeOverride {
                type_name: rule.type_name.clone(),
                import: rule.import.clone(),
            });
        }

        match sql_type {
            "decimal" => Some(TypeOverride {
                type_name: "decimal.Decimal".to_string(),
                import: Some(DECIMAL_IMPORT.to_string()),
            }),
            "tinyint" => {
                // tinyint(1) is the MySQL bool convention; anything else,
                // including unreadable type text, widens to int32.
                let type_name = match column_type {
                    Some("tinyint(1)") => "int8",
                    _ => "int32",
                };
                Some(TypeOverride {
                    type_name: type_name.to_string(),
                    import: None,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(field_key: &str, type_name: &str, import: Option<&str>) -> FieldMapping {
        FieldMapping {
            field_key: field_key.to_string(),
            type_name: type_name.to_string(),
            import: import.map(str::to_string),
        }
    }

    #[test]
    fn test_decimal_rule() {
        let resolver = OverrideResolver::default();
        let result = resolver
            .resolve("decimal", Some("decimal(10,2)"), "wallets.balance")
            .unwrap();
        assert_eq!(result.type_name, "decimal.Decimal");
        assert_eq!(result.import.as_deref(), Some(DECIMAL_IMPORT));
    }

    #[test]
    fn test_tinyint_one_is_narrow() {
        let resolver = OverrideResolver::default();
        let result = resolver
            .resolve("tinyint", Some("tinyint(1)"), "users.active")
            .unwrap();
        assert_eq!(result.type_name, "int8");
        assert_eq!(result.import, None);
    }

    #[test]
    fn test_tinyint_wide_is_int32() {
        let resolver = OverrideResolver::default();
        let result = resolver
            .resolve("tinyint", Some("tinyint(4)"), "users.age")
            .unwrap();
        assert_eq!(result.type_name, "int32");
    }

    #[test]
    fn test_tinyint_missing_type_text_falls_back() {
        let resolver = OverrideResolver::default();
        let result = resolver.resolve("tinyint", None, "users.age").unwrap();
        assert_eq!(result.type_name, "int32");
    }

    #[test]
    fn test_unknown_type_defers() {
        let resolver = OverrideResolver::default();
        assert_eq!(
            resolver.resolve("varchar", Some("varchar(255)"), "users.name"),
            None
        );
    }

    #[test]
    fn test_field_key_wins_over_type_rule() {
        let resolver = OverrideResolver::new(&[mapping(
            "orders.status",
            "OrderStatus",
            Some("example.com/types"),
        )]);

        let result = resolver
            .resolve("tinyint", Some("tinyint(4)"), "orders.status")
            .unwrap();
        assert_eq!(result.type_name, "OrderStatus");
        assert_eq!(result.import.as_deref(), Some("example.com/types"));

        // Other tinyint columns still hit the built-in rule
        let other = resolver
            .resolve("tinyint", Some("tinyint(4)"), "orders.kind")
            .unwrap();
        assert_eq!(other.type_name, "int32");
    }

    #[test]
    fn test_field_key_match_is_case_sensitive() {
        let resolver = OverrideResolver::new(&[mapping("orders.status", "OrderStatus", None)]);
        assert_eq!(
            resolver.resolve("varchar", Some("varchar(16)"), "Orders.Status"),
            None
        );
    }

    #[test]
    fn test_field_key_forces_bool() {
        let resolver = OverrideResolver::new(&[mapping("users.deleted", "bool", None)]);
        let result = resolver
            .resolve("tinyint", Some("tinyint(1)"), "users.deleted")
            .unwrap();
        assert_eq!(result.type_name, "bool");
    }
}
