//! Schema data structures
//!
//! These types represent resolved table identity and column metadata, and
//! form the contract between table resolution (produces) and model/repo
//! emission (consumes).

/// Resolved identity of one table to generate
///
/// Always derived from the canonical table name so the naming transforms
/// cannot drift from the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name as reported by the schema
    pub name: String,
    /// PascalCase model struct name, e.g. `user_profiles` -> `UserProfiles`
    pub model_name: String,
    /// camelCase variable name, e.g. `user_profiles` -> `userProfiles`
    pub var_name: String,
}

impl TableSpec {
    pub fn from_table_name(name: &str) -> Self {
        let model_name = to_pascal_case(name);
        let var_name = to_camel_case(name);
        Self {
            name: name.to_string(),
            model_name,
            var_name,
        }
    }
}

/// A table column as reported by the schema source
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// Bare SQL type name, e.g. `tinyint`, `decimal`, `varchar`
    pub sql_type: String,
    /// Full column type text, e.g. `tinyint(1)`; None when the source
    /// cannot provide it
    pub column_type: Option<String>,
    pub is_nullable: bool,
    pub is_primary_key: bool,
}

impl Column {
    /// Table-qualified field key used for override lookups
    pub fn field_key(&self, table_name: &str) -> String {
        format!("{}.{}", table_name, self.name)
    }
}

/// Convert snake_case to PascalCase
///
/// Empty segments from consecutive underscores are skipped.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let first_upper = first.to_uppercase().to_string();
                    first_upper + chars.as_str()
                }
            }
        })
        .collect()
}

/// Convert snake_case to camelCase by lowercasing the first character of
/// the PascalCase form
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => pascal,
        Some(first) => first.to_lowercase().to_string() + chars.as_str(),
    }
}
