//! Generation request configuration
//!
//! Merges CLI flag values with an optional YAML field-mapping file into a
//! single immutable [`GenerationRequest`] for one generation run.

use crate::prelude::RepogenError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{debug, trace, warn};

/// Default output directory for generated model files
pub const DEFAULT_OUT_DIR: &str = "biz/dal/query";
/// Default output filename for the generated query entry file
pub const DEFAULT_OUT_FILE: &str = "gen.go";
/// Output directory for generated repository and test files
pub const DEFAULT_REPO_DIR: &str = "biz/dal/repo";
/// Default package name for generated models
pub const DEFAULT_MODEL_PKG: &str = "model";

/// Environment variable consulted when no DSN flag is supplied
pub const DSN_ENV_VAR: &str = "DATABASE_DSN";

/// Target database engine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dialect {
    Mysql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Lowercase dialect key, used for logging and dispatch
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level type override loaded from the YAML config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Table-qualified column identifier, e.g. "orders.status"
    #[serde(skip)]
    pub field_key: String,
    /// Target type name emitted for the column
    #[serde(rename = "type")]
    pub type_name: String,
    /// Optional import path required by the target type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
}

/// YAML config file shape: `{ fieldMapping: { <key>: {type, import} } }`
///
/// A BTreeMap keeps the loaded mapping order deterministic. Duplicate keys
/// in the source document are a caller error; YAML map semantics do not
/// guarantee which entry survives.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(rename = "fieldMapping", default)]
    field_mapping: BTreeMap<String, FieldMapping>,
}

/// The fully merged configuration for one generation run
///
/// Constructed once per invocation from CLI flags, optionally enriched from
/// a YAML config file, and immutable thereafter.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub dsn: String,
    pub dialect: Dialect,
    /// Explicit table allow-list; empty means "introspect all tables"
    pub tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    /// Skip repository/test emission, generate models only
    pub only_model: bool,
    pub out_path: PathBuf,
    pub out_file: String,
    pub with_unit_test: bool,
    pub model_pkg_name: String,
    pub field_nullable: bool,
    pub field_signable: bool,
    pub field_with_index_tag: bool,
    pub field_with_type_tag: bool,
    /// Directory of raw SQL files; takes precedence over the DSN when set
    pub sql_dir: Option<PathBuf>,
    /// Field-level overrides, in config-file order
    pub field_mappings: Vec<FieldMapping>,
}

impl GenerationRequest {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dsn: String::new(),
            dialect,
            tables: Vec::new(),
            exclude_tables: Vec::new(),
            only_model: false,
            out_path: PathBuf::from(DEFAULT_OUT_DIR),
            out_file: DEFAULT_OUT_FILE.to_string(),
            with_unit_test: false,
            model_pkg_name: DEFAULT_MODEL_PKG.to_string(),
            field_nullable: false,
            field_signable: false,
            field_with_index_tag: false,
            field_with_type_tag: false,
            sql_dir: None,
            field_mappings: Vec::new(),
        }
    }

    /// Load the YAML config file and append its field mappings
    pub fn apply_config_file(&mut self, path: &Path) -> Result<(), RepogenError> {
        let mappings = load_field_mappings(path)?;
        debug!(path = ?path, count = mappings.len(), "Loaded field mappings");
        self.field_mappings.extend(mappings);
        Ok(())
    }

    /// Resolve the DSN, falling back to the environment when the flag is empty
    ///
    /// Loads `env_file` through dotenvy first if it exists, then reads
    /// `DATABASE_DSN`. A missing DSN is only an error when no SQL directory
    /// was configured.
    pub fn resolve_dsn(&mut self, env_file: &Path) -> Result<(), RepogenError> {
        if !self.dsn.is_empty() || self.sql_dir.is_some() {
            return Ok(());
        }

        if env_file.exists() {
            debug!(path = ?env_file, "Loading environment file");
            dotenvy::from_path(env_file).map_err(|e| {
                RepogenError::Config(format!("Failed to load {}: {}", env_file.display(), e))
            })?;
        } else {
            trace!(path = ?env_file, "Environment file not found, using existing environment");
        }

        match env::var(DSN_ENV_VAR) {
            Ok(dsn) if !dsn.is_empty() => {
                self.dsn = dsn;
                Ok(())
            }
            _ => Err(RepogenError::Config(format!(
                "no DSN supplied: pass --dsn or set {DSN_ENV_VAR}"
            ))),
        }
    }

    /// DSN with credentials redacted, for log output
    pub fn redacted_dsn(&self) -> String {
        match self.dsn.split_once('@') {
            Some((_, host_part)) => format!("***@{host_part}"),
            None => self.dsn.clone(),
        }
    }
}

/// Parse a YAML field-mapping file into an ordered list of [`FieldMapping`]
///
/// An empty or absent `fieldMapping` section yields an empty list.
pub fn load_field_mappings(path: &Path) -> Result<Vec<FieldMapping>, RepogenError> {
    let data = fs::read_to_string(path).map_err(|source| RepogenError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: ConfigFile =
        serde_yaml::from_str(&data).map_err(|source| RepogenError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    if parsed.field_mapping.is_empty() {
        warn!(path = ?path, "Config file has no fieldMapping entries");
    }

    let mappings = parsed
        .field_mapping
        .into_iter()
        .map(|(field_key, mut mapping)| {
            mapping.field_key = field_key;
            mapping
        })
        .collect();

    Ok(mappings)
}

/// Serialize field mappings back to the YAML config file shape
pub fn dump_field_mappings(mappings: &[FieldMapping]) -> Result<String, serde_yaml::Error> {
    let file = ConfigFile {
        field_mapping: mappings
            .iter()
            .map(|m| (m.field_key.clone(), m.clone()))
            .collect(),
    };
    serde_yaml::to_string(&file)
}
