//! PostgreSQL-backed model generator
//!
//! Lists tables and columns from the catalog, applies the per-column type
//! overrides, and renders one GORM-style Go model struct per table. Model
//! artifacts accumulate in memory until `execute` writes them to disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use minijinja::Environment;
use postgres::Client;
use tracing::{debug, trace};

use super::ModelGenerator;
use crate::config::GenerationRequest;
use crate::overrides::OverrideResolver;
use crate::prelude::RepogenError;
use crate::schema::{to_pascal_case, Column, TableSpec};

/// One rendered model file awaiting the execute phase
struct ModelArtifact {
    table_name: String,
    file_name: String,
    code: String,
}

/// PostgreSQL model generator
pub struct PostgresGenerator<'a> {
    client: &'a mut Client,
    schema_name: String,
    model_dir: PathBuf,
    model_pkg: String,
    field_nullable: bool,
    field_with_type_tag: bool,
    env: Environment<'static>,
    pending: Vec<ModelArtifact>,
}

impl<'a> PostgresGenerator<'a> {
    pub fn new(client: &'a mut Client, request: &GenerationRequest) -> Self {
        let mut env = Environment::new();
        env.add_template("model", include_str!("templates/model.go.jinja"))
            .expect("Failed to load model template");

        // Package directory sits next to the query output directory, named
        // after the last segment of the package path.
        let pkg_name = request
            .model_pkg_name
            .rsplit('/')
            .next()
            .unwrap_or(&request.model_pkg_name)
            .to_string();
        let model_dir = request
            .out_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join(&pkg_name);

        Self {
            client,
            schema_name: "public".to_string(),
            model_dir,
            model_pkg: pkg_name,
            field_nullable: request.field_nullable,
            field_with_type_tag: request.field_with_type_tag,
            env,
            pending: Vec::new(),
        }
    }

    /// Directory the model files are written into
    pub fn model_dir(&self) -> &PathBuf {
        &self.model_dir
    }

    fn query_columns(&mut self, table_name: &str) -> Result<Vec<Column>, RepogenError> {
        trace!(table = ?table_name, "Querying columns");

        let sql = r#"
            SELECT
                a.attname AS column_name,
                format_type(a.atttypid, a.atttypmod) AS column_type,
                NOT a.attnotnull AS is_nullable,
                COALESCE(i.indisprimary, false) AS is_primary_key
            FROM pg_attribute a
            JOIN pg_class c ON c.oid = a.attrelid
            JOIN pg_namespace n ON n.oid = c.relnamespace
            LEFT JOIN pg_index i ON i.indrelid = c.oid
                AND a.attnum = ANY(i.indkey)
                AND i.indisprimary
            WHERE c.relname = $1
                AND n.nspname = $2
                AND a.attnum > 0
                AND NOT a.attisdropped
            ORDER BY a.attnum
        "#;

        let rows = self
            .client
            .query(sql, &[&table_name, &self.schema_name])
            .map_err(|e| {
                RepogenError::Introspection(format!(
                    "query columns for table '{table_name}' failed: {e}"
                ))
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let column_type: String = row.get("column_type");
            let sql_type = base_type_name(&column_type);
            columns.push(Column {
                name: row.get("column_name"),
                sql_type,
                column_type: Some(column_type),
                is_nullable: row.get("is_nullable"),
                is_primary_key: row.get("is_primary_key"),
            });
        }

        Ok(columns)
    }
}

impl ModelGenerator for PostgresGenerator<'_> {
    fn list_tables(&mut self) -> Result<Vec<String>, RepogenError> {
        trace!(schema = ?self.schema_name, "Querying tables");

        let sql = r#"
            SELECT c.relname AS table_name
            FROM pg_class c
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE c.relkind = 'r'
                AND n.nspname = $1
            ORDER BY c.relname
        "#;

        let rows = self
            .client
            .query(sql, &[&self.schema_name])
            .map_err(|e| RepogenError::Introspection(format!("query tables failed: {e}")))?;

        let tables: Vec<String> = rows.iter().map(|row| row.get("table_name")).collect();
        trace!(tables = ?tables, "Tables found");
        Ok(tables)
    }

    fn generate_model(
        &mut self,
        table: &TableSpec,
        overrides: &OverrideResolver,
    ) -> Result<(), RepogenError> {
        let columns = self.query_columns(&table.name)?;
        debug!(table = %table.name, columns = columns.len(), "Rendering model");

        let mut imports: BTreeSet<String> = BTreeSet::new();
        let mut fields = Vec::with_capacity(columns.len());

        for col in &columns {
            let field_key = col.field_key(&table.name);
            let resolved = overrides.resolve(&col.sql_type, col.column_type.as_deref(), &field_key);

            let go_type = match &resolved {
                Some(ov) => {
                    if let Some(import) = &ov.import {
                        imports.insert(import.clone());
                    }
                    ov.type_name.clone()
                }
                None => {
                    let t = default_go_type(&col.sql_type);
                    if t == "time.Time" {
                        imports.insert("time".to_string());
                    }
                    t.to_string()
                }
            };

            let go_type = if self.field_nullable && col.is_nullable && !go_type.starts_with('*') {
                format!("*{go_type}")
            } else {
                go_type
            };

            fields.push(minijinja::context! {
                go_name => to_pascal_case(&col.name),
                go_type => go_type,
                tag => gorm_tag(col, self.field_with_type_tag),
            });
        }

        let template = self
            .env
            .get_template("model")
            .map_err(|e| RepogenError::TemplateRender {
                name: format!("model (table '{}')", table.name),
                message: format!("Template error: {e}"),
            })?;

        let code = template
            .render(minijinja::context! {
                package => &self.model_pkg,
                table_name => &table.name,
                model_name => &table.model_name,
                imports => imports.iter().collect::<Vec<_>>(),
                columns => fields,
            })
            .map_err(|e| RepogenError::TemplateRender {
                name: format!("model (table '{}')", table.name),
                message: format!("Render error: {e}"),
            })?;

        self.pending.push(ModelArtifact {
            table_name: table.name.clone(),
            file_name: format!("{}.gen.go", table.name),
            code,
        });
        Ok(())
    }

    fn execute(&mut self) -> Result<(), RepogenError> {
        fs::create_dir_all(&self.model_dir).map_err(|source| RepogenError::DirCreate {
            path: self.model_dir.clone(),
            source,
        })?;

        for artifact in self.pending.drain(..) {
            let path = self.model_dir.join(&artifact.file_name);
            fs::write(&path, &artifact.code).map_err(|source| RepogenError::FileWrite {
                path: path.clone(),
                name: format!("table '{}'", artifact.table_name),
                source,
            })?;
            debug!(path = ?path, "Wrote model file");
        }

        Ok(())
    }
}

/// Strip the parameter list and modifiers from a full column type text,
/// e.g. `numeric(10,2)` -> `decimal`, `timestamp with time zone` -> `timestamp`
fn base_type_name(column_type: &str) -> String {
    let head = column_type.split('(').next().unwrap_or(column_type).trim();
    match head {
        "character varying" => "varchar".to_string(),
        "double precision" => "double precision".to_string(),
        // Postgres reports DECIMAL columns as numeric; fold both onto the
        // decimal key so the shopspring override applies to them.
        "numeric" | "decimal" => "decimal".to_string(),
        other => other
            .split_whitespace()
            .next()
            .unwrap_or(other)
            .to_string(),
    }
}

/// Default Go type inference for PostgreSQL types, used when no override
/// applies
fn default_go_type(sql_type: &str) -> &'static str {
    match sql_type {
        "smallint" | "int2" => "int16",
        "integer" | "int" | "int4" => "int32",
        "bigint" | "int8" => "int64",
        "boolean" | "bool" => "bool",
        "real" | "float4" => "float32",
        "double precision" | "float8" => "float64",
        "numeric" | "decimal" => "float64",
        "timestamp" | "timestamptz" | "date" | "time" | "timetz" => "time.Time",
        "bytea" => "[]byte",
        "json" | "jsonb" | "uuid" | "text" | "varchar" | "character" | "char" => "string",
        _ => "string",
    }
}

/// Build the struct tag for a column
fn gorm_tag(col: &Column, with_type_tag: bool) -> String {
    let mut parts = vec![format!("column:{}", col.name)];
    if with_type_tag {
        if let Some(column_type) = &col.column_type {
            parts.push(format!("type:{column_type}"));
        }
    }
    if col.is_primary_key {
        parts.push("primaryKey".to_string());
    }
    if !col.is_nullable && !col.is_primary_key {
        parts.push("not null".to_string());
    }
    format!("gorm:\"{}\" json:\"{}\"", parts.join(";"), col.name)
}
