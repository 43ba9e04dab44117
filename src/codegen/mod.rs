//! Repository code generation
//!
//! Renders the repository implementation, repository test, and shared
//! test-utility files for each resolved table. The generated output is Go
//! source built around the model structs the model generator emits.

use std::fs;
use std::path::Path;

use minijinja::Environment;
use tracing::{debug, info};

use crate::error::RepogenError;
use crate::schema::TableSpec;

/// Primary key type assumed by the generated repositories
const ID_TYPE: &str = "int64";

/// Repository/test template engine
pub struct RepoCodegen {
    env: Environment<'static>,
}

impl RepoCodegen {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Register templates
        env.add_template("repo", include_str!("templates/repo.go.jinja"))
            .expect("Failed to load repo template");
        env.add_template("repo_test", include_str!("templates/repo_test.go.jinja"))
            .expect("Failed to load repo test template");
        env.add_template("test_util", include_str!("templates/test_util.go.jinja"))
            .expect("Failed to load test util template");

        Self { env }
    }

    /// Render repository, test, and test-utility files for every table
    ///
    /// Creates `out_dir` if needed (pre-existing is fine) and overwrites
    /// existing files of the same name. A failure on one table aborts
    /// before the next; files already written stay on disk.
    pub fn generate(
        &self,
        tables: &[TableSpec],
        out_dir: &Path,
        model_pkg_path: &str,
    ) -> Result<(), RepogenError> {
        info!(path = ?out_dir, tables = tables.len(), "Generating repository code");

        fs::create_dir_all(out_dir).map_err(|source| RepogenError::DirCreate {
            path: out_dir.to_path_buf(),
            source,
        })?;

        // Shared test DB helper, rendered once per run
        let util_code = self.render("test_util", minijinja::context! {})?;
        let util_path = out_dir.join("test_util_test.go");
        write_file(&util_path, &util_code, "test util")?;
        debug!(path = ?util_path, "Generated test util file");

        for table in tables {
            let ctx = minijinja::context! {
                model_name => &table.model_name,
                var_name => &table.var_name,
                model_pkg_path => model_pkg_path,
                id_type => ID_TYPE,
            };

            let table_label = format!("table '{}'", table.name);

            let impl_code = self.render_for_table("repo", table, ctx.clone())?;
            let impl_path = out_dir.join(format!("{}.repo.go", table.var_name));
            write_file(&impl_path, &impl_code, &table_label)?;

            let test_code = self.render_for_table("repo_test", table, ctx)?;
            let test_path = out_dir.join(format!("{}.repo_test.go", table.var_name));
            write_file(&test_path, &test_code, &table_label)?;

            debug!(
                table = %table.name,
                impl_path = ?impl_path,
                test_path = ?test_path,
                "Generated repository files"
            );
        }

        info!(tables = tables.len(), "Repository code generation complete");
        Ok(())
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, RepogenError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| RepogenError::TemplateRender {
                name: name.to_string(),
                message: format!("Template error: {e}"),
            })?;

        template.render(ctx).map_err(|e| RepogenError::TemplateRender {
            name: name.to_string(),
            message: format!("Render error: {e}"),
        })
    }

    fn render_for_table(
        &self,
        template: &str,
        table: &TableSpec,
        ctx: minijinja::Value,
    ) -> Result<String, RepogenError> {
        self.render(template, ctx)
            .map_err(|e| match e {
                RepogenError::TemplateRender { name, message } => RepogenError::TemplateRender {
                    name: format!("{name} (table '{}')", table.name),
                    message,
                },
                other => other,
            })
    }
}

impl Default for RepoCodegen {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str, name: &str) -> Result<(), RepogenError> {
    fs::write(path, content).map_err(|source| RepogenError::FileWrite {
        path: path.to_path_buf(),
        name: name.to_string(),
        source,
    })
}
