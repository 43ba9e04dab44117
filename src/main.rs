use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use repogen::config::{Dialect, GenerationRequest};

#[derive(Parser, Debug)]
#[command(name = "repogen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Database DSN (falls back to DATABASE_DSN when omitted)
    #[arg(long, default_value = "")]
    dsn: String,

    /// Target database dialect (case-insensitive)
    #[arg(long = "db-type", value_enum, ignore_case = true, default_value_t = Dialect::Mysql)]
    db_type: Dialect,

    /// Comma-separated list of tables to generate (default: all)
    #[arg(long, value_delimiter = ',')]
    tables: Vec<String>,

    /// Comma-separated list of tables to exclude
    #[arg(long = "exclude", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Generate models only, skip repository and test files
    #[arg(long = "only-model")]
    only_model: bool,

    /// Output directory for the generated query entry code
    #[arg(long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Output filename for the generated query entry code
    #[arg(long = "out-file")]
    out_file: Option<String>,

    /// Generate unit tests alongside the models
    #[arg(long = "unittest")]
    unittest: bool,

    /// Model package name, or fully qualified package path
    #[arg(long = "model-pkg")]
    model_pkg: Option<String>,

    /// Render nullable columns as pointer types
    #[arg(long)]
    nullable: bool,

    /// Detect unsigned integer columns
    #[arg(long)]
    signable: bool,

    /// Include index information in the gorm tag
    #[arg(long = "index-tag")]
    index_tag: bool,

    /// Include the column type in the gorm tag
    #[arg(long = "type-tag")]
    type_tag: bool,

    /// Directory of SQL files to generate from instead of a live connection
    #[arg(long = "sql-dir")]
    sql_dir: Option<PathBuf>,

    /// Path to a YAML field-mapping config file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Path to .env file consulted for the DSN fallback
    #[arg(long = "env-file", default_value = "./.env")]
    env_file: PathBuf,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("repogen v{}", env!("CARGO_PKG_VERSION"));
    info!(
        dialect = cli.db_type.as_str(),
        tables = ?cli.tables,
        exclude = ?cli.exclude,
        only_model = cli.only_model,
        "Starting code generation"
    );

    let request = build_request(cli)?;
    debug!(dsn = %request.redacted_dsn(), "Generation request ready");

    if request.sql_dir.is_some() {
        // SQL-directory mode takes precedence over the DSN but needs a SQL
        // parsing backend this binary does not ship.
        bail!("SQL directory mode requires an external schema provider and is not supported by this build");
    }

    match request.dialect {
        Dialect::Postgres => run_postgres(&request),
        other => bail!(
            "{} support not enabled in this build; only a postgres driver is available",
            other.as_str()
        ),
    }
}

fn build_request(cli: Cli) -> Result<GenerationRequest> {
    let mut request = GenerationRequest::new(cli.db_type);
    request.dsn = cli.dsn;
    request.tables = cli.tables;
    request.exclude_tables = cli.exclude;
    request.only_model = cli.only_model;
    if let Some(out_dir) = cli.out_dir {
        request.out_path = out_dir;
    }
    if let Some(out_file) = cli.out_file {
        request.out_file = out_file;
    }
    request.with_unit_test = cli.unittest;
    if let Some(model_pkg) = cli.model_pkg {
        request.model_pkg_name = model_pkg;
    }
    request.field_nullable = cli.nullable;
    request.field_signable = cli.signable;
    request.field_with_index_tag = cli.index_tag;
    request.field_with_type_tag = cli.type_tag;
    request.sql_dir = cli.sql_dir;

    if let Some(config) = &cli.config {
        request
            .apply_config_file(config)
            .context("parse config file failed")?;
    }

    if request.sql_dir.is_none() {
        request
            .resolve_dsn(&cli.env_file)
            .context("Failed to resolve database DSN")?;
    }

    Ok(request)
}

#[cfg(feature = "postgres")]
fn run_postgres(request: &GenerationRequest) -> Result<()> {
    use postgres::NoTls;
    use repogen::codegen::RepoCodegen;
    use repogen::config::DEFAULT_REPO_DIR;
    use repogen::generator::emit_models;
    use repogen::overrides::OverrideResolver;
    use repogen::tables::resolve_tables;
    use repogen::PostgresGenerator;
    use tracing::warn;

    info!(dsn = %request.redacted_dsn(), "Connecting to PostgreSQL");

    let mut client = postgres::Client::connect(&request.dsn, NoTls).with_context(|| {
        format!("Failed to connect to PostgreSQL at {}", request.redacted_dsn())
    })?;

    info!("Connected to database");

    let mut generator = PostgresGenerator::new(&mut client, request);
    let overrides = OverrideResolver::new(&request.field_mappings);

    let tables = resolve_tables(request, &mut generator).context("Failed to resolve table set")?;
    if tables.is_empty() {
        warn!("No tables found after filtering");
        return Ok(());
    }
    info!(tables = tables.len(), "Table set resolved");

    for table in &tables {
        debug!(table = %table.name, model = %table.model_name, "Table");
    }

    emit_models(&mut generator, &tables, &overrides).context("Failed to generate models")?;

    if request.only_model {
        info!("only-model set, skipping repository generation");
        return Ok(());
    }

    let codegen = RepoCodegen::new();
    codegen
        .generate(&tables, &PathBuf::from(DEFAULT_REPO_DIR), &request.model_pkg_name)
        .context("Failed to generate repository code")?;

    Ok(())
}

#[cfg(not(feature = "postgres"))]
fn run_postgres(_request: &GenerationRequest) -> Result<()> {
    bail!("PostgreSQL support not enabled. Rebuild with --features postgres")
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}
