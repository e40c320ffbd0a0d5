use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::Result;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ddlsmith_core::{Config, Diagnostic, InspectionReport, ObjectIdentifier, ObjectKind, Severity};
use ddlsmith_sql::{find_transformation_by_alias, inspect_statement, DdlValidator, ObjectSpec};
use ddlsmith_catalog::{
    MockCatalog, SnowflakeCatalogBuilder, SnowflakeCredentials, TableFilter, WarehouseCatalog,
};
use ddlsmith_engine::{Deployer, ObjectInspector};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ddlsmith - Reverse-engineer and generate Snowflake view and dynamic table DDL
#[derive(Parser)]
#[command(name = "ddlsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ddlsmith.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use the built-in sample catalog instead of Snowflake
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a CREATE statement into projections, source and options
    Parse {
        /// DDL file to read ("-" for stdin)
        #[arg(default_value = "-")]
        file: PathBuf,

        /// Object kind the statement creates
        #[arg(short, long)]
        kind: Option<ObjectKind>,

        /// Qualified name of the object (SCHEMA.NAME)
        #[arg(long)]
        object: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find the transformation behind one output column
    Lookup {
        /// DDL file to read ("-" for stdin)
        file: PathBuf,

        /// Output column alias
        alias: String,
    },

    /// Generate DDL from a TOML object spec
    Generate {
        /// Object spec file
        spec: PathBuf,

        /// Skip syntax validation
        #[arg(long)]
        no_validate: bool,

        /// Write the statement to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch an object's DDL from the warehouse and decompose it
    Inspect {
        /// Qualified object name (SCHEMA.NAME or DATABASE.SCHEMA.NAME)
        object: String,

        /// Object kind
        #[arg(short, long, default_value = "view")]
        kind: ObjectKind,

        /// Also describe the object's columns
        #[arg(long)]
        columns: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Print an editable object spec (TOML) for `generate` instead of the report
        #[arg(long, conflicts_with_all = ["json", "columns"])]
        spec: bool,
    },

    /// List schemas of a database
    Schemas {
        /// Database name
        database: String,
    },

    /// List objects in a schema
    List {
        /// Schema name
        schema: String,

        /// all, standard, dynamic or views
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Validate a DDL file and execute it against the warehouse
    Deploy {
        /// DDL file to read ("-" for stdin)
        file: PathBuf,
    },

    /// Write a default ddlsmith.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new(Config::FILE_NAME).exists() {
        Config::from_file(Path::new(Config::FILE_NAME))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if cli.verbose {
        eprintln!("{} dialect: {:?}", "Using".cyan(), config.dialect);
    }

    match cli.command {
        Commands::Parse { file, kind, object, json, output } => {
            parse_command(&file, kind, object.as_deref(), json, output.as_deref())
        }
        Commands::Lookup { file, alias } => lookup_command(&file, &alias),
        Commands::Generate { spec, no_validate, output } => {
            generate_command(&config, &spec, !no_validate, output.as_deref(), cli.verbose)
        }
        Commands::Inspect { object, kind, columns, json, spec } => {
            let catalog = connect(&config, cli.mock, cli.verbose).await?;
            if spec {
                spec_command(catalog, &object, kind).await
            } else {
                inspect_command(&config, catalog, &object, kind, columns, json).await
            }
        }
        Commands::Schemas { database } => {
            let catalog = connect(&config, cli.mock, cli.verbose).await?;
            schemas_command(catalog.as_ref(), &database).await
        }
        Commands::List { schema, filter } => {
            let catalog = connect(&config, cli.mock, cli.verbose).await?;
            list_command(catalog.as_ref(), &schema, &filter).await
        }
        Commands::Deploy { file } => {
            let catalog = connect(&config, cli.mock, cli.verbose).await?;
            deploy_command(&config, catalog, &file).await
        }
        Commands::Init { force } => init_command(&config, force),
    }
}

/// Log to stderr; RUST_LOG overrides the level picked by --verbose
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Read a DDL file, or stdin for "-"
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

fn parse_object(qualified: &str) -> Result<ObjectIdentifier> {
    ObjectIdentifier::parse(qualified).ok_or_else(|| {
        anyhow::anyhow!("Expected SCHEMA.NAME or DATABASE.SCHEMA.NAME, got '{}'", qualified)
    })
}

/// Open the catalog selected by --mock or the [connection] section
async fn connect(config: &Config, mock: bool, verbose: bool) -> Result<Arc<dyn WarehouseCatalog>> {
    let catalog: Arc<dyn WarehouseCatalog> = if mock {
        Arc::new(MockCatalog::sample().with_excluded_schemas(config.excluded_schemas.clone()))
    } else {
        let connection = config.connection.as_ref().ok_or_else(|| {
            anyhow::anyhow!("No [connection] section in config. Add one or pass --mock.")
        })?;
        let credentials = SnowflakeCredentials::from_env()?;
        let catalog = SnowflakeCatalogBuilder::from_config(connection, credentials)
            .with_excluded_schemas(config.excluded_schemas.clone())
            .build()?;
        Arc::new(catalog)
    };

    if verbose {
        eprintln!("{} {} connection...", "Testing".cyan(), catalog.name());
    }

    catalog.test_connection().await
        .map_err(|e| anyhow::anyhow!("Failed to connect to warehouse: {}", e))?;

    if verbose {
        eprintln!("{}", "✓ Connection successful".green());
    }

    Ok(catalog)
}

/// Parse command - decompose local DDL
fn parse_command(
    file: &Path,
    kind: Option<ObjectKind>,
    object: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let ddl = read_input(file)?;
    let object = object.map(parse_object).transpose()?;
    let report = inspect_statement(&ddl, object, kind);

    if let Some(path) = output {
        report.save_to_file(path)?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_inspection(&report);
    }

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Lookup command - transformation for one alias
fn lookup_command(file: &Path, alias: &str) -> Result<()> {
    let ddl = read_input(file)?;

    match find_transformation_by_alias(&ddl, alias) {
        Some(transformation) => {
            println!("{}", transformation);
            Ok(())
        }
        None => {
            eprintln!("{} no column aliased '{}'", "✗".red(), alias);
            std::process::exit(1);
        }
    }
}

/// Generate command - render (and validate) DDL from an object spec
fn generate_command(
    config: &Config,
    spec: &Path,
    validate: bool,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let contents = std::fs::read_to_string(spec)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", spec.display(), e))?;
    let spec = ObjectSpec::from_toml(&contents)
        .map_err(|e| anyhow::anyhow!("Invalid object spec: {}", e))?
        .with_defaults(&config.defaults);
    let statement = spec.as_statement();
    let object = statement.identifier().fqn();

    let ddl = if validate {
        match DdlValidator::from_dialect(&config.dialect).validate_statement(statement) {
            Ok(ddl) => ddl,
            Err(err) => {
                print_diagnostics(&[err.to_diagnostic(Some(object.as_str()))]);
                std::process::exit(1);
            }
        }
    } else {
        statement.create_ddl()?
    };

    if verbose {
        eprintln!("{} {} {}", "Generated".cyan(), statement.kind(), object);
    }

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", ddl))?;
            eprintln!("{} {}", "DDL written to:".green(), path.display());
        }
        None => println!("{}", ddl),
    }

    Ok(())
}

/// Inspect command - decompose an object fetched from the warehouse
async fn inspect_command(
    config: &Config,
    catalog: Arc<dyn WarehouseCatalog>,
    object: &str,
    kind: ObjectKind,
    columns: bool,
    json: bool,
) -> Result<()> {
    let object = parse_object(object)?;
    let inspector = ObjectInspector::new(catalog);

    let report = match inspector.inspect(&object, kind).await {
        Ok(report) => report,
        Err(err) => {
            print_diagnostics(&[err.to_diagnostic(Some(object.fqn().as_str()))]);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_inspection(&report);
    }

    if columns {
        let mut registry = config.type_registry();
        let described = inspector.columns(&object, kind, &mut registry).await?;

        println!("{}", "Columns:".bold());
        for column in &described {
            println!("  {}", column.to_column_sql());
        }
        println!();
    }

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Inspect --spec - rebuild an existing object as an editable spec
async fn spec_command(catalog: Arc<dyn WarehouseCatalog>, object: &str, kind: ObjectKind) -> Result<()> {
    let object = parse_object(object)?;

    match ObjectInspector::new(catalog).definition(&object, kind).await {
        Ok(spec) => {
            print!("{}", spec.to_toml()?);
            Ok(())
        }
        Err(err) => {
            print_diagnostics(&[err.to_diagnostic(Some(object.fqn().as_str()))]);
            std::process::exit(1);
        }
    }
}

/// Schemas command - list non-system schemas
async fn schemas_command(catalog: &dyn WarehouseCatalog, database: &str) -> Result<()> {
    let schemas = catalog.list_schemas(database).await?;

    if schemas.is_empty() {
        println!("{}", "No schemas found".yellow());
    }
    for schema in schemas {
        println!("{}", schema);
    }

    Ok(())
}

/// List command - tables, dynamic tables or views of a schema
async fn list_command(catalog: &dyn WarehouseCatalog, schema: &str, filter: &str) -> Result<()> {
    let names = if filter.eq_ignore_ascii_case("views") {
        catalog.list_views(schema).await?
    } else {
        let filter: TableFilter = filter.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        catalog.list_tables(schema, filter).await?
    };

    if names.is_empty() {
        println!("{} {}", "No objects found in".yellow(), schema);
    }
    for name in names {
        println!("{}", name);
    }

    Ok(())
}

/// Deploy command - validate then execute a DDL file
async fn deploy_command(config: &Config, catalog: Arc<dyn WarehouseCatalog>, file: &Path) -> Result<()> {
    let sql = read_input(file)?;
    let deployer = Deployer::new(catalog).with_validator(DdlValidator::from_dialect(&config.dialect));

    match deployer.deploy_sql(&sql).await {
        Ok(outcome) => {
            tracing::debug!(statement = %outcome.statement, "executed");
            println!("{}", "✓ Deployed".green().bold());
            for status in &outcome.status {
                println!("  {}", status);
            }
            Ok(())
        }
        Err(err) => {
            print_diagnostics(&[err.to_diagnostic(None)]);
            std::process::exit(1);
        }
    }
}

/// Init command - write the default config
fn init_command(config: &Config, force: bool) -> Result<()> {
    let path = Path::new(Config::FILE_NAME);
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite.",
            Config::FILE_NAME
        ));
    }

    config.save_to_file(path)?;
    println!("{} {}", "✓ Wrote".green(), path.display());

    Ok(())
}

/// Print an inspection report to stdout
fn print_inspection(report: &InspectionReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    match (&report.object, report.kind) {
        (Some(object), Some(kind)) => {
            println!("{} {}", format!("{}", kind).bold().bright_blue(), object.fqn().bold().bright_blue())
        }
        _ => println!("{}", "DDL Decomposition".bold().bright_blue()),
    }
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if let Some(source) = &report.source {
        println!("{} {}", "Source:".bold(), source.qualified_name());
    }
    if let Some(lag) = &report.options.target_lag {
        println!("{} {}", "Target lag:".bold(), lag);
    }
    if let Some(warehouse) = &report.options.warehouse {
        println!("{} {}", "Warehouse:".bold(), warehouse);
    }
    println!();

    println!(
        "{} {} of {} recognized",
        "Projections:".bold(),
        report.summary.recognized,
        report.summary.candidates
    );
    for projection in &report.projections {
        let output_type = projection.output_type.as_deref().unwrap_or("-");
        println!(
            "  {:<24} {:<16} {}",
            projection.alias.cyan(),
            output_type,
            projection.transformation
        );
    }

    if !report.unrecognized.is_empty() {
        println!();
        println!("{}", "Unrecognized:".bold());
        for raw in &report.unrecognized {
            println!("  {}", raw.yellow());
        }
    }

    println!();
    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        print_diagnostics(&report.diagnostics);
    }

    println!("{}", "=".repeat(60).bright_blue());
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    println!("{}", "Diagnostics:".bold());
    for diag in diagnostics {
        let severity_str = match diag.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warn => "WARN".yellow().bold(),
            Severity::Info => "INFO".cyan(),
        };

        println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

        if let Some(loc) = &diag.location {
            print!("    at {}", loc.object);
            if let Some(offset) = loc.offset {
                print!(":{}", offset);
            }
            println!();
        }

        if let Some(snippet) = &diag.snippet {
            println!("    {}", snippet.dimmed());
        }
    }
    println!();
}
