use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use arca::{
    load_config, to_object, AlterSchemaRequest, ArcaClient, JsonObject, QueryRequest,
    SkillMetadata, TableColumn, UpdateRequest, UpsertRequest, VectorAddRequest,
    VectorSearchRequest,
};

/// Arca: private data vault for personal AI assistants
#[derive(Parser)]
#[command(name = "arca")]
#[command(about = "Command-line client for the Arca tables and vectors API.")]
#[command(version)]
struct Cli {
    /// API key (falls back to the config file)
    #[arg(long, global = true, env = "ARCA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the Arca deployment
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to a config file (toml, json or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Structured tables
    #[command(subcommand)]
    Tables(TablesCommand),
    /// Vector tables and semantic search
    #[command(subcommand)]
    Vectors(VectorsCommand),
    /// Show the skills of every table and vector table
    Skills,
}

#[derive(Subcommand)]
enum TablesCommand {
    /// List tables
    List,
    /// Show the column schema of every table
    Schemas,
    /// Create a table or append a row
    Upsert {
        table: String,
        /// Row as a JSON object
        #[arg(short, long)]
        data: String,
        /// Column definition as name:TYPE (only needed on first insert)
        #[arg(long = "column", value_parser = parse_column)]
        columns: Vec<TableColumn>,
        /// Skill description for the table
        #[arg(long)]
        description: Option<String>,
        /// Example SQL for the skill (repeatable)
        #[arg(long = "example")]
        examples: Vec<String>,
    },
    /// Query rows
    Query(QueryArgs),
    /// Update rows matching exact column values
    Update {
        table: String,
        /// New values as a JSON object
        #[arg(short, long)]
        data: String,
        /// Exact-match condition as column=value (repeatable; none updates every row)
        #[arg(long = "where-eq", value_parser = parse_assignment)]
        conditions: Vec<(String, Value)>,
    },
    /// Add columns to a table
    Alter {
        table: String,
        /// New column as name:TYPE or name:TYPE=default (repeatable)
        #[arg(long = "add", required = true, value_parser = parse_new_column)]
        columns: Vec<(TableColumn, Option<Value>)>,
    },
    /// Delete a table
    Delete { table: String },
    /// Show a table's skill
    Skill { table: String },
    /// Show the skills of every table
    Skills,
    /// Export a table as Parquet
    Export {
        table: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct QueryArgs {
    table: String,
    /// Raw SQL WHERE clause, e.g. "calories > 500"
    #[arg(short = 'w', long = "where")]
    clause: Option<String>,
    /// Structured filter as key=value (repeatable)
    #[arg(short, long = "filter", value_parser = parse_assignment)]
    filters: Vec<(String, Value)>,
    /// Only rows created in the last N days
    #[arg(long)]
    days_ago: Option<u32>,
    #[arg(short, long)]
    limit: Option<u64>,
    #[arg(long)]
    offset: Option<u64>,
    /// e.g. "created_at DESC"
    #[arg(long)]
    order_by: Option<String>,
    /// Columns to select (comma-separated)
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,
    #[arg(long)]
    group_by: Option<String>,
    #[arg(long)]
    having: Option<String>,
}

#[derive(Subcommand)]
enum VectorsCommand {
    /// Add a text entry
    Add {
        table: String,
        #[arg(short, long)]
        text: String,
        /// Metadata as a JSON object
        #[arg(short, long)]
        metadata: Option<String>,
        /// Pre-computed embedding (comma-separated floats)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        embedding: Vec<f64>,
    },
    /// Search semantically
    Search {
        table: String,
        query: String,
        #[arg(short, long, default_value = "5")]
        limit: u32,
        /// SQL-like metadata filter, e.g. "mood = 'positive'"
        #[arg(short, long)]
        filter: Option<String>,
        /// Pre-computed query embedding (comma-separated floats)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        embedding: Vec<f64>,
    },
    /// List vector tables
    List,
    /// Delete a vector table
    Delete { table: String },
    /// Show a vector table's skill
    Skill { table: String },
    /// Show the skills of every vector table
    Skills,
    /// Export a vector table as CSV
    Export {
        table: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }

    let client = ArcaClient::from_config(&config)?;
    tracing::debug!(base_url = %client.base_url(), "client ready");

    match cli.command {
        Commands::Tables(cmd) => run_tables(&client, cmd).await,
        Commands::Vectors(cmd) => run_vectors(&client, cmd).await,
        Commands::Skills => print_json(&client.all_skills().await?),
    }
}

async fn run_tables(client: &ArcaClient, cmd: TablesCommand) -> anyhow::Result<()> {
    let tables = client.tables();
    match cmd {
        TablesCommand::List => print_json(&tables.list_tables().await?),
        TablesCommand::Schemas => print_json(&tables.get_schemas().await?),
        TablesCommand::Upsert {
            table,
            data,
            columns,
            description,
            examples,
        } => {
            let mut req = UpsertRequest::new(table, parse_object(&data, "--data")?).columns(columns);
            if description.is_some() || !examples.is_empty() {
                let mut skill = SkillMetadata::new();
                skill.description = description;
                if !examples.is_empty() {
                    skill = skill.examples(examples);
                }
                req = req.skill(skill);
            }
            print_json(&tables.upsert(req).await?)
        }
        TablesCommand::Query(args) => print_json(&tables.query(args.into_request()).await?),
        TablesCommand::Update {
            table,
            data,
            conditions,
        } => {
            let req = conditions.into_iter().fold(
                UpdateRequest::new(table, parse_object(&data, "--data")?),
                |req, (column, value)| req.where_eq(column, value),
            );
            print_json(&tables.update(req).await?)
        }
        TablesCommand::Alter { table, columns } => {
            let req = columns
                .into_iter()
                .fold(AlterSchemaRequest::new(table), |req, (column, default)| match default {
                    Some(value) => req.add_column_with_default(column, value),
                    None => req.add_column(column),
                });
            print_json(&tables.alter_schema(req).await?)
        }
        TablesCommand::Delete { table } => print_json(&tables.delete(&table).await?),
        TablesCommand::Skill { table } => print_skill(tables.get_skill(&table).await?),
        TablesCommand::Skills => print_json(&tables.get_all_skills().await?),
        TablesCommand::Export { table, output } => {
            write_export(&tables.export(&table).await?, output.as_ref())
        }
    }
}

async fn run_vectors(client: &ArcaClient, cmd: VectorsCommand) -> anyhow::Result<()> {
    let vectors = client.vectors();
    match cmd {
        VectorsCommand::Add {
            table,
            text,
            metadata,
            embedding,
        } => {
            let mut req = VectorAddRequest::new(table, text);
            if let Some(metadata) = metadata {
                req = req.metadata(parse_object(&metadata, "--metadata")?);
            }
            if !embedding.is_empty() {
                req = req.embedding(embedding);
            }
            print_json(&vectors.add(req).await?)
        }
        VectorsCommand::Search {
            table,
            query,
            limit,
            filter,
            embedding,
        } => {
            let mut req = VectorSearchRequest::new(table, query).limit(limit);
            if let Some(filter) = filter {
                req = req.filter(filter);
            }
            if !embedding.is_empty() {
                req = req.embedding(embedding);
            }
            print_json(&vectors.search(req).await?)
        }
        VectorsCommand::List => print_json(&vectors.list_tables().await?),
        VectorsCommand::Delete { table } => print_json(&vectors.delete(&table).await?),
        VectorsCommand::Skill { table } => print_skill(vectors.get_skill(&table).await?),
        VectorsCommand::Skills => print_json(&vectors.get_all_skills().await?),
        VectorsCommand::Export { table, output } => {
            write_export(&vectors.export(&table).await?, output.as_ref())
        }
    }
}

impl QueryArgs {
    fn into_request(self) -> QueryRequest {
        let mut req = QueryRequest::new(self.table).select(self.select);
        for (key, value) in self.filters {
            req = req.filter(key, value);
        }
        if let Some(days) = self.days_ago {
            req = req.days_ago(days);
        }
        if let Some(clause) = self.clause {
            req = req.query(clause);
        }
        req.limit = self.limit;
        req.offset = self.offset;
        req.order_by = self.order_by;
        req.group_by = self.group_by;
        req.having = self.having;
        req
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the SKILL.md body as-is; it is markdown, not JSON.
fn print_skill(resp: arca::SkillResponse) -> anyhow::Result<()> {
    if let Some(skill) = &resp.skill {
        println!("{skill}");
        return Ok(());
    }
    print_json(&resp)
}

fn write_export(bytes: &[u8], output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => std::io::stdout().lock().write_all(bytes)?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

fn parse_object(raw: &str, flag: &str) -> anyhow::Result<JsonObject> {
    let value: Value =
        serde_json::from_str(raw).with_context(|| format!("{flag} must be valid JSON"))?;
    if !value.is_object() {
        bail!("{flag} must be a JSON object");
    }
    Ok(to_object(&value)?)
}

/// `key=value`; the value is read as JSON when it parses, otherwise as a string.
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), parse_scalar(value)))
}

fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// `name:TYPE`
fn parse_column(raw: &str) -> Result<TableColumn, String> {
    let (name, ty) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected name:TYPE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing column name in '{raw}'"));
    }
    let column_type = ty.parse().map_err(|e: arca::ArcaError| e.to_string())?;
    Ok(TableColumn::new(name, column_type))
}

/// `name:TYPE` or `name:TYPE=default`
fn parse_new_column(raw: &str) -> Result<(TableColumn, Option<Value>), String> {
    match raw.split_once('=') {
        Some((column, default)) => Ok((parse_column(column)?, Some(parse_scalar(default)))),
        None => Ok((parse_column(raw)?, None)),
    }
}
