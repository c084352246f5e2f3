use std::path::PathBuf;

use clap::{Parser, Subcommand};
use neotass_dimensional::config::EtlConfig;
use neotass_dimensional::{EtlError, Result, logging, pipeline, schema};
use tracing::info;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        if error.is_column_mismatch() {
            eprintln!(
                "hint: check the capitalization of the CNPJ and unit price columns in the source files, \
                 or adjust the [columns] section of the configuration"
            );
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "info" };
    logging::init(level)?;

    match cli.command {
        Command::Run(args) => execute_run(args),
        Command::Schema(args) => execute_schema(args),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) if !path.exists() => return Err(EtlError::MissingInput(path.clone())),
        Some(path) => EtlConfig::load(path)?,
        None => EtlConfig::default(),
    };
    args.apply(&mut config);

    info!("starting NEOTASS dimensional ETL");
    let star = pipeline::run(&config)?;
    info!(
        partners = star.dim_parceiro.len(),
        products = star.dim_produto.len(),
        dates = star.dim_tempo.len(),
        opportunities = star.fato_registro_oportunidade.len(),
        sellout = star.fato_sellout.len(),
        output = %config.paths.output.display(),
        "ETL finished"
    );
    Ok(())
}

fn execute_schema(args: SchemaArgs) -> Result<()> {
    let ddl = schema::render_ddl(&schema::contract());
    match args.output {
        Some(path) => {
            std::fs::write(&path, ddl)?;
            info!(path = %path.display(), "schema written");
        }
        None => print!("{ddl}"),
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Build the NEOTASS star schema from the opportunity registry and sell-out ledger."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract both sources, build the dimensional model and save the workbook.
    Run(RunArgs),
    /// Print the relational schema of the dimensional model.
    Schema(SchemaArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Opportunity registry (JSON).
    #[arg(long)]
    opportunities: Option<PathBuf>,

    /// Sell-out ledger (CSV or XLSX).
    #[arg(long)]
    sellout: Option<PathBuf>,

    /// Output workbook path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Locale for month and weekday names, e.g. pt_BR or POSIX.
    #[arg(long)]
    locale: Option<String>,
}

impl RunArgs {
    fn apply(&self, config: &mut EtlConfig) {
        if let Some(path) = &self.opportunities {
            config.paths.opportunities = path.clone();
        }
        if let Some(path) = &self.sellout {
            config.paths.sellout = path.clone();
        }
        if let Some(path) = &self.output {
            config.paths.output = path.clone();
        }
        if let Some(locale) = &self.locale {
            config.calendar.locale = Some(locale.clone());
            config.calendar.month_names = None;
            config.calendar.weekday_names = None;
        }
    }
}

#[derive(clap::Args)]
struct SchemaArgs {
    /// Write the DDL to this file instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,
}
