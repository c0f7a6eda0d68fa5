use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use reportflow::config::Config;
use reportflow::flow::StepRegistry;
use reportflow::reports::{ReportCategory, ReportFilter, ReportStatus, ReportStore};
use reportflow::{logging, rest};

#[derive(Parser)]
#[command(name = "reportflow")]
#[command(about = "Guided multi-step citizen issue reporting service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server (default)
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the steps of the report flow
    Steps,

    /// Print the sample reports the server seeds on startup
    Reports {
        /// Only show reports in this category
        #[arg(long)]
        category: Option<String>,

        /// Only show reports with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Write the OpenAPI document
    Openapi {
        /// Emit YAML instead of JSON
        #[arg(short, long)]
        yaml: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let logging_handle = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        None => cmd_serve(config, None).await?,
        Some(Commands::Serve { port }) => cmd_serve(config, port).await?,
        Some(Commands::Steps) => cmd_steps(),
        Some(Commands::Reports { category, status }) => {
            cmd_reports(category, status).await?;
        }
        Some(Commands::Openapi { yaml, output }) => cmd_openapi(yaml, output)?,
        Some(Commands::Config) => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    if let Some(log_path) = logging_handle.log_file_path {
        if log_path.exists() {
            eprintln!("Session log: {}", log_path.display());
        }
    }

    Ok(())
}

async fn cmd_serve(config: Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let host = config.server.host.clone();

    println!("Starting Reportflow API server...");
    println!("  Address: http://{}:{}", host, port);
    println!("  Endpoints:");
    println!("    GET  /api/v1/steps                       Report flow steps");
    println!("    POST /api/v1/sessions                    Create session");
    println!("    POST /api/v1/sessions/:id/flow/open      Open report flow");
    println!("    POST /api/v1/sessions/:id/flow/submit    Submit current step");
    println!("    POST /api/v1/sessions/:id/flow/back      Previous step");
    println!("    POST /api/v1/sessions/:id/flow/close     Close flow");
    println!("    GET  /api/v1/reports                     List reports");
    println!("    GET  /swagger-ui                         API explorer");
    println!();

    let state = rest::ApiState::new(config);
    rest::serve(state, &host, port).await
}

fn cmd_steps() {
    let registry = StepRegistry::report();
    for step in registry.list() {
        println!("{}. {}", step.order, step.title);
        println!("   {}", step.description);
        println!("   hint: {}", step.hint);
    }
}

async fn cmd_reports(category: Option<String>, status: Option<String>) -> Result<()> {
    let filter = ReportFilter {
        category: category.as_deref().map(str::parse::<ReportCategory>).transpose()?,
        status: status.as_deref().map(str::parse::<ReportStatus>).transpose()?,
    };

    let store = ReportStore::with_sample_data();
    let reports = store.list(&filter).await;
    if reports.is_empty() {
        println!("No matching reports.");
        return Ok(());
    }

    println!("{:<12} {:<14} {:<12} TITLE", "ID", "CATEGORY", "STATUS");
    for report in reports {
        let id = report.id.to_string();
        println!(
            "{:<12} {:<14} {:<12} {}",
            &id[..8],
            report.category.label(),
            report.status.key(),
            report.title
        );
    }
    Ok(())
}

fn cmd_openapi(yaml: bool, output: Option<PathBuf>) -> Result<()> {
    let spec = if yaml {
        rest::ApiDoc::yaml()?
    } else {
        rest::ApiDoc::json()?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, spec)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("OpenAPI document written to {}", path.display());
        }
        None => println!("{}", spec),
    }
    Ok(())
}
