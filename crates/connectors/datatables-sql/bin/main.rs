use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use datatables_configuration::environment::ProcessEnvironment;
use datatables_configuration::version1::CONFIGURATION_FILENAME;
use datatables_configuration::{write_parsed_configuration, ParsedConfiguration};
use datatables_sql::request::RawRequest;
use datatables_sql::response::LegacyResponse;
use datatables_sql::{routes, state};

#[derive(Debug, Parser)]
#[command(name = "datatables-sql", version, about = "Serve DataTables requests from SQL templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve requests over HTTP.
    Serve {
        #[arg(long, env = "DATATABLES_CONFIGURATION")]
        configuration: PathBuf,
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Answer a single request, given as a JSON object of parameters.
    Query {
        #[arg(long, env = "DATATABLES_CONFIGURATION")]
        configuration: PathBuf,
        #[arg(long)]
        request: String,
    },
    /// Print the statements a request would run.
    Explain {
        #[arg(long, env = "DATATABLES_CONFIGURATION")]
        configuration: PathBuf,
        #[arg(long)]
        request: String,
    },
    /// Write a starter configuration and its JSON schema.
    Initialize {
        #[arg(long, env = "DATATABLES_CONFIGURATION")]
        configuration: PathBuf,
    },
}

#[tokio::main]
pub async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse().command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve {
            configuration,
            port,
        } => serve(&configuration, port).await,
        Command::Query {
            configuration,
            request,
        } => {
            let state = load_state(&configuration).await?;
            let query = state.query_builder.build(&parse_request(&request)?)?;
            let results = state.data_source.get_results(&query).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&LegacyResponse::from(results))?
            );
            Ok(())
        }
        Command::Explain {
            configuration,
            request,
        } => {
            let state = load_state(&configuration).await?;
            let query = state.query_builder.build(&parse_request(&request)?)?;
            let explain = state.data_source.explain(&query)?;
            println!("{}", serde_json::to_string_pretty(&explain)?);
            Ok(())
        }
        Command::Initialize { configuration } => {
            if configuration.join(CONFIGURATION_FILENAME).exists() {
                anyhow::bail!(
                    "{} already holds a configuration",
                    configuration.display()
                );
            }
            write_parsed_configuration(ParsedConfiguration::initial(), &configuration).await?;
            tracing::info!(directory = %configuration.display(), "Wrote a starter configuration");
            Ok(())
        }
    }
}

async fn serve(configuration: &Path, port: u16) -> anyhow::Result<()> {
    let state = load_state(configuration).await?;
    let address = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%address, "Starting server");
    axum::Server::bind(&address)
        .serve(routes::create_router(state).into_make_service())
        .with_graceful_shutdown(async {
            // stop on Ctrl-C
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

async fn load_state(configuration_dir: &Path) -> anyhow::Result<state::ServerState> {
    let configuration = state::load_configuration(configuration_dir, ProcessEnvironment).await?;
    let mut metrics_registry = prometheus::Registry::new();
    Ok(state::create_state(&configuration, &mut metrics_registry).await?)
}

/// Parameters may be given as strings or as plain JSON values.
fn parse_request(request: &str) -> anyhow::Result<RawRequest> {
    let parameters: serde_json::Map<String, serde_json::Value> = serde_json::from_str(request)?;
    Ok(parameters
        .into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(value) => (name, value),
            value => (name, value.to_string()),
        })
        .collect())
}
