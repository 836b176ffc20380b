#![forbid(unsafe_code)]

mod version;

use anyhow::{Result, bail};
use clap::Parser;
use pgshape_core::configuration::{Configuration, ConfigurationBuilder};
use pgshape_core::{Client, FormatOptions, Key, Transform};
use pgshape_driver_postgresql::Pool;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const PROGRAM_NAME: &str = "pgshape";

#[derive(Debug, Default, Parser)]
#[command(name = PROGRAM_NAME, about = "Run a PostgreSQL statement and print the shaped result as JSON")]
pub(crate) struct Args {
    /// TOML configuration file
    #[arg(long, env = "PGSHAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(long)]
    port: Option<u16>,

    /// Database name
    #[arg(short, long)]
    database: Option<String>,

    /// User name
    #[arg(short = 'U', long)]
    user: Option<String>,

    /// Password
    #[arg(long, env = "PGSHAPE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Output format: bool, count, value, values, valuesById, array, arrayById, row,
    /// rowStrict or default
    #[arg(short, long, default_value = "default")]
    format: String,

    /// Column (position or name) selected by the value formats, or row position for row formats
    #[arg(long, default_value = "0")]
    value_key: String,

    /// Column (position or name) used as the id by valuesById
    #[arg(long, default_value = "0")]
    value_id: String,

    /// Transform applied to every output value: bool, json, lower, number, string, trim or upper
    #[arg(short, long)]
    transform: Option<String>,

    /// Print the pool settings with the password masked instead of running a statement
    #[arg(long)]
    info: bool,

    /// Display the version of this tool
    #[arg(long)]
    version: bool,

    /// The statement to execute
    statement: Option<String>,
}

impl Args {
    fn configuration(&self) -> Result<Configuration> {
        let version = env!("CARGO_PKG_VERSION");
        let mut builder = ConfigurationBuilder::new(PROGRAM_NAME, version);
        builder = match &self.config {
            Some(config_file) => builder.with_config_file(config_file)?,
            None => builder.with_config()?,
        };
        if let Some(host) = &self.host {
            builder = builder.with_host(host);
        }
        if let Some(port) = self.port {
            builder = builder.with_port(port);
        }
        if let Some(database) = &self.database {
            builder = builder.with_database(database);
        }
        if let Some(user) = &self.user {
            builder = builder.with_user(user);
        }
        if let Some(password) = &self.password {
            builder = builder.with_password(password);
        }
        Ok(builder.build())
    }

    fn format_options(&self) -> FormatOptions {
        let mut options = FormatOptions::new()
            .with_value_key(Key::parse(&self.value_key))
            .with_value_id(Key::parse(&self.value_id));
        if let Some(transform) = &self.transform {
            options = options.with_transform(Transform::named(transform));
        }
        options
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    let success = execute(args, &mut io::stdout()).await?;
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run the command; returns whether the statement succeeded.
pub(crate) async fn execute(args: Args, output: &mut dyn io::Write) -> Result<bool> {
    let configuration = args.configuration()?;
    init_tracing(&configuration);
    let version = version::full_version(&configuration);
    info!("{version} initialized");

    if args.version {
        version::execute(&configuration, output)?;
        return Ok(true);
    }

    let pool = Arc::new(Pool::new(configuration.pool.clone()));
    let mut client = Client::new(pool.clone());

    if args.info {
        serde_json::to_writer_pretty(&mut *output, &client.pool_info())?;
        writeln!(output)?;
        return Ok(true);
    }

    let Some(statement) = args.statement.as_deref() else {
        bail!("a statement is required");
    };
    let response = client
        .execute_once(statement, &args.format, &args.format_options())
        .await;
    pool.close().await;

    serde_json::to_writer_pretty(&mut *output, &response)?;
    writeln!(output)?;
    info!("{version} completed");
    Ok(response.status)
}

/// Log to stderr at the configured level unless `RUST_LOG` is set.
fn init_tracing(configuration: &Configuration) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(configuration.log_level.into()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
