//! Layered configuration: defaults, optional YAML file, `TEMPBOX_`
//! environment variables, then CLI flags.

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Domain for generated inbox addresses
    #[arg(long, env = "MAIL_DOMAIN")]
    pub domain: Option<String>,

    /// Enable the expired-session reaper
    #[arg(long, env = "REAPER_ENABLED")]
    pub reaper_enabled: Option<bool>,

    /// Seconds between reaper sweeps
    #[arg(long, env = "REAPER_INTERVAL_SECS")]
    pub reaper_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mailbox: MailboxConfig,
    pub reaper: ReaperConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailboxConfig {
    /// Domain part of generated addresses.
    pub domain: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReaperConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("mailbox.domain", "tempbox.dev")?
            .set_default("reaper.enabled", true)?
            .set_default("reaper.interval_secs", 30)?;

        // Explicit file wins over the cwd fallback.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }

        // Environment variables, e.g. TEMPBOX_SERVER__PORT=8000.
        builder = builder.add_source(
            Environment::with_prefix("TEMPBOX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their clap-declared env vars) take priority.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(domain) = cli.domain {
            builder = builder.set_override("mailbox.domain", domain)?;
        }
        if let Some(enabled) = cli.reaper_enabled {
            builder = builder.set_override("reaper.enabled", enabled)?;
        }
        if let Some(interval) = cli.reaper_interval_secs {
            builder = builder.set_override("reaper.interval_secs", interval)?;
        }

        builder.build()?.try_deserialize()
    }
}
