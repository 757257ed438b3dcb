//! Command-line flags

use std::path::PathBuf;

use clap::Parser;
use figment::{providers::Serialized, Figment};

use crate::{config::Config, error::Result};

/// snippetbox - share text snippets that expire
#[derive(Debug, Default, Parser)]
#[command(name = "snippetbox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// HTTP network address, e.g. ":4000" or "127.0.0.1:8080"
    #[arg(long)]
    pub addr: Option<String>,

    /// Storage URL (postgres://..., sqlite:... or memory:)
    #[arg(long)]
    pub dsn: Option<String>,

    /// Configuration file (defaults to ./snippetbox.toml when present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "snippetbox=debug,tower_http=info"
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Configuration sources with these flags merged on top
    pub fn figment(&self) -> Figment {
        let mut figment = Config::figment(self.config.as_deref());

        if let Some(addr) = &self.addr {
            figment = figment.merge(Serialized::default("server.addr", addr));
        }
        if let Some(dsn) = &self.dsn {
            figment = figment.merge(Serialized::default("database.url", dsn));
        }
        if let Some(level) = &self.log_level {
            figment = figment.merge(Serialized::default("log.level", level));
        }

        figment
    }

    /// Resolve the effective configuration
    pub fn load_config(&self) -> Result<Config> {
        Config::extract(self.figment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG_FILE;
    use figment::Jail;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("snippetbox").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn test_no_flags_keeps_defaults() {
        Jail::expect_with(|_jail| {
            let config = parse(&[]).load_config().expect("config loads");
            assert_eq!(config.server.addr, ":4000");
            assert_eq!(config.log.level, "info");
            Ok(())
        });
    }

    #[test]
    fn test_flags_override_env_and_file() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[server]\naddr = \":5000\"\n")?;
            jail.set_env("SNIPPETBOX_DATABASE__URL", "sqlite://env.db");

            let cli = parse(&["--addr", ":6000", "--dsn", "memory:", "--log-level", "debug"]);
            let config = cli.load_config().expect("config loads");
            assert_eq!(config.server.addr, ":6000");
            assert_eq!(config.database.url, "memory:");
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_config_flag_selects_file() {
        Jail::expect_with(|jail| {
            jail.create_file("other.toml", "[database]\nmax_connections = 2\n")?;

            let config = parse(&["--config", "other.toml"])
                .load_config()
                .expect("config loads");
            assert_eq!(config.database.max_connections, 2);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["snippetbox", "--port", "4000"]).is_err());
    }
}
