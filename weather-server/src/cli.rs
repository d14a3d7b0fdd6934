use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use std::path::{Path, PathBuf};
use weather_core::{Config, WeatherService};
use weather_server::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather lookup proxy for WeatherAPI.com")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (the default when no subcommand is given).
    Serve(ServeArgs),

    /// Store a WeatherAPI.com API key in the config file.
    Configure,

    /// Look up current weather for a city and print it as JSON.
    Lookup {
        /// City name, e.g. "london".
        city: String,
    },
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind (overrides HOST).
    #[arg(long)]
    host: Option<String>,

    /// Directory with the static client page (overrides WEATHER_STATIC_DIR).
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(dir) = self.static_dir {
            config.server.static_dir = dir;
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
            Command::Serve(args) => {
                let mut config = Config::from_file_and_env(&path)?;
                args.apply(&mut config);
                server::serve(config).await
            }
            Command::Configure => configure(&path),
            Command::Lookup { city } => lookup(&path, &city).await,
        }
    }
}

fn configure(path: &Path) -> anyhow::Result<()> {
    // File values only: env overrides must not end up persisted.
    let mut config = Config::load_from(path)?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save_to(path)?;

    println!("Saved API key to {}", path.display());
    Ok(())
}

async fn lookup(path: &Path, city: &str) -> anyhow::Result<()> {
    let config = Config::from_file_and_env(path)?;
    let service = WeatherService::from_config(&config)?;

    match service.current_weather(city).await {
        Ok(weather) => {
            println!("{}", serde_json::to_string_pretty(&weather)?);
            Ok(())
        }
        Err(err) => {
            let body = err.body(config.server.expose_error_details);
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            Err(anyhow!("Lookup failed: {} (HTTP {})", err.kind(), err.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["weather-server"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_flags_override_config() {
        let cli = Cli::try_parse_from([
            "weather-server",
            "serve",
            "--port",
            "8081",
            "--static-dir",
            "/srv/weather",
        ])
        .unwrap();

        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.static_dir, PathBuf::from("/srv/weather"));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn lookup_takes_a_city_and_global_config() {
        let cli =
            Cli::try_parse_from(["weather-server", "lookup", "paris", "--config", "/tmp/w.toml"])
                .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
        assert!(matches!(cli.command, Some(Command::Lookup { ref city }) if city == "paris"));
    }
}
