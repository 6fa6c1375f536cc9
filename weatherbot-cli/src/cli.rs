use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use weatherbot_core::{ChatPipeline, Config, Units, WeatherLookup};

use crate::chat;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Chat about the weather in any city")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and preferences.
    Configure,

    /// Ask a single question, e.g. `weatherbot ask is it raining in Oslo`.
    Ask {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Start an interactive chat.
    Chat,

    /// Show weather for a city without going through the chat.
    Show {
        city: String,

        /// Daily forecast for the next days instead of current conditions.
        #[arg(long)]
        forecast: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Ask { message } => {
                let pipeline = ChatPipeline::from_config(&load_config()?)?;
                println!("{}", pipeline.respond(&message.join(" ")).await);
            }
            Command::Chat => {
                let pipeline = ChatPipeline::from_config(&load_config()?)?;
                chat::run(&pipeline).await?;
            }
            Command::Show { city, forecast } => {
                let lookup = WeatherLookup::new(&load_config()?)?;
                let result = if forecast {
                    lookup.forecast(&city).await.map(|f| f.summary())
                } else {
                    lookup.lookup(&city).await.map(|r| r.summary())
                };
                let text = result.with_context(|| format!("Failed to get weather for {city}"))?;
                println!("{text}");
            }
        }

        Ok(())
    }
}

fn load_config() -> anyhow::Result<Config> {
    let path = Config::config_file_path()?;
    let cfg = Config::load()?;
    tracing::debug!(
        path = %path.display(),
        base_url = %cfg.base_url,
        units = %cfg.units,
        extra_cities = cfg.extra_cities.len(),
        "loaded configuration"
    );
    Ok(cfg)
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load_file()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        cfg.api_key = Some(api_key.trim().to_string());
    }

    let units = Units::all().to_vec();
    let current = units.iter().position(|u| *u == cfg.units).unwrap_or_default();
    cfg.units = Select::new("Units:", units).with_starting_cursor(current).prompt()?;

    cfg.base_url = Text::new("API base URL:").with_default(&cfg.base_url).prompt()?;

    cfg.require_api_key()?;
    cfg.save()?;
    tracing::debug!(units = %cfg.units, base_url = %cfg.base_url, "saved configuration");

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
