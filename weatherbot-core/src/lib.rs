//! Core library for the `weatherbot` chat.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - City name extraction from chat messages
//! - Abstraction over weather providers (OpenWeatherMap)
//! - The per-turn pipeline that turns a message into a reply
//!
//! It is used by `weatherbot-cli`, but can also back other chat front-ends.

pub mod chat;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod resolver;

pub use chat::ChatPipeline;
pub use config::Config;
pub use error::{LookupError, TurnError};
pub use lookup::WeatherLookup;
pub use model::{DailyForecast, ForecastReport, ResolvedCity, TimeFrame, Units, WeatherReport};
pub use provider::WeatherProvider;
pub use resolver::CityResolver;
