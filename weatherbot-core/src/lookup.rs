use crate::{
    Config, ForecastReport, WeatherReport,
    error::LookupError,
    provider::{WeatherProvider, provider_from_config},
};

/// Stateless city → weather query. One provider request per call, no retries.
#[derive(Debug)]
pub struct WeatherLookup {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherLookup {
    /// Build a lookup against the configured provider.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::with_provider(provider_from_config(config)?))
    }

    pub fn with_provider(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Current conditions. `city` is passed to the provider as given.
    pub async fn lookup(&self, city: &str) -> Result<WeatherReport, LookupError> {
        self.provider.current(city).await
    }

    pub async fn forecast(&self, city: &str) -> Result<ForecastReport, LookupError> {
        self.provider.forecast(city).await
    }
}
