//! One chat turn: find the city in the message, fetch its weather and turn
//! the result (or the failure) into a reply for the user.

use crate::{
    Config,
    error::{LookupError, TurnError},
    lookup::WeatherLookup,
    model::{ResolvedCity, TimeFrame},
    resolver::CityResolver,
};

#[derive(Debug)]
pub struct ChatPipeline {
    resolver: CityResolver,
    lookup: WeatherLookup,
}

impl ChatPipeline {
    pub fn new(resolver: CityResolver, lookup: WeatherLookup) -> Self {
        Self { resolver, lookup }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let resolver = CityResolver::with_extra_cities(&config.extra_cities)?;
        let lookup = WeatherLookup::new(config)?;
        Ok(Self::new(resolver, lookup))
    }

    /// Answer for the first city in `text`.
    pub async fn handle(&self, text: &str) -> Result<String, TurnError> {
        let city = match self.resolver.resolve(text) {
            ResolvedCity::Found(city) => city,
            ResolvedCity::NotFound => return Err(TurnError::NotFoundInText),
        };

        self.answer(&city, TimeFrame::detect(text)).await
    }

    /// Reply to a chat message. Every city mentioned gets its own line;
    /// failures become user-facing messages instead of errors.
    pub async fn respond(&self, text: &str) -> String {
        let cities = self.resolver.resolve_all(text);
        if cities.is_empty() {
            tracing::debug!("no city found in message");
            return TurnError::NotFoundInText.to_string();
        }

        let frame = TimeFrame::detect(text);
        tracing::debug!(?cities, ?frame, "answering chat turn");

        let mut lines = Vec::with_capacity(cities.len());
        for city in &cities {
            let line = match self.answer(city, frame).await {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::warn!(city = %city, error = ?err, "weather turn failed");
                    err.to_string()
                }
            };
            lines.push(line);
        }

        lines.join("\n")
    }

    async fn answer(&self, city: &str, frame: TimeFrame) -> Result<String, TurnError> {
        match frame {
            TimeFrame::Now => Ok(self.lookup.lookup(city).await?.summary()),
            TimeFrame::Tomorrow => {
                let forecast = self.lookup.forecast(city).await?;
                let day = forecast.tomorrow().ok_or_else(|| TurnError::NoData {
                    city: city.to_string(),
                    source: LookupError::parse(city, "forecast has no entry for tomorrow"),
                })?;
                Ok(format!("Tomorrow in {}: {}", forecast.city, day.summary(forecast.units)))
            }
            TimeFrame::Week => Ok(self.lookup.forecast(city).await?.summary()),
        }
    }
}
