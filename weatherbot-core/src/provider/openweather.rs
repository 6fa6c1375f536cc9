use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::collections::BTreeMap;

use crate::{
    config::Config,
    error::LookupError,
    model::{DailyForecast, ForecastReport, Units, WeatherReport},
};

use super::WeatherProvider;

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.require_api_key()?.to_owned();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units,
            http,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, city: &str) -> Result<T, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, city, units = %self.units, "requesting weather data");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(LookupError::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(LookupError::Network)?;
        tracing::debug!(%status, bytes = body.len(), "weather provider responded");

        if !status.is_success() {
            tracing::warn!(
                city,
                %status,
                body = %truncate_body(&body),
                "weather provider rejected request"
            );
            return Err(LookupError::CityNotFound {
                city: city.to_string(),
                status,
            });
        }

        serde_json::from_str(&body).map_err(|err| LookupError::parse(city, err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    /// Shift in seconds from UTC.
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    /// Probability of precipitation, 0..=1.
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: &[OwWeather], city: &str) -> Result<String, LookupError> {
    weather
        .first()
        .map(|w| w.description.clone())
        .ok_or_else(|| LookupError::parse(city, "response contained no weather conditions"))
}

fn current_report(
    parsed: OwCurrentResponse,
    requested: &str,
    units: Units,
) -> Result<WeatherReport, LookupError> {
    let condition = first_condition(&parsed.weather, requested)?;

    Ok(WeatherReport {
        city: city_name(parsed.name, requested),
        temperature: parsed.main.temp,
        condition,
        humidity_pct: parsed.main.humidity,
        wind_speed: parsed.wind.map(|w| w.speed),
        units,
    })
}

#[derive(Debug, Default)]
struct DayAccumulator {
    temps: Vec<f64>,
    conditions: Vec<String>,
    humidity: Vec<u8>,
    pop_max: f64,
}

fn forecast_report(
    parsed: OwForecastResponse,
    requested: &str,
    units: Units,
    now: DateTime<Utc>,
) -> Result<ForecastReport, LookupError> {
    if parsed.list.is_empty() {
        return Err(LookupError::parse(requested, "forecast response contained no data"));
    }

    let offset = FixedOffset::east_opt(parsed.city.timezone).ok_or_else(|| {
        LookupError::parse(requested, format!("invalid timezone offset {}", parsed.city.timezone))
    })?;

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for entry in &parsed.list {
        let at = DateTime::<Utc>::from_timestamp(entry.dt, 0).ok_or_else(|| {
            LookupError::parse(requested, format!("invalid timestamp {}", entry.dt))
        })?;
        let date = at.with_timezone(&offset).date_naive();

        let day = days.entry(date).or_default();
        day.temps.push(entry.main.temp);
        day.conditions.push(first_condition(&entry.weather, requested)?);
        day.humidity.extend(entry.main.humidity);
        day.pop_max = day.pop_max.max(entry.pop);
    }

    let days = days
        .into_iter()
        .map(|(date, acc)| DailyForecast {
            date,
            min_temperature: acc.temps.iter().copied().fold(f64::INFINITY, f64::min),
            max_temperature: acc.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            condition: most_common(&acc.conditions).unwrap_or_default(),
            humidity_pct: average(&acc.humidity),
            precipitation_chance_pct: (acc.pop_max.clamp(0.0, 1.0) * 100.0).round() as u8,
        })
        .collect();

    Ok(ForecastReport {
        city: city_name(parsed.city.name, requested),
        today: now.with_timezone(&offset).date_naive(),
        days,
        units,
    })
}

/// The provider's name for the city, or the requested one when it has none.
fn city_name(reported: String, requested: &str) -> String {
    if reported.trim().is_empty() {
        requested.to_string()
    } else {
        reported
    }
}

/// Most frequent entry; ties go to whichever appeared first.
fn most_common(items: &[String]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((item.as_str(), 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (item, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((item, n)),
        })
        .map(|(item, _)| item.to_string())
}

fn average(values: &[u8]) -> Option<u8> {
    if values.is_empty() {
        return None;
    }
    let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
    Some((f64::from(sum) / values.len() as f64).round() as u8)
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<WeatherReport, LookupError> {
        let parsed: OwCurrentResponse = self.fetch(CURRENT_PATH, city).await?;
        current_report(parsed, city, self.units)
    }

    async fn forecast(&self, city: &str) -> Result<ForecastReport, LookupError> {
        let parsed: OwForecastResponse = self.fetch(FORECAST_PATH, city).await?;
        forecast_report(parsed, city, self.units, Utc::now())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
