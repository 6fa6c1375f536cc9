use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the provider's `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// Outcome of looking for a city in a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCity {
    Found(String),
    NotFound,
}

/// Which part of the forecast a message asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFrame {
    #[default]
    Now,
    Tomorrow,
    Week,
}

impl TimeFrame {
    const WEEK_KEYWORDS: &'static [&'static str] =
        &["forecast", "week", "next days", "coming days", "weekend", "next few days"];

    /// Keyword detection; anything without a hint means current conditions.
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();

        if lower.contains("tomorrow") {
            TimeFrame::Tomorrow
        } else if Self::WEEK_KEYWORDS.iter().any(|k| lower.contains(k)) {
            TimeFrame::Week
        } else {
            TimeFrame::Now
        }
    }
}

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: f64,
    pub condition: String,
    pub humidity_pct: Option<u8>,
    pub wind_speed: Option<f64>,
    pub units: Units,
}

impl WeatherReport {
    /// Plain-language sentence, e.g. "It is 18°C and cloudy in Paris."
    pub fn summary(&self) -> String {
        let mut out = format!(
            "It is {}{} and {} in {}.",
            format_temperature(self.temperature),
            self.units.temperature_symbol(),
            self.condition,
            self.city
        );

        if let Some(humidity) = self.humidity_pct {
            out.push_str(&format!(" Humidity is {humidity}%."));
        }
        if let Some(wind) = self.wind_speed {
            out.push_str(&format!(" Wind at {wind:.1} {}.", self.units.speed_symbol()));
        }

        out
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Aggregated forecast for one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub condition: String,
    pub humidity_pct: Option<u8>,
    pub precipitation_chance_pct: u8,
}

impl DailyForecast {
    pub fn summary(&self, units: Units) -> String {
        let symbol = units.temperature_symbol();
        let mut out = format!(
            "{}: {}, {}{symbol} to {}{symbol}, {}% chance of precipitation",
            self.date.format("%A %Y-%m-%d"),
            self.condition,
            format_temperature(self.min_temperature),
            format_temperature(self.max_temperature),
            self.precipitation_chance_pct,
        );

        if let Some(humidity) = self.humidity_pct {
            out.push_str(&format!(", humidity {humidity}%"));
        }

        out
    }
}

/// Multi-day forecast for one city, days in ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub city: String,
    /// Local "today" at the city when the forecast was fetched.
    pub today: NaiveDate,
    pub days: Vec<DailyForecast>,
    pub units: Units,
}

impl ForecastReport {
    /// The day after the city's local today, or the second forecast day.
    pub fn tomorrow(&self) -> Option<&DailyForecast> {
        self.today
            .succ_opt()
            .and_then(|next| self.days.iter().find(|d| d.date == next))
            .or_else(|| self.days.get(1))
    }

    pub fn summary(&self) -> String {
        let mut out = format!("Forecast for {}:", self.city);
        for day in &self.days {
            out.push_str("\n  ");
            out.push_str(&day.summary(self.units));
        }
        out
    }
}

fn format_temperature(value: f64) -> String {
    format!("{}", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> WeatherReport {
        WeatherReport {
            city: "Paris".into(),
            temperature: 18.2,
            condition: "cloudy".into(),
            humidity_pct: None,
            wind_speed: None,
            units: Units::Metric,
        }
    }

    #[test]
    fn summary_reads_as_sentence() {
        assert_eq!(report().summary(), "It is 18°C and cloudy in Paris.");
    }

    #[test]
    fn summary_includes_optional_fields() {
        let mut r = report();
        r.humidity_pct = Some(70);
        r.wind_speed = Some(3.46);
        r.units = Units::Imperial;

        let s = r.summary();
        assert!(s.starts_with("It is 18°F and cloudy in Paris."));
        assert!(s.contains("Humidity is 70%."));
        assert!(s.contains("Wind at 3.5 mph."));
    }

    #[test]
    fn negative_temperatures_round() {
        let mut r = report();
        r.temperature = -3.6;
        assert!(r.summary().contains("-4°C"));
    }

    #[test]
    fn units_parse_case_insensitively() {
        assert_eq!(Units::try_from("Imperial").unwrap(), Units::Imperial);
        assert!(Units::try_from("kelvin").unwrap_err().to_string().contains("Unknown unit"));
    }

    #[test]
    fn time_frame_detection() {
        assert_eq!(TimeFrame::detect("weather in Oslo?"), TimeFrame::Now);
        assert_eq!(TimeFrame::detect("Will it rain TOMORROW in Oslo"), TimeFrame::Tomorrow);
        assert_eq!(TimeFrame::detect("forecast for Oslo"), TimeFrame::Week);
        assert_eq!(TimeFrame::detect("Oslo this weekend?"), TimeFrame::Week);
    }

    #[test]
    fn daily_summary_mentions_humidity_when_known() {
        let mut day = DailyForecast {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            min_temperature: 8.4,
            max_temperature: 14.0,
            condition: "light rain".into(),
            humidity_pct: Some(70),
            precipitation_chance_pct: 60,
        };

        assert_eq!(
            day.summary(Units::Metric),
            "Thursday 2024-05-02: light rain, 8°C to 14°C, 60% chance of precipitation, \
             humidity 70%"
        );

        day.humidity_pct = None;
        assert!(!day.summary(Units::Metric).contains("humidity"));
    }

    #[test]
    fn tomorrow_prefers_next_calendar_day() {
        let day = |d: u32| DailyForecast {
            date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            min_temperature: 10.0,
            max_temperature: 20.0,
            condition: "clear sky".into(),
            humidity_pct: None,
            precipitation_chance_pct: 0,
        };

        let forecast = ForecastReport {
            city: "Oslo".into(),
            today: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            days: vec![day(1), day(2), day(3)],
            units: Units::Metric,
        };

        assert_eq!(forecast.tomorrow().unwrap().date.to_string(), "2024-05-03");
    }
}
