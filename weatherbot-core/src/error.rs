use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single provider request.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to reach the weather provider: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Weather provider has no data for '{city}' (status {status})")]
    CityNotFound { city: String, status: StatusCode },

    #[error("Unexpected weather provider response for '{city}': {message}")]
    Parse { city: String, message: String },
}

impl LookupError {
    pub(crate) fn parse(city: &str, message: impl Into<String>) -> Self {
        LookupError::Parse {
            city: city.to_string(),
            message: message.into(),
        }
    }
}

/// Why a chat turn produced no weather answer. Never fatal to the session.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(
        "I couldn't find a city in your message. \
         Could you rephrase it and mention the city you're interested in?"
    )]
    NotFoundInText,

    #[error("Sorry, I couldn't fetch the weather right now. Please try again in a moment.")]
    Network(#[source] LookupError),

    #[error("I have no weather data for {city}.")]
    NoData {
        city: String,
        #[source]
        source: LookupError,
    },
}

impl From<LookupError> for TurnError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Network(_) => TurnError::Network(err),
            LookupError::CityNotFound { ref city, .. } | LookupError::Parse { ref city, .. } => {
                let city = city.clone();
                TurnError::NoData { city, source: err }
            }
        }
    }
}
