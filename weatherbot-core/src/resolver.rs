//! Finds city names in free-form chat text.
//!
//! Matching is case-insensitive and respects word boundaries. When several
//! names match, the leftmost one wins; at the same position the longest wins.
//! All-caps shorthands such as `LA` only match in capitals, so "la" in
//! Spanish or French text is not a city.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::model::ResolvedCity;

/// Canonical names the resolver knows out of the box.
pub const KNOWN_CITIES: &[&str] = &[
    "Amsterdam", "Athens", "Atlanta", "Auckland", "Austin", "Bangkok", "Barcelona", "Beijing",
    "Belgrade", "Berlin", "Bogota", "Boston", "Brisbane", "Brussels", "Bucharest", "Budapest",
    "Buenos Aires", "Cairo", "Calgary", "Cape Town", "Casablanca", "Chicago", "Copenhagen",
    "Dallas", "Delhi", "Denver", "Dubai", "Dublin", "Edinburgh", "Florence", "Frankfurt",
    "Geneva", "Hamburg", "Hanoi", "Havana", "Helsinki", "Ho Chi Minh City", "Hong Kong",
    "Honolulu", "Houston", "Istanbul", "Jakarta", "Jerusalem", "Johannesburg", "Kyiv",
    "Kuala Lumpur", "Lagos", "Las Vegas", "Lima", "Lisbon", "Ljubljana", "London",
    "Los Angeles", "Lyon", "Madrid", "Manchester", "Manila", "Marseille", "Melbourne",
    "Mexico City", "Miami", "Milan", "Montreal", "Moscow", "Mumbai", "Munich", "Nairobi",
    "Naples", "New Orleans", "New York", "Osaka", "Oslo", "Ottawa", "Paris",
    "Philadelphia", "Phoenix", "Porto", "Prague", "Reykjavik", "Riga", "Rio de Janeiro",
    "Rome", "San Diego", "San Francisco", "Santiago", "São Paulo", "Seattle", "Seoul",
    "Seville", "Shanghai", "Singapore", "Sofia", "Stockholm", "Sydney", "Taipei", "Tallinn",
    "Tel Aviv", "Tokyo", "Toronto", "Valencia", "Vancouver", "Venice", "Vienna", "Vilnius",
    "Warsaw", "Washington", "Wellington", "Zagreb", "Zurich",
];

/// Shorthands and common alternate spellings, mapped to a canonical name.
pub const CITY_ALIASES: &[(&str, &str)] = &[
    ("New York City", "New York"),
    ("NYC", "New York"),
    ("NY", "New York"),
    ("LA", "Los Angeles"),
    ("SF", "San Francisco"),
    ("DC", "Washington"),
    ("New Delhi", "Delhi"),
    ("Bombay", "Mumbai"),
    ("Peking", "Beijing"),
    ("Saigon", "Ho Chi Minh City"),
    ("Sao Paulo", "São Paulo"),
    ("Zürich", "Zurich"),
    ("Kiev", "Kyiv"),
    ("Rio", "Rio de Janeiro"),
    ("Wien", "Vienna"),
    ("München", "Munich"),
    ("Roma", "Rome"),
    ("Lisboa", "Lisbon"),
];

const CITY_PATTERN_SIZE_LIMIT: usize = 64 * (1 << 20);

#[derive(Debug, Clone)]
pub struct CityResolver {
    pattern: Regex,
    /// Lowercased spelling → canonical city name.
    canonical: HashMap<String, String>,
}

impl CityResolver {
    /// Resolver over [`KNOWN_CITIES`] and [`CITY_ALIASES`].
    pub fn new() -> Result<Self> {
        Self::with_extra_cities(std::iter::empty::<String>())
    }

    /// Resolver that also recognises `extra` names. Names shorter than two
    /// characters are ignored.
    pub fn with_extra_cities<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical = HashMap::new();
        let mut shorthands = HashSet::new();

        for city in KNOWN_CITIES {
            canonical.insert(city.to_lowercase(), city.to_string());
        }
        for (alias, city) in CITY_ALIASES {
            canonical.insert(alias.to_lowercase(), city.to_string());
            if is_shorthand(alias) {
                shorthands.insert(alias.to_lowercase());
            }
        }
        for city in extra {
            let city = city.as_ref().trim();
            if city.chars().count() < 2 {
                continue;
            }
            canonical.entry(city.to_lowercase()).or_insert_with(|| city.to_string());
        }

        // Longest first so the alternation prefers "New York City" over "New York".
        let mut spellings: Vec<&str> = canonical.keys().map(String::as_str).collect();
        spellings.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

        let alternation = spellings
            .iter()
            .map(|s| {
                if shorthands.contains(*s) {
                    format!("(?-i:{})", regex::escape(&s.to_uppercase()))
                } else {
                    regex::escape(s)
                }
            })
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
            .case_insensitive(true)
            .size_limit(CITY_PATTERN_SIZE_LIMIT)
            .build()
            .context("Failed to compile city name pattern")?;

        Ok(Self { pattern, canonical })
    }

    /// First city mentioned in `text`.
    pub fn resolve(&self, text: &str) -> ResolvedCity {
        match self.pattern.find_iter(text).find_map(|m| self.canonical_name(m.as_str())) {
            Some(city) => ResolvedCity::Found(city),
            None => ResolvedCity::NotFound,
        }
    }

    /// Every distinct city mentioned in `text`, in order of first mention.
    pub fn resolve_all(&self, text: &str) -> Vec<String> {
        let mut cities: Vec<String> = Vec::new();

        for city in self.pattern.find_iter(text).filter_map(|m| self.canonical_name(m.as_str())) {
            if !cities.contains(&city) {
                cities.push(city);
            }
        }

        cities
    }

    fn canonical_name(&self, matched: &str) -> Option<String> {
        self.canonical.get(&matched.to_lowercase()).cloned()
    }
}

fn is_shorthand(alias: &str) -> bool {
    alias.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_city_inside_sentence() {
        let resolver = CityResolver::new().unwrap();

        for city in KNOWN_CITIES {
            let text = format!("hey, how's the weather looking in {city} these days?");
            assert_eq!(
                resolver.resolve(&text),
                ResolvedCity::Found(city.to_string()),
                "failed for {city}"
            );
        }
    }

    #[test]
    fn no_city_is_not_found() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(resolver.resolve("is it going to rain later?"), ResolvedCity::NotFound);
        assert_eq!(resolver.resolve(""), ResolvedCity::NotFound);
    }

    #[test]
    fn matching_ignores_case() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(resolver.resolve("weather in TOKYO"), ResolvedCity::Found("Tokyo".into()));
        assert_eq!(resolver.resolve("weather in tokyo"), ResolvedCity::Found("Tokyo".into()));
    }

    #[test]
    fn respects_word_boundaries() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(resolver.resolve("my chromes are shiny"), ResolvedCity::NotFound);
        assert_eq!(resolver.resolve("Parisian cafes"), ResolvedCity::NotFound);
    }

    #[test]
    fn longest_name_wins_at_same_position() {
        let resolver = CityResolver::with_extra_cities(["San Jose", "San Jose del Cabo"]).unwrap();
        assert_eq!(
            resolver.resolve("flying to san jose del cabo next week"),
            ResolvedCity::Found("San Jose del Cabo".into())
        );
        assert_eq!(
            resolver.resolve("flying to San Jose next week"),
            ResolvedCity::Found("San Jose".into())
        );
    }

    #[test]
    fn short_words_in_other_languages_are_not_cities() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(
            resolver.resolve("¿Qué tiempo hace en la ciudad de Lima?"),
            ResolvedCity::Found("Lima".into())
        );
        assert_eq!(
            resolver.resolve("la météo à Paris demain"),
            ResolvedCity::Found("Paris".into())
        );
        assert_eq!(resolver.resolve("ny dc sf"), ResolvedCity::NotFound);
    }

    #[test]
    fn shorthands_match_in_capitals() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(resolver.resolve("sunny in LA?"), ResolvedCity::Found("Los Angeles".into()));
        assert_eq!(resolver.resolve("cold in DC"), ResolvedCity::Found("Washington".into()));
        assert_eq!(
            resolver.resolve("LAS VEGAS heat"),
            ResolvedCity::Found("Las Vegas".into())
        );
    }

    #[test]
    fn aliases_of_one_city_deduplicate() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(
            resolver.resolve_all("NYC or New York City? new york, NY!"),
            vec!["New York"]
        );
        assert_eq!(
            resolver.resolve("flying to new york city next week"),
            ResolvedCity::Found("New York".into())
        );
    }

    #[test]
    fn leftmost_city_wins() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(
            resolver.resolve("from Berlin to Madrid"),
            ResolvedCity::Found("Berlin".into())
        );
    }

    #[test]
    fn aliases_map_to_canonical_names() {
        let resolver = CityResolver::new().unwrap();
        assert_eq!(resolver.resolve("sunny in NYC?"), ResolvedCity::Found("New York".into()));
        assert_eq!(resolver.resolve("Sao Paulo rain"), ResolvedCity::Found("São Paulo".into()));
        assert_eq!(resolver.resolve("is zürich cold"), ResolvedCity::Found("Zurich".into()));
    }

    #[test]
    fn resolve_all_deduplicates_in_order() {
        let resolver = CityResolver::new().unwrap();
        let cities = resolver.resolve_all("Paris or Rome? Actually paris, then Lisbon.");
        assert_eq!(cities, vec!["Paris", "Rome", "Lisbon"]);
    }

    #[test]
    fn extra_cities_extend_the_table() {
        let resolver = CityResolver::with_extra_cities(["Timbuktu", "X", " "]).unwrap();
        assert_eq!(
            resolver.resolve("what about timbuktu"),
            ResolvedCity::Found("Timbuktu".into())
        );
        assert_eq!(resolver.resolve("x marks the spot"), ResolvedCity::NotFound);
    }
}
