use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical weather categories, decoupled from any provider vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalCondition {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
    Dusty,
    Hazy,
}

impl CanonicalCondition {
    pub const fn all() -> &'static [CanonicalCondition] {
        &[
            CanonicalCondition::Sunny,
            CanonicalCondition::PartlyCloudy,
            CanonicalCondition::Cloudy,
            CanonicalCondition::Rainy,
            CanonicalCondition::Stormy,
            CanonicalCondition::Snowy,
            CanonicalCondition::Foggy,
            CanonicalCondition::Dusty,
            CanonicalCondition::Hazy,
        ]
    }

    /// Classify a provider `main` category and free-text description.
    ///
    /// Case-insensitive and total: anything unrecognized is `PartlyCloudy`.
    pub fn classify(main: &str, description: &str) -> Self {
        let main = main.trim().to_lowercase();
        let desc = description.to_lowercase();

        match main.as_str() {
            "clear" => Self::Sunny,
            "clouds" => {
                if desc.contains("few") || desc.contains("scattered") {
                    Self::PartlyCloudy
                } else {
                    Self::Cloudy
                }
            }
            "rain" => {
                // "light" is checked first so "light extreme rain" stays rainy
                if desc.contains("light") {
                    Self::Rainy
                } else if desc.contains("heavy") || desc.contains("extreme") {
                    Self::Stormy
                } else {
                    Self::Rainy
                }
            }
            "drizzle" => Self::Rainy,
            "thunderstorm" => Self::Stormy,
            "snow" => Self::Snowy,
            "mist" | "fog" | "haze" => Self::Foggy,
            "dust" | "sand" => Self::Dusty,
            "smoke" => Self::Hazy,
            _ => Self::PartlyCloudy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
            Self::Snowy => "snowy",
            Self::Foggy => "foggy",
            Self::Dusty => "dusty",
            Self::Hazy => "hazy",
        }
    }
}

impl fmt::Display for CanonicalCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
