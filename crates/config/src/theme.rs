use serde::{Deserialize, Serialize};

/// Display theme preference. Stored lowercase on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    White,
    Night,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::White => ThemePreference::Night,
            ThemePreference::Night => ThemePreference::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::White => "white",
            ThemePreference::Night => "night",
        }
    }
}

impl std::str::FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "white" => Ok(ThemePreference::White),
            "night" => Ok(ThemePreference::Night),
            other => Err(format!("unknown theme '{}' (expected white or night)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_both_ways() {
        assert_eq!(ThemePreference::White.toggled(), ThemePreference::Night);
        assert_eq!(ThemePreference::Night.toggled(), ThemePreference::White);
    }

    #[test]
    fn wire_form_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&ThemePreference::Night).unwrap(),
            "\"night\""
        );
        let parsed: ThemePreference = serde_json::from_str("\"white\"").unwrap();
        assert_eq!(parsed, ThemePreference::White);
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("blue".parse::<ThemePreference>().is_err());
        assert_eq!(
            "NIGHT".parse::<ThemePreference>().unwrap(),
            ThemePreference::Night
        );
    }
}
