//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.runtally.toml` files: where records live, who is on the roster, and
//! the distance goals for the year.

use crate::models::Goals;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".runtally.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Known participants.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Yearly distance goals.
    #[serde(default = "default_goals")]
    pub goals: Goals,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            roster: RosterConfig::default(),
            goals: default_goals(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the JSON record file.
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Number of activities shown in "recent" listings.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_data_file() -> String {
    "running_data.json".to_string()
}

fn default_recent_limit() -> usize {
    10
}

/// Roster settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Names that activities can be registered for. Empty allows any name.
    #[serde(default = "default_people")]
    pub people: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            people: default_people(),
        }
    }
}

fn default_people() -> Vec<String> {
    vec![
        "Carl Frederik",
        "Kaia",
        "Miriam",
        "Torbjørn",
        "Henrik",
        "Eirik",
        "Charlotte",
        "Jens",
        "Helle",
        "Anders",
        "Joakim",
        "Silje",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_goals() -> Goals {
    Goals {
        collective_km: Some(7350.0),
        individual_km: BTreeMap::new(),
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_file) = args.data_file {
            self.general.data_file = data_file.to_string_lossy().into_owned();
        }
    }

    /// Check goals and roster for values that would make statistics
    /// meaningless.
    pub fn validate(&self) -> Result<()> {
        self.goals.validate().map_err(anyhow::Error::msg)?;

        if self.roster.people.iter().any(|p| p.trim().is_empty()) {
            anyhow::bail!("Roster contains a blank name");
        }
        if self.general.data_file.trim().is_empty() {
            anyhow::bail!("general.data_file must not be empty");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.data_file, "running_data.json");
        assert_eq!(config.general.recent_limit, 10);
        assert_eq!(config.roster.people.len(), 12);
        assert!(config.roster.people.contains(&"Kaia".to_string()));
        assert_eq!(config.goals.collective_km, Some(7350.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
data_file = "club.json"

[roster]
people = ["Kaia", "Eirik", "Carl Frederik"]

[goals]
collective_km = 2000.0

[goals.individual_km]
Kaia = 600.0
"Carl Frederik" = 450.5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.data_file, "club.json");
        assert_eq!(config.general.recent_limit, 10);
        assert_eq!(config.roster.people.len(), 3);
        assert_eq!(config.goals.collective_km, Some(2000.0));
        assert_eq!(config.goals.for_person("Kaia"), Some(600.0));
        assert_eq!(config.goals.for_person("Carl Frederik"), Some(450.5));
        assert_eq!(config.goals.for_person("Eirik"), None);
    }

    #[test]
    fn test_missing_goals_section_uses_defaults() {
        let config: Config = toml::from_str("[general]\nrecent_limit = 5\n").unwrap();
        assert_eq!(config.general.recent_limit, 5);
        assert_eq!(config.goals.collective_km, Some(7350.0));
        assert_eq!(config.roster.people.len(), 12);
    }

    #[test]
    fn test_validate_rejects_non_positive_goals() {
        let config: Config = toml::from_str(
            r#"
[goals.individual_km]
Kaia = 0.0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[goals]\ncollective_km = -1.0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_roster_name() {
        let config: Config = toml::from_str("[roster]\npeople = [\"Kaia\", \" \"]\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[roster]"));
        assert!(toml_str.contains("[goals]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.goals, Config::default().goals);
        assert_eq!(parsed.roster.people, Config::default().roster.people);
    }

    #[test]
    fn test_merge_with_args_overrides_data_file() {
        use crate::cli::{Args, Command};

        let mut args = Args {
            command: Command::Recent { limit: None },
            config: None,
            data_file: None,
            verbose: true,
            quiet: false,
        };
        let mut config = Config::default();
        config.merge_with_args(&args);
        assert_eq!(config.general.data_file, "running_data.json");

        args.data_file = Some("club/records.json".into());
        config.merge_with_args(&args);
        assert_eq!(config.general.data_file, "club/records.json");
        assert!(!Config::default_toml().contains("verbose"));
    }
}
