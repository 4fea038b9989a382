//! XML configuration support (quick_xml + serde).
//!
//! ```xml
//! <config>
//!   <log_level>normal</log_level>
//!   <log_file>/path/to/checkin_control.log</log_file>
//!   <move>false</move>
//!   <json>false</json>
//! </config>
//! ```
//!
//! Every element is optional. Unknown elements are rejected so that typos surface.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::resolve_config_path;
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
    #[serde(rename = "move", default, deserialize_with = "de_bool_trimmed_opt")]
    move_by_default: Option<bool>,
    #[serde(rename = "json", default, deserialize_with = "de_bool_trimmed_opt")]
    json: Option<bool>,
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Values were read from this file.
    File(PathBuf),
    /// The default location was checked but holds no file; defaults apply.
    Missing(PathBuf),
    /// No config location could be determined; defaults apply.
    Unavailable,
}

// Accept surrounding whitespace and the usual spellings of a boolean.
fn de_bool_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => match s.as_str() {
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!("invalid boolean '{other}'"))),
        },
    }
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();
    if let Some(s) = parsed.log_level.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_level = trimmed.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
        }
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }
    cfg.move_by_default = parsed.move_by_default.unwrap_or(false);
    cfg.json = parsed.json.unwrap_or(false);
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the effective file configuration.
///
/// `explicit` is the `--config` flag. An explicitly named file (flag or
/// `CHECKIN_CONTROL_CONFIG`) must exist; a missing default file means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, ConfigSource)> {
    let Some((path, named)) = resolve_config_path(explicit) else {
        return Ok((Config::default(), ConfigSource::Unavailable));
    };
    if !path.exists() {
        if named {
            bail!("config file '{}' does not exist", path.display());
        }
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok((Config::default(), ConfigSource::Missing(path)));
    }
    let cfg = load_config_from_xml_path(&path)?;
    Ok((cfg, ConfigSource::File(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<Config> {
        let parsed: XmlConfig = from_xml_str(xml)?;
        xml_to_config(parsed)
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse("<config></config>").unwrap(), Config::default());
    }

    #[test]
    fn booleans_tolerate_whitespace() {
        let cfg = parse("<config><move>\n  true \n</move><json>no</json></config>").unwrap();
        assert!(cfg.move_by_default);
        assert!(!cfg.json);
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(parse("<config><download_base>/x</download_base></config>").is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = parse("<config><log_level>loud</log_level></config>").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}
