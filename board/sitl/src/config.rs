use std::time::Duration;

use anyhow::{bail, Context};

/// Settings of a simulation run, read from `SITL_*` environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct SitlConfig {
    /// Run the pump in absolute-only mode (`SITL_ABSOLUTE`)
    pub absolute: bool,
    /// The simulated device has a relative orientation sensor (`SITL_RELATIVE_AVAILABLE`)
    pub relative_available: bool,
    /// The simulated device has an absolute orientation sensor (`SITL_ABSOLUTE_AVAILABLE`)
    pub absolute_available: bool,
    /// Polling frequency (`SITL_FREQUENCY_HZ`)
    pub frequency_hz: f64,
    /// Length of the run (`SITL_RUN_SECS`)
    pub run_for: Duration,
    /// Crash the sensor service this long into the run (`SITL_DISCONNECT_SECS`)
    pub disconnect_after: Option<Duration>,
}

impl Default for SitlConfig {
    fn default() -> Self {
        Self {
            absolute: false,
            relative_available: true,
            absolute_available: true,
            frequency_hz: 60.0,
            run_for: Duration::from_secs(4),
            disconnect_after: None,
        }
    }
}

impl SitlConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup("SITL_ABSOLUTE") {
            config.absolute = parse_bool("SITL_ABSOLUTE", &value)?;
        }
        if let Some(value) = lookup("SITL_RELATIVE_AVAILABLE") {
            config.relative_available = parse_bool("SITL_RELATIVE_AVAILABLE", &value)?;
        }
        if let Some(value) = lookup("SITL_ABSOLUTE_AVAILABLE") {
            config.absolute_available = parse_bool("SITL_ABSOLUTE_AVAILABLE", &value)?;
        }
        if let Some(value) = lookup("SITL_FREQUENCY_HZ") {
            config.frequency_hz = value
                .trim()
                .parse::<f64>()
                .context("Failed to parse SITL_FREQUENCY_HZ")?;
        }
        if let Some(value) = lookup("SITL_RUN_SECS") {
            config.run_for = parse_secs("SITL_RUN_SECS", &value)?;
        }
        if let Some(value) = lookup("SITL_DISCONNECT_SECS") {
            config.disconnect_after = Some(parse_secs("SITL_DISCONNECT_SECS", &value)?);
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid boolean for {}: {:?}", key, other),
    }
}

fn parse_secs(key: &str, value: &str) -> anyhow::Result<Duration> {
    let secs = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Failed to parse {}", key))?;
    if !secs.is_finite() || secs < 0.0 {
        bail!("{} must be a non-negative number of seconds, got {}", key, secs);
    }
    Ok(Duration::from_secs_f64(secs))
}
