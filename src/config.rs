//! Settings document (`howl.toml`).

use std::path::Path;

use howl_core::coyote::{DeviceParameters, FREQUENCY_RANGE, POWER_RANGE};
use howl_core::generator::AUTO_CYCLE_RANGE;
use howl_core::track::TrackSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub track: TrackConfig,
}

/// How normalised pulses become frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub swap_channels: bool,
    pub global_mute: bool,
    pub frequency_inversion_a: bool,
    pub frequency_inversion_b: bool,
    pub playback_speed: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            min_frequency: 10.0,
            max_frequency: 100.0,
            swap_channels: false,
            global_mute: false,
            frequency_inversion_a: false,
            frequency_inversion_b: false,
            playback_speed: 1.0,
        }
    }
}

/// Channel strengths and the slow automatic ramp.
///
/// `auto_increase_delay_*` is in seconds of playback per +1 step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub channel_a: u8,
    pub channel_b: u8,
    pub auto_increase: bool,
    pub auto_increase_delay_a: u32,
    pub auto_increase_delay_b: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            channel_a: 0,
            channel_b: 0,
            auto_increase: false,
            auto_increase_delay_a: 10,
            auto_increase_delay_b: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub channel_a_limit: u8,
    pub channel_b_limit: u8,
    pub channel_a_frequency_balance: u8,
    pub channel_b_frequency_balance: u8,
    pub channel_a_intensity_balance: u8,
    pub channel_b_intensity_balance: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceParameters::default().into()
    }
}

impl From<DeviceParameters> for DeviceConfig {
    fn from(p: DeviceParameters) -> Self {
        Self {
            channel_a_limit: p.channel_a_limit,
            channel_b_limit: p.channel_b_limit,
            channel_a_frequency_balance: p.channel_a_frequency_balance,
            channel_b_frequency_balance: p.channel_b_frequency_balance,
            channel_a_intensity_balance: p.channel_a_intensity_balance,
            channel_b_intensity_balance: p.channel_b_intensity_balance,
        }
    }
}

impl DeviceConfig {
    pub fn parameters(&self) -> DeviceParameters {
        DeviceParameters {
            channel_a_limit: self.channel_a_limit,
            channel_b_limit: self.channel_b_limit,
            channel_a_frequency_balance: self.channel_a_frequency_balance,
            channel_b_frequency_balance: self.channel_b_frequency_balance,
            channel_a_intensity_balance: self.channel_a_intensity_balance,
            channel_b_intensity_balance: self.channel_b_intensity_balance,
        }
    }
}

/// Activity selection and random switching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Display name or identifier of the starting activity; random when absent.
    pub initial: Option<String>,
    /// 0..=1, scaled to roughly three switches a minute at 1.
    pub change_probability: f64,
    pub seed: Option<u64>,
    /// Seconds between full generator re-randomisations; off when absent.
    pub generator_auto_cycle: Option<f64>,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            initial: None,
            change_probability: 0.5,
            seed: None,
            generator_auto_cycle: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub volume: f64,
    pub positional_effect_strength: f64,
    pub frequency_time_offset: f64,
    pub feel_exponent: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        let t = TrackSettings::default();
        Self {
            volume: t.volume,
            positional_effect_strength: t.positional_effect_strength,
            frequency_time_offset: t.frequency_time_offset,
            feel_exponent: t.feel_exponent,
        }
    }
}

impl TrackConfig {
    pub fn settings(&self) -> TrackSettings {
        TrackSettings {
            volume: self.volume,
            positional_effect_strength: self.positional_effect_strength,
            frequency_time_offset: self.frequency_time_offset,
            feel_exponent: self.feel_exponent,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("loading settings from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let o = &self.output;
        let (lo, hi) = (
            f64::from(*FREQUENCY_RANGE.start()),
            f64::from(*FREQUENCY_RANGE.end()),
        );
        for (field, value) in [
            ("output.min_frequency", o.min_frequency),
            ("output.max_frequency", o.max_frequency),
        ] {
            if !(lo..=hi).contains(&value) {
                return Err(invalid(field, format!("{value} Hz is outside {lo}..={hi}")));
            }
        }
        if o.min_frequency >= o.max_frequency {
            return Err(invalid(
                "output.min_frequency",
                "must be below output.max_frequency",
            ));
        }
        if !(0.25..=4.0).contains(&o.playback_speed) {
            return Err(invalid(
                "output.playback_speed",
                format!("{} is outside 0.25..=4", o.playback_speed),
            ));
        }

        let max_power = *POWER_RANGE.end();
        for (field, value) in [
            ("device.channel_a_limit", self.device.channel_a_limit),
            ("device.channel_b_limit", self.device.channel_b_limit),
            ("power.channel_a", self.power.channel_a),
            ("power.channel_b", self.power.channel_b),
        ] {
            if value > max_power {
                return Err(invalid(field, format!("{value} exceeds {max_power}")));
            }
        }
        if self.power.auto_increase_delay_a == 0 || self.power.auto_increase_delay_b == 0 {
            return Err(invalid("power.auto_increase_delay", "must be at least 1 second"));
        }

        let p = self.activity.change_probability;
        if p.is_nan() || p < 0.0 {
            return Err(invalid(
                "activity.change_probability",
                format!("{p} must be non-negative"),
            ));
        }
        if let Some(secs) = self.activity.generator_auto_cycle {
            if !AUTO_CYCLE_RANGE.contains(&secs) {
                return Err(invalid(
                    "activity.generator_auto_cycle",
                    format!("{secs}s is outside {AUTO_CYCLE_RANGE:?}"),
                ));
            }
        }

        let t = &self.track;
        if !(0.0..=1.0).contains(&t.volume) {
            return Err(invalid("track.volume", format!("{} is outside 0..=1", t.volume)));
        }
        if !(0.0..=1.0).contains(&t.positional_effect_strength) {
            return Err(invalid(
                "track.positional_effect_strength",
                format!("{} is outside 0..=1", t.positional_effect_strength),
            ));
        }
        if t.feel_exponent.is_nan() || t.feel_exponent <= 0.0 {
            return Err(invalid("track.feel_exponent", "must be positive"));
        }
        Ok(())
    }
}
