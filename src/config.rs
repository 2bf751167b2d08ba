//! Threshold configuration for the cleaning pipeline.
//!
//! [`CleanerConfig`] carries the nine tunable thresholds. It is validated once
//! with [`CleanerConfig::validate`] before reaching the detectors, which treat
//! the values as constants.

use crate::error::{CleanerError, Result};

/// Thresholds for jitter detection, smoothing and idling detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CleanerConfig {
    /// Hard ceiling for plausible speed (km/h).
    /// Default: 180.0
    pub max_speed_kmh: f64,

    /// Robust z-score cutoff applied to the speed series.
    /// Default: 3.5
    pub speed_mad_threshold: f64,

    /// Minimum bearing change (degrees) for the geometry signal.
    /// Default: 60.0
    pub bearing_change_threshold_deg: f64,

    /// Maximum displacement (meters) for the geometry signal to apply.
    /// Default: 3.0
    pub min_distance_meters: f64,

    /// Hampel filter window width. Must be odd and at least 3.
    /// Default: 5
    pub hampel_window_size: usize,

    /// Hampel filter sensitivity, in scaled MADs.
    /// Default: 3.0
    pub hampel_n_sigma: f64,

    /// EMA smoothing weight in [0, 1]. Higher follows the raw track more closely.
    /// Default: 0.25
    pub ema_alpha: f64,

    /// Speeds below this are considered stationary (km/h).
    /// Default: 3.0
    pub idle_speed_kmh: f64,

    /// Minimum duration of a stationary run to report it as idling (seconds).
    /// Default: 120.0
    pub idle_min_duration_sec: f64,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            max_speed_kmh: 180.0,
            speed_mad_threshold: 3.5,
            bearing_change_threshold_deg: 60.0,
            min_distance_meters: 3.0,
            hampel_window_size: 5,
            hampel_n_sigma: 3.0,
            ema_alpha: 0.25,
            idle_speed_kmh: 3.0,
            idle_min_duration_sec: 120.0,
        }
    }
}

impl CleanerConfig {
    /// Check every threshold, returning the first violation found.
    ///
    /// # Example
    /// ```
    /// use gps_cleaner::CleanerConfig;
    ///
    /// assert!(CleanerConfig::default().validate().is_ok());
    ///
    /// let even_window = CleanerConfig { hampel_window_size: 4, ..Default::default() };
    /// assert!(even_window.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("max_speed_kmh", self.max_speed_kmh),
            ("speed_mad_threshold", self.speed_mad_threshold),
            ("bearing_change_threshold_deg", self.bearing_change_threshold_deg),
            ("min_distance_meters", self.min_distance_meters),
            ("hampel_n_sigma", self.hampel_n_sigma),
            ("ema_alpha", self.ema_alpha),
            ("idle_speed_kmh", self.idle_speed_kmh),
            ("idle_min_duration_sec", self.idle_min_duration_sec),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite, got {}", name, value)));
            }
        }

        if self.max_speed_kmh <= 0.0 {
            return Err(invalid(format!(
                "max_speed_kmh must be positive, got {}",
                self.max_speed_kmh
            )));
        }
        if self.speed_mad_threshold <= 0.0 {
            return Err(invalid(format!(
                "speed_mad_threshold must be positive, got {}",
                self.speed_mad_threshold
            )));
        }
        if !(0.0..=180.0).contains(&self.bearing_change_threshold_deg) {
            return Err(invalid(format!(
                "bearing_change_threshold_deg must be in [0, 180], got {}",
                self.bearing_change_threshold_deg
            )));
        }
        if self.min_distance_meters < 0.0 {
            return Err(invalid(format!(
                "min_distance_meters must be non-negative, got {}",
                self.min_distance_meters
            )));
        }
        if self.hampel_window_size < 3 || self.hampel_window_size % 2 == 0 {
            return Err(invalid(format!(
                "hampel_window_size must be odd and at least 3, got {}",
                self.hampel_window_size
            )));
        }
        if self.hampel_n_sigma <= 0.0 {
            return Err(invalid(format!(
                "hampel_n_sigma must be positive, got {}",
                self.hampel_n_sigma
            )));
        }
        if !(0.0..=1.0).contains(&self.ema_alpha) {
            return Err(invalid(format!("ema_alpha must be in [0, 1], got {}", self.ema_alpha)));
        }
        if self.idle_speed_kmh < 0.0 {
            return Err(invalid(format!(
                "idle_speed_kmh must be non-negative, got {}",
                self.idle_speed_kmh
            )));
        }
        if self.idle_min_duration_sec < 0.0 {
            return Err(invalid(format!(
                "idle_min_duration_sec must be non-negative, got {}",
                self.idle_min_duration_sec
            )));
        }

        Ok(())
    }

    /// Parse a JSON object of thresholds and validate it.
    ///
    /// Missing keys take their defaults, so `{}` is a valid configuration.
    #[cfg(feature = "io")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    #[cfg(feature = "io")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("[GpsCleaner] Loaded config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }
}

fn invalid(message: String) -> CleanerError {
    CleanerError::InvalidConfiguration(message)
}
