use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::Level;

pub const DEFAULT_CONFIG_FILE: &str = "taskflow-scanner";
pub const ENV_PREFIX: &str = "TASKFLOW";
pub const API_KEY_FALLBACK_VARS: [&str; 2] = ["OPENROUTER_API_KEY", "VITE_OPENROUTER_API_KEY"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub scan: ScanConfig,
    pub vision: VisionConfig,
    pub logging: LoggingConfig,
    pub camera: CameraConfig,
}

/// How attempts are started: on a fixed interval, or only when the user asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Auto { interval: Duration },
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanModeKind {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub mode: ScanModeKind,
    pub interval_ms: u64,
    pub confirmation_delay_ms: u64,
    pub extraction_timeout_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanModeKind::Auto,
            interval_ms: 5_000,
            confirmation_delay_ms: 1_500,
            extraction_timeout_ms: 15_000,
        }
    }
}

impl ScanConfig {
    pub fn manual() -> Self {
        Self {
            mode: ScanModeKind::Manual,
            ..Self::default()
        }
    }

    pub fn auto(interval: Duration) -> Self {
        Self {
            mode: ScanModeKind::Auto,
            interval_ms: interval.as_millis() as u64,
            ..Self::default()
        }
    }

    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn trigger_mode(&self) -> ScanMode {
        match self.mode {
            // A zero interval would spin the ticker.
            ScanModeKind::Auto => ScanMode::Auto {
                interval: Duration::from_millis(self.interval_ms.max(1)),
            },
            ScanModeKind::Manual => ScanMode::Manual,
        }
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_millis(self.extraction_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionProvider {
    OpenRouter,
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub provider: VisionProvider,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub referer: String,
    pub title: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: VisionProvider::OpenRouter,
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            api_key: None,
            referer: "https://taskflow.local".to_string(),
            title: "TaskFlow ID Scanner".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn max_level(&self) -> Level {
        Level::from_str(&self.level).unwrap_or(Level::INFO)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub image_path: Option<PathBuf>,
}

impl Configuration {
    /// Loads `taskflow-scanner.{toml,yaml,json}` (optional) and overlays
    /// `TASKFLOW__SECTION__KEY` environment variables.
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file.unwrap_or(DEFAULT_CONFIG_FILE)).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let mut configuration: Configuration = settings.try_deserialize()?;
        configuration.vision.api_key = configuration
            .vision
            .api_key
            .take()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_FALLBACK_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()))
            });
        Ok(configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timings() {
        let configuration = Configuration::default();
        assert_eq!(
            configuration.scan.trigger_mode(),
            ScanMode::Auto {
                interval: Duration::from_secs(5)
            }
        );
        assert_eq!(configuration.scan.confirmation_delay(), Duration::from_millis(1500));
        assert_eq!(configuration.scan.extraction_timeout(), Duration::from_secs(15));
        assert_eq!(configuration.vision.model, "openai/gpt-4o-mini");
        assert_eq!(configuration.logging.max_level(), Level::INFO);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let scan = ScanConfig::auto(Duration::ZERO);
        assert_eq!(
            scan.trigger_mode(),
            ScanMode::Auto {
                interval: Duration::from_millis(1)
            }
        );
    }

    #[test]
    fn deserializes_partial_sections() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [scan]
                mode = "manual"
                confirmation_delay_ms = 1000

                [vision]
                provider = "simulated"

                [logging]
                level = "debug"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let configuration: Configuration = settings.try_deserialize().unwrap();
        assert_eq!(configuration.scan.trigger_mode(), ScanMode::Manual);
        assert_eq!(configuration.scan.confirmation_delay(), Duration::from_secs(1));
        assert_eq!(configuration.scan.extraction_timeout_ms, 15_000);
        assert_eq!(configuration.vision.provider, VisionProvider::Simulated);
        assert_eq!(configuration.vision.title, "TaskFlow ID Scanner");
        assert_eq!(configuration.logging.max_level(), Level::DEBUG);
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
        };
        assert_eq!(logging.max_level(), Level::INFO);
    }
}
