use crate::workflows::momentum::{PipelinePaths, RowErrorPolicy};
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_FRAMEWORK_PATH: &str = "json/pipeline-momentum-framework.json";
pub const DEFAULT_DEALS_PATH: &str = "test_deals.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let framework_path = env::var("MOMENTUM_FRAMEWORK_PATH")
            .unwrap_or_else(|_| DEFAULT_FRAMEWORK_PATH.to_string());
        let deals_path =
            env::var("MOMENTUM_DEALS_PATH").unwrap_or_else(|_| DEFAULT_DEALS_PATH.to_string());
        let output_dir =
            env::var("MOMENTUM_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());

        let row_errors = match env::var("MOMENTUM_ROW_ERRORS") {
            Ok(value) => RowErrorPolicy::parse(&value)
                .ok_or(ConfigError::InvalidRowErrorPolicy { value })?,
            Err(_) => RowErrorPolicy::default(),
        };

        let log_level = env::var("MOMENTUM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            pipeline: PipelineConfig {
                framework_path: PathBuf::from(framework_path),
                deals_path: PathBuf::from(deals_path),
                output_dir: PathBuf::from(output_dir),
                row_errors,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Input/output locations and the row error policy for a scoring run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub framework_path: PathBuf,
    pub deals_path: PathBuf,
    pub output_dir: PathBuf,
    pub row_errors: RowErrorPolicy,
}

impl PipelineConfig {
    pub fn paths(&self) -> PipelinePaths {
        PipelinePaths {
            framework: self.framework_path.clone(),
            deals: self.deals_path.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRowErrorPolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRowErrorPolicy { value } => write!(
                f,
                "MOMENTUM_ROW_ERRORS must be 'fail-fast' or 'collect', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
