pub mod config;
pub mod doctor;
pub mod encode;
pub mod predict;

use churnguard_core::config::{AppConfig, LoadOptions};
use churnguard_core::ChurnPipeline;
use serde::Serialize;

pub const EXIT_REJECTED: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_ARTIFACTS: u8 = 3;
pub const EXIT_INPUT: u8 = 4;
pub const EXIT_DOCTOR: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: String,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: error_class.to_string(),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Pretty JSON document with a caller-chosen exit code.
    pub fn document(value: &impl Serialize, exit_code: u8) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(output) => Self { exit_code, output },
            Err(error) => Self::failure("unknown", "serialization", error.to_string(), EXIT_REJECTED),
        }
    }
}

/// Loads configuration and both artifacts, mapping each failure to its own exit code.
pub(crate) fn load_pipeline(command: &str) -> Result<ChurnPipeline, CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })?;

    ChurnPipeline::load(&config.model, config.features.category_policy).map_err(|error| {
        CommandResult::failure(command, "artifact_load", error.to_string(), EXIT_ARTIFACTS)
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
