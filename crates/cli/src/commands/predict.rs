use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::commands::{load_pipeline, CommandResult, EXIT_INPUT, EXIT_REJECTED};

pub fn run(input: &Path) -> CommandResult {
    let pipeline = match load_pipeline("predict") {
        Ok(pipeline) => pipeline,
        Err(failure) => return failure,
    };

    let body = match read_input(input) {
        Ok(body) => body,
        Err(error) => {
            return CommandResult::failure("predict", "input_read", format!("{error:#}"), EXIT_INPUT)
        }
    };

    // Same body the HTTP endpoint would send back.
    match pipeline.predict_body(&body) {
        Ok(prediction) => CommandResult::document(&prediction, 0),
        Err(error) => CommandResult::document(&json!({ "error": error.to_string() }), EXIT_REJECTED),
    }
}

pub(crate) fn read_input(input: &Path) -> Result<Vec<u8>> {
    fs::read(input).with_context(|| format!("failed to read customer record `{}`", input.display()))
}
