use std::path::Path;

use churnguard_core::CustomerRecord;
use serde::Serialize;

use crate::commands::predict::read_input;
use crate::commands::{load_pipeline, CommandResult, EXIT_INPUT, EXIT_REJECTED};

#[derive(Debug, Serialize)]
struct EncodedColumn {
    index: usize,
    name: &'static str,
    raw: f32,
    scaled: f32,
}

#[derive(Debug, Serialize)]
struct EncodeReport {
    command: &'static str,
    status: &'static str,
    columns: Vec<EncodedColumn>,
}

pub fn run(input: &Path) -> CommandResult {
    let pipeline = match load_pipeline("encode") {
        Ok(pipeline) => pipeline,
        Err(failure) => return failure,
    };

    let body = match read_input(input) {
        Ok(body) => body,
        Err(error) => {
            return CommandResult::failure("encode", "input_read", format!("{error:#}"), EXIT_INPUT)
        }
    };

    let features = CustomerRecord::from_slice(&body, pipeline.category_policy())
        .map_err(|error| ("validation", error.to_string()))
        .and_then(|record| {
            pipeline.encode(&record).map_err(|error| ("encoding", error.to_string()))
        });

    match features {
        Ok(features) => {
            let columns = features
                .raw
                .named()
                .zip(features.scaled.as_slice())
                .enumerate()
                .map(|(index, ((name, raw), &scaled))| EncodedColumn { index, name, raw, scaled })
                .collect();
            CommandResult::document(&EncodeReport { command: "encode", status: "ok", columns }, 0)
        }
        Err((error_class, message)) => {
            CommandResult::failure("encode", error_class, message, EXIT_REJECTED)
        }
    }
}
