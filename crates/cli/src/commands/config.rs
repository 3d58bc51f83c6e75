use std::env;
use std::fs;
use std::path::Path;

use churnguard_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

/// (key path, env vars consulted in order).
const FIELDS: &[(&str, &[&str])] = &[
    ("server.bind_address", &["CHURNGUARD_SERVER_BIND_ADDRESS"]),
    ("server.port", &["CHURNGUARD_SERVER_PORT"]),
    ("server.graceful_shutdown_secs", &["CHURNGUARD_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
    ("model.classifier_path", &["CHURNGUARD_MODEL_CLASSIFIER_PATH"]),
    ("model.scaler_path", &["CHURNGUARD_MODEL_SCALER_PATH"]),
    ("features.category_policy", &["CHURNGUARD_FEATURES_CATEGORY_POLICY"]),
    ("cors.allow_credentials", &["CHURNGUARD_CORS_ALLOW_CREDENTIALS"]),
    ("logging.level", &["CHURNGUARD_LOGGING_LEVEL", "CHURNGUARD_LOG_LEVEL"]),
    ("logging.format", &["CHURNGUARD_LOGGING_FORMAT", "CHURNGUARD_LOG_FORMAT"]),
];

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_keys) in FIELDS {
        lines.push(render_line(
            key_path,
            &effective_value(&config, key_path),
            field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn effective_value(config: &AppConfig, key_path: &str) -> String {
    match key_path {
        "server.bind_address" => config.server.bind_address.clone(),
        "server.port" => config.server.port.to_string(),
        "server.graceful_shutdown_secs" => config.server.graceful_shutdown_secs.to_string(),
        "model.classifier_path" => config.model.classifier_path.display().to_string(),
        "model.scaler_path" => config.model.scaler_path.display().to_string(),
        "features.category_policy" => format!("{:?}", config.features.category_policy),
        "cors.allow_credentials" => config.cors.allow_credentials.to_string(),
        "logging.level" => config.logging.level.clone(),
        "logging.format" => format!("{:?}", config.logging.format),
        _ => "<unknown>".to_string(),
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
