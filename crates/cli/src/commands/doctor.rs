use churnguard_core::config::{AppConfig, LoadOptions};
use churnguard_core::{ArtifactManifest, ChurnPipeline, FeedForwardNetwork, ScalerParameters};
use serde::Serialize;
use serde_json::{json, Value};

use crate::commands::{CommandResult, EXIT_DOCTOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_DOCTOR };

    if json_output {
        return CommandResult::document(&report, exit_code);
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            check_artifacts(&config, &mut checks);
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["classifier_artifact", "scaler_artifact", "reference_prediction"] {
                checks.push(skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_artifacts(config: &AppConfig, checks: &mut Vec<DoctorCheck>) {
    let classifier = FeedForwardNetwork::load(&config.model.classifier_path);
    checks.push(match &classifier {
        Ok((network, source)) => DoctorCheck {
            name: "classifier_artifact",
            status: CheckStatus::Pass,
            details: format!(
                "{} loaded (version {}, {} layers, {} parameters, blake3 {})",
                config.model.classifier_path.display(),
                network.version,
                network.layers.len(),
                network.parameter_count(),
                source.fingerprint.short()
            ),
        },
        Err(error) => DoctorCheck {
            name: "classifier_artifact",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    });

    let scaler = ScalerParameters::load(&config.model.scaler_path);
    checks.push(match &scaler {
        Ok((_, source)) => DoctorCheck {
            name: "scaler_artifact",
            status: CheckStatus::Pass,
            details: format!(
                "{} loaded (blake3 {})",
                config.model.scaler_path.display(),
                source.fingerprint.short()
            ),
        },
        Err(error) => DoctorCheck {
            name: "scaler_artifact",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    });

    let (Ok((network, classifier_source)), Ok((scaler, scaler_source))) = (classifier, scaler)
    else {
        checks.push(skipped("reference_prediction", "an artifact failed to load"));
        return;
    };

    let manifest = ArtifactManifest {
        classifier_version: network.version.clone(),
        classifier: classifier_source,
        scaler: scaler_source,
    };
    let outcome = ChurnPipeline::new(scaler, network, config.features.category_policy, manifest)
        .map_err(|error| error.to_string())
        .and_then(|pipeline| {
            pipeline.predict(&reference_customer()).map_err(|error| error.to_string())
        });

    checks.push(match outcome {
        Ok(prediction) => DoctorCheck {
            name: "reference_prediction",
            status: CheckStatus::Pass,
            details: format!(
                "reference customer scored {:.4} ({})",
                prediction.churn_probability,
                prediction.prediction.as_str()
            ),
        },
        Err(error) => {
            DoctorCheck { name: "reference_prediction", status: CheckStatus::Fail, details: error }
        }
    });
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

/// Month-to-month fiber customer, a year in; used only to prove the artifacts score end to end.
fn reference_customer() -> Value {
    json!({
        "gender": "Male",
        "SeniorCitizen": 0,
        "Partner": "Yes",
        "Dependents": "No",
        "tenure": 12,
        "PhoneService": "Yes",
        "MultipleLines": "No",
        "InternetService": "Fiber optic",
        "OnlineSecurity": "No",
        "OnlineBackup": "No",
        "DeviceProtection": "No",
        "TechSupport": "No",
        "StreamingTV": "Yes",
        "StreamingMovies": "Yes",
        "Contract": "Month-to-month",
        "PaperlessBilling": "Yes",
        "PaymentMethod": "Electronic check",
        "MonthlyCharges": 85.5,
        "TotalCharges": 1020.0
    })
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
