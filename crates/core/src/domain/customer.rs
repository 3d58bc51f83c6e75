use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{FieldIssue, ValidationError};

/// How the validator treats categorical values outside the known domains.
///
/// `Lenient` keeps the historical behavior: an unknown value passes validation
/// and encodes to all-zero indicator columns. `Strict` rejects it up front.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    #[default]
    Lenient,
    Strict,
}

impl std::str::FromStr for CategoryPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unsupported category policy `{other}` (expected lenient|strict)")),
        }
    }
}

const YES_NO: &[&str] = &["Yes", "No"];
const INTERNET_ADDON: &[&str] = &["Yes", "No", "No internet service"];

/// Accepted values for every categorical field, keyed by wire name.
pub const CATEGORY_DOMAINS: &[(&str, &[&str])] = &[
    ("gender", &["Female", "Male"]),
    ("Partner", YES_NO),
    ("Dependents", YES_NO),
    ("PhoneService", YES_NO),
    ("MultipleLines", &["Yes", "No", "No phone service"]),
    ("InternetService", &["DSL", "Fiber optic", "No"]),
    ("OnlineSecurity", INTERNET_ADDON),
    ("OnlineBackup", INTERNET_ADDON),
    ("DeviceProtection", INTERNET_ADDON),
    ("TechSupport", INTERNET_ADDON),
    ("StreamingTV", INTERNET_ADDON),
    ("StreamingMovies", INTERNET_ADDON),
    ("Contract", &["Month-to-month", "One year", "Two year"]),
    ("PaperlessBilling", YES_NO),
    (
        "PaymentMethod",
        &[
            "Bank transfer (automatic)",
            "Credit card (automatic)",
            "Electronic check",
            "Mailed check",
        ],
    ),
];

pub fn category_domain(field: &str) -> Option<&'static [&'static str]> {
    CATEGORY_DOMAINS.iter().find(|(name, _)| *name == field).map(|(_, values)| *values)
}

/// A validated customer profile as submitted to `/predict`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub gender: String,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: i64,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    pub tenure: f64,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl CustomerRecord {
    /// Parses a raw request body. Malformed JSON is reported against `body`.
    pub fn from_slice(body: &[u8], policy: CategoryPolicy) -> Result<Self, ValidationError> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|error| ValidationError::single("body", format!("invalid JSON: {error}")))?;
        Self::from_json(&payload, policy)
    }

    /// Checks presence and type of all 19 fields, collecting every issue
    /// before failing. Unknown keys are ignored.
    pub fn from_json(payload: &Value, policy: CategoryPolicy) -> Result<Self, ValidationError> {
        let Some(object) = payload.as_object() else {
            return Err(ValidationError::single("body", "expected a JSON object"));
        };

        let mut reader = FieldReader { object, policy, issues: Vec::new() };
        let record = Self {
            gender: reader.category("gender"),
            senior_citizen: reader.integer("SeniorCitizen"),
            partner: reader.category("Partner"),
            dependents: reader.category("Dependents"),
            tenure: reader.number("tenure"),
            phone_service: reader.category("PhoneService"),
            multiple_lines: reader.category("MultipleLines"),
            internet_service: reader.category("InternetService"),
            online_security: reader.category("OnlineSecurity"),
            online_backup: reader.category("OnlineBackup"),
            device_protection: reader.category("DeviceProtection"),
            tech_support: reader.category("TechSupport"),
            streaming_tv: reader.category("StreamingTV"),
            streaming_movies: reader.category("StreamingMovies"),
            contract: reader.category("Contract"),
            paperless_billing: reader.category("PaperlessBilling"),
            payment_method: reader.category("PaymentMethod"),
            monthly_charges: reader.number("MonthlyCharges"),
            total_charges: reader.number("TotalCharges"),
        };

        if reader.issues.is_empty() {
            Ok(record)
        } else {
            Err(ValidationError { issues: reader.issues })
        }
    }
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    policy: CategoryPolicy,
    issues: Vec<FieldIssue>,
}

impl<'a> FieldReader<'a> {
    fn field(&mut self, name: &str) -> Option<&'a Value> {
        let value = self.object.get(name);
        if value.is_none() {
            self.issues.push(FieldIssue::new(name, "field required"));
        }
        value
    }

    fn category(&mut self, name: &str) -> String {
        let policy = self.policy;
        let text = match self.field(name) {
            Some(Value::String(text)) => text.clone(),
            Some(_) => {
                self.issues.push(FieldIssue::new(name, "expected a string"));
                return String::new();
            }
            None => return String::new(),
        };

        if policy == CategoryPolicy::Strict {
            if let Some(domain) = category_domain(name) {
                if !domain.contains(&text.as_str()) {
                    self.issues.push(FieldIssue::new(
                        name,
                        format!("unrecognized value `{text}` (expected one of: {})", domain.join(", ")),
                    ));
                }
            }
        }

        text
    }

    fn integer(&mut self, name: &str) -> i64 {
        let parsed = match self.field(name) {
            Some(Value::Number(number)) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
                    .map(|value| value as i64)
            }),
            Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
            Some(_) => None,
            None => return 0,
        };

        parsed.unwrap_or_else(|| {
            self.issues.push(FieldIssue::new(name, "expected an integer"));
            0
        })
    }

    fn number(&mut self, name: &str) -> f64 {
        let parsed = match self.field(name) {
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
            Some(_) => None,
            None => return 0.0,
        };

        parsed.unwrap_or_else(|| {
            self.issues.push(FieldIssue::new(name, "expected a number"));
            0.0
        })
    }
}
