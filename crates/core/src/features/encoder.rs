use crate::domain::CustomerRecord;
use crate::errors::EncodingError;
use crate::features::{FeatureVector, FEATURE_DIM};

/// Encodes a record into the raw (unscaled) feature vector.
///
/// Indicator columns compare the exact string, so a value outside the known
/// domain leaves its whole indicator group at zero.
pub fn encode(record: &CustomerRecord) -> Result<FeatureVector, EncodingError> {
    let internet = record.internet_service.as_str();
    let contract = record.contract.as_str();
    let payment = record.payment_method.as_str();

    let values: [f32; FEATURE_DIM] = [
        indicator(&record.gender, "Male"),
        record.senior_citizen as f32,
        indicator(&record.partner, "Yes"),
        indicator(&record.dependents, "Yes"),
        finite("tenure", record.tenure)?,
        indicator(&record.phone_service, "Yes"),
        indicator(&record.multiple_lines, "Yes"),
        indicator(&record.online_security, "Yes"),
        indicator(&record.online_backup, "Yes"),
        indicator(&record.device_protection, "Yes"),
        indicator(&record.tech_support, "Yes"),
        indicator(&record.streaming_tv, "Yes"),
        indicator(&record.streaming_movies, "Yes"),
        indicator(&record.paperless_billing, "Yes"),
        finite("MonthlyCharges", record.monthly_charges)?,
        finite("TotalCharges", record.total_charges)?,
        indicator(internet, "DSL"),
        indicator(internet, "Fiber optic"),
        indicator(internet, "No"),
        indicator(contract, "Month-to-month"),
        indicator(contract, "One year"),
        indicator(contract, "Two year"),
        indicator(payment, "Bank transfer (automatic)"),
        indicator(payment, "Credit card (automatic)"),
        indicator(payment, "Electronic check"),
        indicator(payment, "Mailed check"),
    ];

    Ok(FeatureVector::new(values))
}

fn indicator(value: &str, expected: &str) -> f32 {
    if value == expected {
        1.0
    } else {
        0.0
    }
}

fn finite(column: &'static str, value: f64) -> Result<f32, EncodingError> {
    let narrowed = value as f32;
    if narrowed.is_finite() {
        Ok(narrowed)
    } else {
        Err(EncodingError::NonFinite { column })
    }
}
