//! Fixed-order feature vectors consumed by the churn classifier.
//!
//! The column order below is the order the classifier and the scaler were
//! fit against. Reordering it silently corrupts every prediction.

pub mod encoder;
pub mod scaler;

use serde::Serialize;

pub use encoder::encode;
pub use scaler::ScalerParameters;

pub const FEATURE_DIM: usize = 26;

pub const FEATURE_COLUMNS: [&str; FEATURE_DIM] = [
    "gender_Male",
    "SeniorCitizen",
    "Partner_Yes",
    "Dependents_Yes",
    "tenure",
    "PhoneService_Yes",
    "MultipleLines_Yes",
    "OnlineSecurity_Yes",
    "OnlineBackup_Yes",
    "DeviceProtection_Yes",
    "TechSupport_Yes",
    "StreamingTV_Yes",
    "StreamingMovies_Yes",
    "PaperlessBilling_Yes",
    "MonthlyCharges",
    "TotalCharges",
    "InternetService_DSL",
    "InternetService_Fiber optic",
    "InternetService_No",
    "Contract_Month-to-month",
    "Contract_One year",
    "Contract_Two year",
    "PaymentMethod_Bank transfer (automatic)",
    "PaymentMethod_Credit card (automatic)",
    "PaymentMethod_Electronic check",
    "PaymentMethod_Mailed check",
];

/// Positions rewritten by the scaler, aligned with the scaler's column order.
pub const SCALED_INDICES: [usize; 3] = [4, 14, 15];
pub const SCALED_COLUMNS: [&str; 3] = ["tenure", "MonthlyCharges", "TotalCharges"];

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f32; FEATURE_DIM]);

impl FeatureVector {
    pub fn new(values: [f32; FEATURE_DIM]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub(crate) fn set(&mut self, index: usize, value: f32) {
        self.0[index] = value;
    }

    /// Pairs each value with its column name.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_COLUMNS.iter().copied().zip(self.0.iter().copied())
    }
}
