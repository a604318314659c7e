use serde::{Deserialize, Serialize};

use super::repo_types::MacroSums;

#[derive(Debug, Deserialize)]
pub struct FetchNutritionForm {
    pub dates: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionView {
    /// Stored timestamp rendered in the display offset.
    pub timestamp: String,
    pub prediction: String,
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub message: String,
    pub totals: MacroSums,
    pub averages: MacroSums,
    pub predictions: Vec<PredictionView>,
    pub start_date: String,
    pub end_date: String,
    pub num_days: u32,
}
