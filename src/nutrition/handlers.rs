use axum::{
    extract::{rejection::FormRejection, State},
    routing::post,
    Form, Json, Router,
};
use tracing::{info, instrument};

use super::dto::{FetchNutritionForm, NutritionSummary};
use super::services::fetch_nutrition_summary;
use crate::{error::ApiError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/fetch-nutrition-data", post(fetch_nutrition_data))
}

#[instrument(skip(state, form))]
pub async fn fetch_nutrition_data(
    State(state): State<AppState>,
    form: Result<Form<FetchNutritionForm>, FormRejection>,
) -> Result<Json<NutritionSummary>, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::Form {
        status: e.status(),
        message: e.body_text(),
    })?;
    let dates = form.dates.ok_or(ApiError::MissingField("dates"))?;
    let summary =
        fetch_nutrition_summary(state.nutrition.as_ref(), &dates, state.config.display_offset)
            .await?;
    info!(
        start = %summary.start_date,
        end = %summary.end_date,
        predictions = summary.predictions.len(),
        "nutrition data fetched"
    );
    Ok(Json(summary))
}
