use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::state::AppState;

use super::{SalaryFeature, SalaryPrediction, SalaryRequest};

/// POST /api/jobs/salary-prediction
pub async fn handle_salary_prediction(
    State(state): State<AppState>,
    Json(req): Json<SalaryRequest>,
) -> Result<Json<SalaryPrediction>, AppError> {
    match state.salary.as_ref() {
        SalaryFeature::Enabled(service) => Ok(Json(service.predict(&req)?)),
        SalaryFeature::Disabled { reason } => Err(AppError::FeatureDisabled(format!(
            "Salary estimation is unavailable: {reason}"
        ))),
    }
}
