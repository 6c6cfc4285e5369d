//! HTTP request handlers

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use tracing::{debug, warn};

use super::form::{parse_form, FormError};
use super::page::render_page;
use super::state::AppState;
use super::{to_percent, PredictionOutcome};
use crate::data::FeatureRow;
use crate::engine::{find_probability_column, predictions_column, Predictor, POSITIVE_LABELS};
use crate::error::{Error, Result};

/// Predict one feature row
///
/// The probability comes from the positive-class probability column,
/// scaled to a percentage; it is 0 when the model emits no such column.
pub fn predict_row(predictor: &dyn Predictor, row: &FeatureRow) -> Result<PredictionOutcome> {
    let frame = predictor.predict(&row.to_dataset()?)?;
    let output = predictor.output_feature();

    let pred_column = predictions_column(output);
    let prediction = frame
        .bools(&pred_column)
        .and_then(|values| values.first().copied())
        .ok_or_else(|| Error::Model(format!("No value in prediction column {pred_column}")))?;

    let probability = find_probability_column(&frame.column_names(), output, &POSITIVE_LABELS)
        .and_then(|column| frame.floats(&column).and_then(|v| v.first().copied()))
        .map_or(0.0, to_percent);
    if !(0.0..=100.0).contains(&probability) {
        return Err(Error::Model(format!(
            "Probability {probability} is outside [0, 100]"
        )));
    }

    Ok(PredictionOutcome {
        prediction,
        probability,
    })
}

fn error_payload(message: String) -> Response {
    Json(serde_json::json!({ "error": message })).into_response()
}

/// GET / - the empty form
pub async fn home() -> Html<String> {
    Html(render_page(None))
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    form: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let _request_timer = state.metrics.request_timer();
    let start = Instant::now();

    let row = match form
        .map_err(|rejection| FormError::Body(rejection.body_text()))
        .and_then(|Form(fields)| parse_form(&fields))
    {
        Ok(row) => row,
        Err(e) => {
            debug!("Rejected form: {e}");
            return error_payload(e.to_string());
        }
    };

    match predict_row(state.predictor.as_ref(), &row) {
        Ok(outcome) => {
            state.metrics.record_prediction(start.elapsed());
            Html(render_page(Some(&outcome))).into_response()
        }
        Err(e) => {
            warn!("Prediction failed: {e}");
            error_payload(e.to_string())
        }
    }
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, state.metrics.content_type())], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
