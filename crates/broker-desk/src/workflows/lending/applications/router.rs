use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationStatus, BrokerId, LoanApplicationPayload};
use super::repository::ApplicationStore;
use super::service::{ApplicationServiceError, LoanApplicationService};

/// Router builder exposing the broker application listing and intake
/// endpoints.
pub fn application_router<S>(service: Arc<LoanApplicationService<S>>) -> Router
where
    S: ApplicationStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/brokers/:broker_id/applications",
            get(list_handler::<S>).post(submit_handler::<S>),
        )
        .with_state(service)
}

/// Raw listing query parameters. Dates arrive as `YYYY-MM-DD`, statuses as
/// a comma-separated list of labels.
#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) submitted_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) submitted_until: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) completed: bool,
    #[serde(default, deserialize_with = "deserialize_statuses")]
    pub(crate) statuses: Vec<ApplicationStatus>,
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<LoanApplicationService<S>>>,
    Path(broker_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let broker_id = BrokerId(broker_id);
    let ListParams {
        submitted_from,
        submitted_until,
        completed,
        statuses,
    } = params;

    match service.list(&broker_id, submitted_from, submitted_until, completed, &statuses) {
        Ok(applications) => {
            let payload = json!({
                "success": true,
                "applications": applications,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(ApplicationServiceError::Filter(error)) => {
            let payload = json!({
                "success": false,
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "success": false,
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<LoanApplicationService<S>>>,
    Path(broker_id): Path<String>,
    axum::Json(payload): axum::Json<LoanApplicationPayload>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let broker_id = BrokerId(broker_id);

    match service.submit(&broker_id, payload) {
        Ok(receipt) => {
            let payload = json!({
                "success": true,
                "loan_amount": receipt.echoed_amount,
                "message": receipt.assessment.message(),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "success": false,
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

fn deserialize_statuses<'de, D>(deserializer: D) -> Result<Vec<ApplicationStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = opt else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().map_err(serde::de::Error::custom))
        .collect()
}
