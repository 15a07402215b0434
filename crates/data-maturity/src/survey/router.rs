use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use super::domain::{Identity, IntakeMode, SessionId};
use super::leads::LeadStore;
use super::notify::Notifier;
use super::registry::SessionRegistry;
use super::scoring::{MaturityTier, CANONICAL_TIERS};
use super::service::{AssessmentService, CollaboratorWarning, FollowUpReceipt};
use super::session::{AssessmentError, AssessmentErrorKind, SessionView};

/// Shared handler state: the service plus the live sessions it drives.
pub struct AssessmentApi<S, N> {
    pub service: Arc<AssessmentService<S, N>>,
    pub sessions: Arc<SessionRegistry>,
}

impl<S, N> Clone for AssessmentApi<S, N> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateAssessmentRequest {
    #[serde(default)]
    pub intake_mode: Option<IntakeMode>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub label: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowUpRequest {
    #[serde(default)]
    pub contact: Option<Identity>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub assessment: SessionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUpReceipt>,
    pub warnings: Vec<CollaboratorWarning>,
}

/// Router builder exposing the survey catalog and session transitions.
pub fn assessment_router<S, N>(
    service: Arc<AssessmentService<S, N>>,
    sessions: Arc<SessionRegistry>,
) -> Router
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/survey", get(catalog_handler::<S, N>))
        .route("/api/v1/assessments", post(create_handler::<S, N>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(view_handler::<S, N>).delete(discard_handler::<S, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/intake",
            post(intake_handler::<S, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/answers",
            post(answer_handler::<S, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/follow-up",
            post(follow_up_handler::<S, N>),
        )
        .with_state(AssessmentApi { service, sessions })
}

/// Decode a JSON body, answering with a JSON error instead of a plain-text rejection.
/// Malformed JSON is a 400; well-formed JSON of the wrong shape is a 422.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|err| {
        let status = if err.is_data() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::BAD_REQUEST
        };
        let payload = json!({ "error": format!("invalid request body: {err}") });
        (status, Json(payload)).into_response()
    })
}

/// Like [`parse_body`] but an empty body yields the default request.
fn parse_optional_body<T>(body: &Bytes) -> Result<T, Response>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_body(body)
}

fn assessment_error_response(error: AssessmentError) -> Response {
    let kind = error.kind();
    let status = match kind {
        AssessmentErrorKind::OutOfPhase => StatusCode::CONFLICT,
        AssessmentErrorKind::InvalidSelection | AssessmentErrorKind::IncompleteIdentity => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    let payload = json!({
        "error": error.to_string(),
        "kind": kind,
    });
    (status, Json(payload)).into_response()
}

fn not_found(id: &SessionId) -> Response {
    let payload = json!({
        "error": "assessment not found",
        "assessment_id": id.0,
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn ok_response(status: StatusCode, body: AssessmentResponse) -> Response {
    (status, Json(body)).into_response()
}

pub(crate) async fn catalog_handler<S, N>(State(api): State<AssessmentApi<S, N>>) -> Response
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    let catalog = api.service.catalog();
    let (min_total, max_total) = (catalog.min_total(), catalog.max_total());
    let tiers: Vec<_> = MaturityTier::ordered()
        .into_iter()
        .filter_map(|tier| {
            CANONICAL_TIERS
                .range_for(tier, min_total, max_total)
                .map(|(low, high)| {
                    json!({
                        "tier": tier,
                        "label": tier.label(),
                        "min_total": low,
                        "max_total": high,
                    })
                })
        })
        .collect();

    let payload = json!({
        "questions": catalog.questions(),
        "min_total": min_total,
        "max_total": max_total,
        "tier_table_version": CANONICAL_TIERS.version(),
        "tiers": tiers,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn create_handler<S, N>(
    State(api): State<AssessmentApi<S, N>>,
    body: Bytes,
) -> Response
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    let request: CreateAssessmentRequest = match parse_optional_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let session = api.service.start(request.intake_mode);
    let view = session.view();
    api.sessions.insert(session);

    ok_response(
        StatusCode::CREATED,
        AssessmentResponse {
            assessment: view,
            follow_up: None,
            warnings: Vec::new(),
        },
    )
}

pub(crate) async fn view_handler<S, N>(
    State(api): State<AssessmentApi<S, N>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    let id = SessionId(assessment_id);
    let Some(entry) = api.sessions.get(&id) else {
        return not_found(&id);
    };
    let session = entry.lock().await;

    ok_response(
        StatusCode::OK,
        AssessmentResponse {
            assessment: session.view(),
            follow_up: None,
            warnings: Vec::new(),
        },
    )
}

pub(crate) async fn discard_handler<S, N>(
    State(api): State<AssessmentApi<S, N>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    let id = SessionId(assessment_id);
    if api.sessions.remove(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&id)
    }
}

pub(crate) async fn intake_handler<S, N>(
    State(api): State<AssessmentApi<S, N>>,
    Path(assessment_id): Path<String>,
    body: Bytes,
) -> Response
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    let identity: Identity = match parse_body(&body) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let id = SessionId(assessment_id);
    let Some(entry) = api.sessions.get(&id) else {
        return not_found(&id);
    };
    let mut session = entry.lock().await;

    match api.service.confirm_intake(&mut session, identity).await {
        Ok(outcome) => ok_response(
            StatusCode::OK,
            AssessmentResponse {
                assessment: session.view(),
                follow_up: None,
                warnings: outcome.warnings,
            },
        ),
        Err(error) => assessment_error_response(error),
    }
}

pub(crate) async fn answer_handler<S, N>(
    State(api): State<AssessmentApi<S, N>>,
    Path(assessment_id): Path<String>,
    body: Bytes,
) -> Response
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    let request: AnswerRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let id = SessionId(assessment_id);
    let Some(entry) = api.sessions.get(&id) else {
        return not_found(&id);
    };
    let mut session = entry.lock().await;

    match api.service.advance(&mut session, &request.label) {
        Ok(_) => ok_response(
            StatusCode::OK,
            AssessmentResponse {
                assessment: session.view(),
                follow_up: None,
                warnings: Vec::new(),
            },
        ),
        Err(error) => assessment_error_response(error),
    }
}

pub(crate) async fn follow_up_handler<S, N>(
    State(api): State<AssessmentApi<S, N>>,
    Path(assessment_id): Path<String>,
    body: Bytes,
) -> Response
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    let request: FollowUpRequest = match parse_optional_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let id = SessionId(assessment_id);
    let Some(entry) = api.sessions.get(&id) else {
        return not_found(&id);
    };
    let session = entry.lock().await;

    match api.service.request_follow_up(&session, request.contact).await {
        Ok(receipt) => {
            let warnings = receipt.warnings.clone();
            ok_response(
                StatusCode::OK,
                AssessmentResponse {
                    assessment: session.view(),
                    follow_up: Some(receipt),
                    warnings,
                },
            )
        }
        Err(error) => assessment_error_response(error),
    }
}
