use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::case::ClearanceError;
use super::domain::{
    ActorContext, Department, DocumentType, FormPayload, FormType, ReviewDecision, Role, StudentId,
};
use super::repository::{CaseRepository, EventPublisher, RepositoryError};
use super::service::{ClearanceService, ClearanceServiceError};
use super::views::CaseView;

/// Router builder exposing the clearance case endpoints. Actor identity
/// rides in the request body, supplied by the authentication layer in front
/// of this service.
pub fn clearance_router<R, N>(service: Arc<ClearanceService<R, N>>) -> Router
where
    R: CaseRepository + 'static,
    N: EventPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/clearance-cases/:student_id",
            get(case_handler::<R, N>),
        )
        .route(
            "/api/v1/clearance-cases/:student_id/forms/:form_type/submit",
            post(submit_form_handler::<R, N>),
        )
        .route(
            "/api/v1/clearance-cases/:student_id/forms/:form_type/decide",
            post(decide_form_handler::<R, N>),
        )
        .route(
            "/api/v1/clearance-cases/:student_id/documents/:document_type/upload",
            post(upload_document_handler::<R, N>),
        )
        .route(
            "/api/v1/clearance-cases/:student_id/documents/:document_type/decide",
            post(decide_document_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct SubmitFormRequest {
    pub actor_id: String,
    pub department: String,
    pub payload: FormPayload,
}

#[derive(Debug, Deserialize)]
pub struct DecideFormRequest {
    pub actor: ActorContext,
    pub role: Role,
    pub decision: ReviewDecision,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub actor_id: String,
    pub storage_key: String,
}

#[derive(Debug, Deserialize)]
pub struct DecideDocumentRequest {
    pub actor: ActorContext,
    pub decision: ReviewDecision,
    #[serde(default)]
    pub comments: Option<String>,
}

pub(crate) async fn case_handler<R, N>(
    State(service): State<Arc<ClearanceService<R, N>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: CaseRepository + 'static,
    N: EventPublisher + 'static,
{
    match service.case(&StudentId(student_id)) {
        Ok(case) => (StatusCode::OK, axum::Json(CaseView::project(&case))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_form_handler<R, N>(
    State(service): State<Arc<ClearanceService<R, N>>>,
    Path((student_id, form_type)): Path<(String, String)>,
    axum::Json(request): axum::Json<SubmitFormRequest>,
) -> Response
where
    R: CaseRepository + 'static,
    N: EventPublisher + 'static,
{
    let Some(form_type) = FormType::parse(&form_type) else {
        return unknown_item_response("form", &form_type);
    };
    if request.payload.form_type() != form_type {
        let payload = json!({
            "error": format!(
                "payload is for form '{}' but the path names '{}'",
                request.payload.form_type().label(),
                form_type.label()
            ),
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    match service.submit_form(
        &StudentId(student_id),
        &Department::new(request.department),
        request.payload,
        &request.actor_id,
    ) {
        Ok(case) => (StatusCode::ACCEPTED, axum::Json(CaseView::project(&case))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decide_form_handler<R, N>(
    State(service): State<Arc<ClearanceService<R, N>>>,
    Path((student_id, form_type)): Path<(String, String)>,
    axum::Json(request): axum::Json<DecideFormRequest>,
) -> Response
where
    R: CaseRepository + 'static,
    N: EventPublisher + 'static,
{
    let Some(form_type) = FormType::parse(&form_type) else {
        return unknown_item_response("form", &form_type);
    };

    match service.decide_form(
        &StudentId(student_id),
        form_type,
        request.role,
        &request.actor,
        request.decision,
        request.comments.as_deref(),
    ) {
        Ok(case) => (StatusCode::OK, axum::Json(CaseView::project(&case))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn upload_document_handler<R, N>(
    State(service): State<Arc<ClearanceService<R, N>>>,
    Path((student_id, document_type)): Path<(String, String)>,
    axum::Json(request): axum::Json<UploadDocumentRequest>,
) -> Response
where
    R: CaseRepository + 'static,
    N: EventPublisher + 'static,
{
    let Some(doc_type) = DocumentType::parse(&document_type) else {
        return unknown_item_response("document", &document_type);
    };

    match service.upload_document(
        &StudentId(student_id),
        doc_type,
        request.storage_key,
        &request.actor_id,
    ) {
        Ok(case) => (StatusCode::ACCEPTED, axum::Json(CaseView::project(&case))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decide_document_handler<R, N>(
    State(service): State<Arc<ClearanceService<R, N>>>,
    Path((student_id, document_type)): Path<(String, String)>,
    axum::Json(request): axum::Json<DecideDocumentRequest>,
) -> Response
where
    R: CaseRepository + 'static,
    N: EventPublisher + 'static,
{
    let Some(doc_type) = DocumentType::parse(&document_type) else {
        return unknown_item_response("document", &document_type);
    };

    match service.decide_document(
        &StudentId(student_id),
        doc_type,
        &request.actor,
        request.decision,
        request.comments.as_deref(),
    ) {
        Ok(case) => (StatusCode::OK, axum::Json(CaseView::project(&case))).into_response(),
        Err(error) => error_response(error),
    }
}

fn unknown_item_response(kind: &str, raw: &str) -> Response {
    let payload = json!({ "error": format!("unknown {kind} type '{raw}'") });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

/// Policy errors map to user-correctable 4xx responses; state
/// desynchronization maps to 409 so clients refetch the case.
fn error_response(error: ClearanceServiceError) -> Response {
    let status = match &error {
        ClearanceServiceError::Policy(ClearanceError::NotFound) => StatusCode::NOT_FOUND,
        ClearanceServiceError::Policy(ClearanceError::Unauthorized) => StatusCode::FORBIDDEN,
        ClearanceServiceError::Policy(ClearanceError::CommentRequired) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ClearanceServiceError::Policy(
            ClearanceError::NotUnlocked
            | ClearanceError::AlreadySubmitted
            | ClearanceError::NotSubmitted
            | ClearanceError::DuplicateVote,
        ) => StatusCode::CONFLICT,
        ClearanceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ClearanceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ClearanceServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
