use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::pricing::{PriceBoard, PriceStore};

use super::domain::{
    ApplicantDetails, Decision, ImageUpload, RegistrationKind, RegistrationSubmission,
    ValidationError, ORDER_ID_NOTICE,
};
use super::order::RegistrationId;
use super::repository::{ImageStore, RegistrationRepository, RepositoryError};
use super::service::{EventRegistrationService, RegistrationServiceError};

/// Router builder exposing the JSON endpoints for submission, booking
/// status, price lookup, and the bearer-gated admin review surface.
pub fn registration_router<R, S, P>(service: Arc<EventRegistrationService<R, S, P>>) -> Router
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    Router::new()
        .route("/api/v1/registrations/:kind", post(submit_handler::<R, S, P>))
        .route("/api/v1/status/:order_id", get(status_handler::<R, S, P>))
        .route("/api/v1/prices", get(prices_handler::<R, S, P>))
        .route("/api/v1/admin/session", post(login_handler::<R, S, P>))
        .route("/api/v1/admin/session", delete(logout_handler::<R, S, P>))
        .route("/api/v1/admin/roster/:kind", get(roster_handler::<R, S, P>))
        .route(
            "/api/v1/admin/registrations/:id/approve",
            post(approve_handler::<R, S, P>),
        )
        .route(
            "/api/v1/admin/registrations/:id/decline",
            post(decline_handler::<R, S, P>),
        )
        .route("/api/v1/admin/prices", put(update_prices_handler::<R, S, P>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminLoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

pub(crate) async fn submit_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    let Some(kind) = RegistrationKind::parse(&kind) else {
        let payload = json!({ "error": "unknown registration kind" });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let submission = match form.into_submission(kind) {
        Ok(submission) => submission,
        Err(err) => return validation_response(err),
    };

    match service.submit(submission) {
        Ok(record) => {
            let payload = json!({
                "order_id": record.order_id.as_str(),
                "status": record.status.label(),
                "notice": ORDER_ID_NOTICE,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(RegistrationServiceError::Validation(err)) => validation_response(err),
        Err(RegistrationServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "a registration with this order id already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "registration submission failed");
            generic_failure("there was an error processing your registration, please try again")
        }
    }
}

pub(crate) async fn status_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    Path(order_id): Path<String>,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    match service.lookup(&order_id) {
        Ok(Some(view)) => (StatusCode::OK, axum::Json(view)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "no registration found with this order id" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => {
            error!(error = %err, %order_id, "status lookup failed");
            generic_failure("error checking registration status")
        }
    }
}

pub(crate) async fn prices_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    match service.prices() {
        Ok(board) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(err) => {
            error!(error = %err, "price fetch failed");
            generic_failure("error loading prices")
        }
    }
}

pub(crate) async fn login_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    axum::Json(request): axum::Json<AdminLoginRequest>,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    match service.login(&request.username, &request.password) {
        Some(token) => {
            let payload = json!({ "token": token.0 });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        None => {
            let payload = json!({ "error": "invalid credentials" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn logout_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    headers: HeaderMap,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    if let Some(token) = bearer_token(&headers) {
        service.logout(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn roster_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    if !authorized(&service, &headers) {
        return unauthorized();
    }
    let Some(kind) = RegistrationKind::parse(&kind) else {
        let payload = json!({ "error": "unknown registration kind" });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    match service.roster(kind) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => {
            error!(error = %err, kind = kind.label(), "roster fetch failed");
            generic_failure("error loading registrations")
        }
    }
}

pub(crate) async fn approve_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    decision_response(&service, &headers, id, Decision::Approve)
}

pub(crate) async fn decline_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    decision_response(&service, &headers, id, Decision::Decline)
}

fn decision_response<R, S, P>(
    service: &EventRegistrationService<R, S, P>,
    headers: &HeaderMap,
    id: String,
    decision: Decision,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    if !authorized(service, headers) {
        return unauthorized();
    }

    match service.decide(&RegistrationId(id), decision) {
        Ok(record) => {
            let payload = json!({
                "id": record.id.0,
                "order_id": record.order_id.as_str(),
                "status": record.status.label(),
                "message": format!("registration {} successfully", decision.past_tense()),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(RegistrationServiceError::AlreadyDecided) => {
            let payload = json!({ "error": "registration has already been decided" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(RegistrationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "registration not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "status update failed");
            generic_failure(&format!(
                "failed to {} registration, please try again",
                decision.past_tense()
            ))
        }
    }
}

pub(crate) async fn update_prices_handler<R, S, P>(
    State(service): State<Arc<EventRegistrationService<R, S, P>>>,
    headers: HeaderMap,
    axum::Json(board): axum::Json<PriceBoard>,
) -> Response
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    if !authorized(&service, &headers) {
        return unauthorized();
    }

    match service.set_prices(board) {
        Ok(()) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(err) => {
            error!(error = %err, "price update failed");
            generic_failure("failed to update prices")
        }
    }
}

fn authorized<R, S, P>(service: &EventRegistrationService<R, S, P>, headers: &HeaderMap) -> bool
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    bearer_token(headers)
        .map(|token| service.authorize(token))
        .unwrap_or(false)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> Response {
    let payload = json!({ "error": "missing or invalid session token" });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn validation_response(err: ValidationError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn generic_failure(message: &str) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

#[derive(Default)]
struct SubmissionForm {
    name: Option<String>,
    email: Option<String>,
    mobile: Option<String>,
    transaction_id: Option<String>,
    performance_type: Option<String>,
    profile_photo: Option<ImageUpload>,
    payment_screenshot: Option<ImageUpload>,
}

impl SubmissionForm {
    // Missing text parts become empty strings so the domain validation
    // reports them uniformly as missing fields.
    fn into_submission(
        self,
        kind: RegistrationKind,
    ) -> Result<RegistrationSubmission, ValidationError> {
        Ok(RegistrationSubmission {
            kind,
            applicant: ApplicantDetails {
                name: self.name.unwrap_or_default(),
                email: self.email.unwrap_or_default(),
                mobile: self.mobile.unwrap_or_default(),
            },
            transaction_id: self.transaction_id.unwrap_or_default(),
            performance_type: self.performance_type,
            profile_photo: self
                .profile_photo
                .ok_or(ValidationError::MissingField("profile_photo"))?,
            payment_screenshot: self
                .payment_screenshot
                .ok_or(ValidationError::MissingField("payment_screenshot"))?,
        })
    }
}

async fn read_form(mut multipart: Multipart) -> Result<SubmissionForm, Response> {
    let mut form = SubmissionForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(malformed_form(err.to_string())),
        };
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "profile_photo" | "payment_screenshot" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(err) => return Err(malformed_form(err.to_string())),
                };
                let upload = ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                };
                if name == "profile_photo" {
                    form.profile_photo = Some(upload);
                } else {
                    form.payment_screenshot = Some(upload);
                }
            }
            other => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(err) => return Err(malformed_form(err.to_string())),
                };
                match other {
                    "name" => form.name = Some(text),
                    "email" => form.email = Some(text),
                    "mobile" => form.mobile = Some(text),
                    "transaction_id" => form.transaction_id = Some(text),
                    "performance_type" => form.performance_type = Some(text),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

fn malformed_form(detail: String) -> Response {
    error!(%detail, "rejecting malformed multipart submission");
    let payload = json!({ "error": "malformed form data" });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}
