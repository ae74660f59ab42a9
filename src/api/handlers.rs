use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use crate::advice::{
    validate, ArgumentNotValid, BindingResult, BusinessException, Exception, JsonBody, Validate,
    ValidJson, ValidQuery,
};
use crate::errors::ApiResponse;

/// Business code: no user with the requested id
pub const USER_NOT_FOUND: i32 = 20001;
/// Business code: username already registered
pub const USERNAME_TAKEN: i32 = 20002;

const MAX_PAGE_SIZE: u32 = 100;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: Vec<User>,
    pub started_at: Instant,
}

impl AppStateInner {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users,
            started_at: Instant::now(),
        }
    }

    /// State pre-populated with a few demo accounts
    pub fn seeded() -> Self {
        Self::new(vec![
            User::new(1, "ferris", "ferris@rust-lang.org"),
            User::new(2, "corro", "corro@rust-lang.org"),
            User::new(3, "ferrous", "ferrous@example.com"),
        ])
    }
}

/// Registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// 3 to 32 characters, letters, digits and underscores
    pub username: String,
    /// Contact address
    pub email: String,
    /// Must be at least 18 when given
    pub age: Option<u32>,
}

impl Validate for CreateUserRequest {
    fn validate(&self, errors: &mut BindingResult) {
        let username = self.username.trim();
        if username.is_empty() {
            errors.reject("username", "not_blank", "username must not be blank");
        }
        if !(3..=32).contains(&username.chars().count()) {
            errors.reject_value(
                "username",
                &self.username,
                "length",
                "username must be between 3 and 32 characters",
            );
        }
        if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            errors.reject_value(
                "username",
                &self.username,
                "pattern",
                "username may only contain letters, digits and underscores",
            );
        }
        if self.email.trim().is_empty() {
            errors.reject("email", "not_blank", "email must not be blank");
        } else if !self.email.contains('@') {
            errors.reject_value("email", &self.email, "email", "email is malformed");
        }
        if let Some(age) = self.age {
            if age < 18 {
                errors.reject_value("age", age, "min", "age must be at least 18");
            }
        }
    }
}

/// User search query parameters
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SearchParams {
    /// Substring matched against usernames
    pub q: String,
    /// Page number for pagination (starts at 1)
    pub page: Option<u32>,
    /// Number of results per page (default: 20, max: 100)
    pub page_size: Option<u32>,
}

impl Validate for SearchParams {
    fn validate(&self, errors: &mut BindingResult) {
        if self.q.trim().is_empty() {
            errors.reject("q", "not_blank", "q must not be blank");
        }
        if let Some(page) = self.page {
            if page < 1 {
                errors.reject_value("page", page, "min", "page must be at least 1");
            }
        }
        if let Some(page_size) = self.page_size {
            if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
                errors.reject_value(
                    "page_size",
                    page_size,
                    "range",
                    format!("page_size must be between 1 and {}", MAX_PAGE_SIZE),
                );
            }
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = ApiResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> ApiResponse {
    ApiResponse::ok(json!({
        "status": "healthy",
        "service": "controller-advice",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

/// Register a user; the body is validated before the handler runs
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse),
        (status = 400, description = "Request argument not valid", body = ApiResponse),
        (status = 409, description = "Username already taken", body = ApiResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<ApiResponse, Exception> {
    let username = req.username.trim();
    if state.users.iter().any(|u| u.username == username) {
        return Err(BusinessException::new(USERNAME_TAKEN, "Username already taken")
            .with_detail(json!({ "username": username }))
            .with_status(StatusCode::CONFLICT)
            .into());
    }

    let user = User::new(state.users.len() as u64 + 1, username, req.email.trim());
    info!("Registered user: {}", user.username);
    Ok(ApiResponse::ok(user).with_status(StatusCode::CREATED))
}

/// Search users by username
#[utoipa::path(
    get,
    path = "/users/search",
    tag = "users",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching users", body = ApiResponse),
        (status = 400, description = "Request argument not valid", body = ApiResponse)
    )
)]
pub async fn search_users(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<SearchParams>,
) -> ApiResponse {
    let page = params.page.unwrap_or(1) as usize;
    let page_size = params.page_size.unwrap_or(20) as usize;
    let needle = params.q.trim().to_lowercase();

    let matches: Vec<&User> = state
        .users
        .iter()
        .filter(|u| u.username.to_lowercase().contains(&needle))
        .collect();
    let total = matches.len();
    let data: Vec<&User> = matches
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    ApiResponse::ok(json!({
        "data": data,
        "total": total,
        "page": page,
        "page_size": page_size,
    }))
}

/// Validate a registration payload without registering it
#[utoipa::path(
    post,
    path = "/users/check",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Payload is valid", body = ApiResponse),
        (status = 400, description = "Request argument not valid", body = ApiResponse)
    )
)]
pub async fn check_user(
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<ApiResponse, Exception> {
    validate(&req)?;
    Ok(ApiResponse::ok(json!({ "valid": true })))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = u64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse),
        (status = 400, description = "Id is not a number", body = ApiResponse),
        (status = 404, description = "User not found", body = ApiResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse, Exception> {
    let id: u64 = id
        .parse()
        .map_err(|_| ArgumentNotValid::new(vec![format!("id must be a number, got '{}'", id)]))?;

    match state.users.iter().find(|u| u.id == id) {
        Some(user) => Ok(ApiResponse::ok(user)),
        None => Err(BusinessException::new(USER_NOT_FOUND, "User not found")
            .with_detail(json!({ "id": id }))
            .with_status(StatusCode::NOT_FOUND)
            .into()),
    }
}

/// Always fails with an uncaught error
pub async fn boom() -> Result<ApiResponse, Exception> {
    let report = std::fs::read_to_string("/nonexistent/controller-advice/report.json")
        .context("Failed to load nightly report")?;
    Ok(ApiResponse::ok(report))
}

/// Always panics
pub async fn explode() -> ApiResponse {
    panic!("handler exploded on purpose");
}
