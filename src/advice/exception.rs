use axum::http::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use super::validation::ValidationFailure;

/// Expected domain-rule violation carrying its own code, message and detail
#[derive(Debug, Clone, Error)]
#[error("{message} (code {code})")]
pub struct BusinessException {
    pub code: i32,
    pub message: String,
    pub detail: Option<Value>,
    pub status: StatusCode,
}

impl BusinessException {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// Every failure the translator knows how to turn into an envelope
#[derive(Debug, Error)]
pub enum Exception {
    #[error(transparent)]
    Business(#[from] BusinessException),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Request method '{method}' not supported")]
    MethodNotAllowed {
        method: Method,
        supported: Vec<Method>,
    },

    #[error("No handler found for {method} {url}")]
    RouteNotFound { method: Method, url: String },

    #[error(transparent)]
    Unhandled(anyhow::Error),
}

impl Exception {
    /// Short category name used in log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::Business(_) => "business",
            Self::Validation(_) => "validation",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::RouteNotFound { .. } => "route_not_found",
            Self::Unhandled(_) => "unhandled",
        }
    }
}

/// The originating request as seen by the translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    pub url: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
