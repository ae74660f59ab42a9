use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::{any::Any, sync::Arc};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{debug, info};

use super::exception::{Exception, RequestContext};
use super::translator::ExceptionTranslator;
use super::validation::{BindError, BindingResult, MethodArgumentNotValid, Validate};
use crate::config::AdviceConfig;

/// Per-request identifier placed in request extensions by the logging layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Exception attached to a response, waiting for the advice layer
#[derive(Debug, Clone)]
pub struct RaisedException(pub Arc<Exception>);

impl Exception {
    /// Status used when no advice layer rewrites the response
    pub fn default_status(&self) -> StatusCode {
        match self {
            Self::Business(ex) => ex.status,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Exception {
    fn into_response(self) -> Response {
        let status = self.default_status();
        let body = match &self {
            Self::Unhandled(_) => status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string(),
            other => other.to_string(),
        };

        let mut response = (status, body).into_response();
        response
            .extensions_mut()
            .insert(RaisedException(Arc::new(self)));
        response
    }
}

/// Translate raised exceptions into envelopes.
///
/// 405 responses produced by the router (recognized by their `Allow` header)
/// are treated as [`Exception::MethodNotAllowed`].
pub async fn exception_advice(request: Request, next: Next) -> Response {
    let mut context = RequestContext::new(request.method().clone(), request.uri().path());
    if let Some(RequestId(id)) = request.extensions().get::<RequestId>() {
        context = context.with_request_id(id.clone());
    }

    let response = next.run(request).await;

    if let Some(RaisedException(exception)) = response.extensions().get::<RaisedException>() {
        return ExceptionTranslator::new()
            .translate(exception, &context)
            .into_response();
    }

    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        let Some(allow) = response.headers().get(header::ALLOW).cloned() else {
            return response;
        };
        let exception = Exception::MethodNotAllowed {
            method: context.method.clone(),
            supported: allowed_methods(response.headers()),
        };
        let mut translated = ExceptionTranslator::new()
            .translate(&exception, &context)
            .into_response();
        translated.headers_mut().insert(header::ALLOW, allow);
        return translated;
    }

    response
}

fn allowed_methods(headers: &HeaderMap) -> Vec<Method> {
    headers
        .get(header::ALLOW)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(',')
                .filter_map(|m| Method::from_bytes(m.trim().as_bytes()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Fallback for requests no route matches
pub async fn route_not_found(method: Method, uri: Uri) -> Exception {
    Exception::RouteNotFound {
        method,
        url: uri.path().to_string(),
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    Exception::Unhandled(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

/// Register the advice on a router when enabled.
///
/// When disabled the router is returned untouched and raised exceptions fall
/// back to their plain-text default rendering.
pub fn install(router: Router, config: &AdviceConfig) -> Router {
    if !config.enabled {
        debug!("Controller advice disabled");
        return router;
    }

    info!("Controller advice enabled");
    router
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(exception_advice))
}

/// JSON body extractor whose rejections are raised as [`MethodArgumentNotValid`]
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let mut binding = BindingResult::new("body");
                binding.reject("body", "readable", rejection.body_text());
                Err(MethodArgumentNotValid {
                    parameter: "body".to_string(),
                    binding_result: binding,
                }
                .into())
            }
        }
    }
}

/// JSON body extractor that runs [`Validate`] on the decoded value
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;

        let mut binding = BindingResult::new(value.object_name());
        value.validate(&mut binding);
        if binding.has_errors() {
            return Err(MethodArgumentNotValid {
                parameter: "body".to_string(),
                binding_result: binding,
            }
            .into());
        }

        Ok(Self(value))
    }
}

/// Query string extractor that runs [`Validate`] on the bound value
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let value = match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => value,
            Err(rejection) => {
                let mut binding = BindingResult::new("query");
                binding.reject("query", "bindable", rejection.body_text());
                return Err(BindError(binding).into());
            }
        };

        let mut binding = BindingResult::new(value.object_name());
        value.validate(&mut binding);
        if binding.has_errors() {
            return Err(BindError(binding).into());
        }

        Ok(Self(value))
    }
}
