//! Centralized translation of request failures into [`ApiResponse`] envelopes
//!
//! Handlers raise an [`Exception`] (directly, through `?`, or via the
//! [`JsonBody`]/[`ValidJson`]/[`ValidQuery`] extractors). The [`exception_advice`] layer
//! picks it up from the response and asks the [`ExceptionTranslator`] for the
//! envelope.
//!
//! [`ApiResponse`]: crate::errors::ApiResponse

pub mod classify;
pub mod exception;
pub mod middleware;
pub mod translator;
pub mod validation;

pub use classify::classify;
pub use exception::{BusinessException, Exception, RequestContext};
pub use middleware::{
    exception_advice, install, route_not_found, JsonBody, RaisedException, RequestId, ValidJson,
    ValidQuery,
};
pub use translator::ExceptionTranslator;
pub use validation::{
    extract_field_errors, validate, ArgumentNotValid, BindError, BindingResult, FieldError,
    FieldMessages, MethodArgumentNotValid, Validate, ValidationFailure,
};
