use serde_json::Value;
use tracing::{error, warn};

use super::exception::{Exception, RequestContext};
use super::validation::FieldMessages;
use crate::errors::{ApiResponse, ErrorCode};

/// Converts a raised [`Exception`] into the uniform [`ApiResponse`] envelope.
///
/// Stateless and infallible; each call logs exactly one line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionTranslator;

impl ExceptionTranslator {
    pub fn new() -> Self {
        Self
    }

    pub fn translate(&self, exception: &Exception, request: &RequestContext) -> ApiResponse {
        let request_id = request.request_id.as_deref().unwrap_or("-");
        let category = exception.category();

        match exception {
            Exception::Business(ex) => {
                warn!(
                    request_id = %request_id,
                    category,
                    url = %request.url,
                    code = ex.code,
                    message = %ex.message,
                    "Business exception"
                );
                ApiResponse::business(ex.code, ex.message.clone(), ex.detail.clone(), ex.status)
            }
            Exception::Validation(failure) => {
                let messages = failure.field_messages();
                warn!(
                    request_id = %request_id,
                    category,
                    url = %request.url,
                    "Request argument not valid"
                );
                ApiResponse::fail_with(
                    ErrorCode::ArgumentNotValid,
                    Value::Array(messages.into_iter().map(Value::String).collect()),
                )
            }
            Exception::MethodNotAllowed { method, supported } => {
                let supported = supported
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                warn!(
                    request_id = %request_id,
                    category,
                    supported = %supported,
                    url = %request.url,
                    method = %method,
                    "Request method not supported"
                );
                ApiResponse::fail_with(
                    ErrorCode::MethodNotSupported,
                    Value::String(method.to_string()),
                )
            }
            Exception::RouteNotFound { method, url } => {
                error!(
                    request_id = %request_id,
                    category,
                    url = %url,
                    method = %method,
                    "Request URL not found"
                );
                ApiResponse::fail_with(ErrorCode::UrlNotFound, Value::String(exception.to_string()))
            }
            Exception::Unhandled(err) => {
                error!(
                    request_id = %request_id,
                    category,
                    url = %request.url,
                    error = ?err,
                    "Unhandled exception"
                );
                ApiResponse::fail(ErrorCode::SystemException)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::exception::BusinessException;
    use crate::advice::validation::{
        ArgumentNotValid, BindError, BindingResult, MethodArgumentNotValid,
    };
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Translate under a capturing subscriber and return the rendered log output
    fn translate_logged(ex: &Exception) -> (ApiResponse, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let resp = tracing::subscriber::with_default(subscriber, || {
            ExceptionTranslator::new().translate(ex, &ctx())
        });
        (resp, logs.contents())
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Method::POST, "http://localhost/users").with_request_id("req-1")
    }

    fn binding(messages: &[(&str, &str)]) -> BindingResult {
        let mut result = BindingResult::new("user");
        for (field, message) in messages {
            result.reject(*field, "rule", *message);
        }
        result
    }

    #[test]
    fn test_business_exception_copied_verbatim() {
        let ex = Exception::Business(
            BusinessException::new(20001, "user not found")
                .with_detail(json!({ "id": "42" }))
                .with_status(StatusCode::NOT_FOUND),
        );
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.code, 20001);
        assert_eq!(resp.message, "user not found");
        assert_eq!(resp.detail, Some(json!({ "id": "42" })));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_business_exception_without_detail() {
        let ex = Exception::Business(BusinessException::new(30000, "quota exhausted"));
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.detail, None);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bind_error_messages_in_order() {
        let ex: Exception = BindError(binding(&[
            ("name", "name must not be blank"),
            ("name", "name is too short"),
            ("age", "age must be positive"),
        ]))
        .into();
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.code, ErrorCode::ArgumentNotValid.code());
        assert_eq!(
            resp.detail,
            Some(json!([
                "name must not be blank",
                "name is too short",
                "age must be positive"
            ]))
        );
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_method_argument_messages() {
        let ex: Exception = MethodArgumentNotValid {
            parameter: "body".into(),
            binding_result: binding(&[("email", "email is malformed")]),
        }
        .into();
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.detail, Some(json!(["email is malformed"])));
    }

    #[test]
    fn test_custom_validation_list_used_directly() {
        let ex: Exception = ArgumentNotValid::new(vec!["a".into(), "a".into()]).into();
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.detail, Some(json!(["a", "a"])));
    }

    #[test]
    fn test_empty_validation_yields_empty_list() {
        let ex: Exception = BindError(BindingResult::new("query")).into();
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.code, ErrorCode::ArgumentNotValid.code());
        assert_eq!(resp.detail, Some(json!([])));
    }

    #[test]
    fn test_method_not_allowed_detail_is_method() {
        let ex = Exception::MethodNotAllowed {
            method: Method::PATCH,
            supported: vec![Method::GET, Method::POST],
        };
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.code, ErrorCode::MethodNotSupported.code());
        assert_eq!(resp.detail, Some(json!("PATCH")));
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_route_not_found_detail_is_message() {
        let ex = Exception::RouteNotFound {
            method: Method::GET,
            url: "/missing".into(),
        };
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.code, ErrorCode::UrlNotFound.code());
        assert_eq!(resp.detail, Some(json!("No handler found for GET /missing")));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unhandled_has_no_detail() {
        let ex = Exception::Unhandled(anyhow::anyhow!("password=hunter2 leaked in a panic"));
        let resp = ExceptionTranslator::new().translate(&ex, &ctx());
        assert_eq!(resp.code, ErrorCode::SystemException.code());
        assert_eq!(resp.message, "System exception");
        assert_eq!(resp.detail, None);
        let body = serde_json::to_string(&resp).unwrap();
        assert!(!body.contains("hunter2"));
    }

    #[test]
    fn test_concurrent_translation_is_independent() {
        let translator = Arc::new(ExceptionTranslator::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let translator = Arc::clone(&translator);
                thread::spawn(move || {
                    for i in 0..200 {
                        let code = worker * 1000 + i;
                        let ex = Exception::Business(
                            BusinessException::new(code, format!("failure {code}"))
                                .with_detail(json!(code)),
                        );
                        let request = RequestContext::new(Method::GET, format!("/items/{code}"));
                        let resp = translator.translate(&ex, &request);
                        assert_eq!(resp.code, code);
                        assert_eq!(resp.message, format!("failure {code}"));
                        assert_eq!(resp.detail, Some(json!(code)));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_business_log_is_warn_without_detail() {
        let ex = Exception::Business(
            BusinessException::new(20001, "user not found")
                .with_detail(json!({ "secret_token": "tok-991" })),
        );
        let (_, logs) = translate_logged(&ex);

        assert_eq!(logs.lines().count(), 1);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("category=\"business\""));
        assert!(logs.contains("code=20001"));
        assert!(logs.contains("request_id=req-1"));
        assert!(!logs.contains("tok-991"));
    }

    #[test]
    fn test_validation_log_is_warn_without_field_messages() {
        let ex: Exception = BindError(binding(&[("email", "email is malformed")])).into();
        let (resp, logs) = translate_logged(&ex);

        assert_eq!(resp.detail, Some(json!(["email is malformed"])));
        assert!(logs.contains("WARN"));
        assert!(logs.contains("category=\"validation\""));
        assert!(logs.contains("Request argument not valid"));
        assert!(!logs.contains("email is malformed"));
    }

    #[test]
    fn test_method_log_is_warn_with_supported_methods() {
        let ex = Exception::MethodNotAllowed {
            method: Method::PATCH,
            supported: vec![Method::GET, Method::POST],
        };
        let (_, logs) = translate_logged(&ex);

        assert!(logs.contains("WARN"));
        assert!(logs.contains("category=\"method_not_allowed\""));
        assert!(logs.contains("supported=GET, POST"));
        assert!(logs.contains("method=PATCH"));
    }

    #[test]
    fn test_route_not_found_log_is_error() {
        let ex = Exception::RouteNotFound {
            method: Method::GET,
            url: "/missing".into(),
        };
        let (_, logs) = translate_logged(&ex);

        assert!(logs.contains("ERROR"));
        assert!(logs.contains("category=\"route_not_found\""));
        assert!(logs.contains("url=/missing"));
    }

    #[test]
    fn test_unhandled_log_is_error_with_full_chain() {
        let err = anyhow::anyhow!("connection reset").context("Failed to load nightly report");
        let ex = Exception::Unhandled(err);
        let (resp, logs) = translate_logged(&ex);

        assert_eq!(resp.detail, None);
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("category=\"unhandled\""));
        assert!(logs.contains("Failed to load nightly report"));
        assert!(logs.contains("connection reset"));
    }
}
