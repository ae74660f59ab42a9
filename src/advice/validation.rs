//! Argument validation failures and field error extraction
//!
//! Three failure shapes reach the translator: query binding failures
//! ([`BindError`]), request body failures ([`MethodArgumentNotValid`]) and
//! failures raised by manual validation ([`ArgumentNotValid`]). All of them
//! expose their messages through [`FieldMessages`].

use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use thiserror::Error;

/// A single violated constraint on one input field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub object_name: String,
    pub field: String,
    pub rejected_value: Option<Value>,
    /// Name of the rule that failed, e.g. `"not_blank"`
    pub rule: String,
    pub default_message: String,
}

/// Ordered collection of field errors for one bound object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingResult {
    object_name: String,
    errors: Vec<FieldError>,
}

impl BindingResult {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            errors: Vec::new(),
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Record a violation without a rejected value
    pub fn reject(
        &mut self,
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(field.into(), None, rule.into(), message.into());
    }

    /// Record a violation along with the value that was rejected
    pub fn reject_value(
        &mut self,
        field: impl Into<String>,
        value: impl Serialize,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) {
        let value = serde_json::to_value(value).ok();
        self.push(field.into(), value, rule.into(), message.into());
    }

    fn push(&mut self, field: String, rejected_value: Option<Value>, rule: String, message: String) {
        self.errors.push(FieldError {
            object_name: self.object_name.clone(),
            field,
            rejected_value,
            rule,
            default_message: message,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_field_errors(&self) -> bool {
        self.has_errors()
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Anything that can report its violations as ordered, human-readable messages
pub trait FieldMessages {
    fn field_messages(&self) -> Vec<String>;
}

impl FieldMessages for BindingResult {
    fn field_messages(&self) -> Vec<String> {
        if !self.has_field_errors() {
            return Vec::new();
        }
        self.errors
            .iter()
            .map(|e| e.default_message.clone())
            .collect()
    }
}

/// Binding of query or form parameters failed
#[derive(Debug, Clone, Error)]
#[error("binding of '{}' failed with {} error(s)", .0.object_name(), .0.error_count())]
pub struct BindError(pub BindingResult);

impl FieldMessages for BindError {
    fn field_messages(&self) -> Vec<String> {
        self.0.field_messages()
    }
}

/// Validation of a handler argument (usually the request body) failed
#[derive(Debug, Clone, Error)]
#[error("validation failed for argument '{parameter}' with {} error(s)", .binding_result.error_count())]
pub struct MethodArgumentNotValid {
    pub parameter: String,
    pub binding_result: BindingResult,
}

impl FieldMessages for MethodArgumentNotValid {
    fn field_messages(&self) -> Vec<String> {
        self.binding_result.field_messages()
    }
}

/// Failure raised by manual validation; already a flat list of messages
#[derive(Debug, Clone, Error)]
#[error("argument not valid: {}", .errors.join("; "))]
pub struct ArgumentNotValid {
    pub errors: Vec<String>,
}

impl ArgumentNotValid {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

impl FieldMessages for ArgumentNotValid {
    fn field_messages(&self) -> Vec<String> {
        self.errors.clone()
    }
}

/// The validation failure shapes the translator knows about
#[derive(Debug, Clone, Error)]
pub enum ValidationFailure {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    MethodArgument(#[from] MethodArgumentNotValid),
    #[error(transparent)]
    Argument(#[from] ArgumentNotValid),
}

impl FieldMessages for ValidationFailure {
    fn field_messages(&self) -> Vec<String> {
        match self {
            Self::Bind(e) => e.field_messages(),
            Self::MethodArgument(e) => e.field_messages(),
            Self::Argument(e) => e.field_messages(),
        }
    }
}

/// Extract field messages from an arbitrary error.
///
/// Recognized shapes yield their messages in order; anything else yields an
/// empty list.
pub fn extract_field_errors(err: &(dyn StdError + 'static)) -> Vec<String> {
    if let Some(e) = err.downcast_ref::<ValidationFailure>() {
        e.field_messages()
    } else if let Some(e) = err.downcast_ref::<BindError>() {
        e.field_messages()
    } else if let Some(e) = err.downcast_ref::<MethodArgumentNotValid>() {
        e.field_messages()
    } else if let Some(e) = err.downcast_ref::<ArgumentNotValid>() {
        e.field_messages()
    } else {
        Vec::new()
    }
}

/// Types that can check their own constraints
pub trait Validate {
    /// Record every violated constraint into `errors`
    fn validate(&self, errors: &mut BindingResult);

    /// Object name used in recorded field errors
    fn object_name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Run a value's constraints, returning the violations as [`ArgumentNotValid`]
pub fn validate<T: Validate>(value: &T) -> Result<(), ArgumentNotValid> {
    let mut result = BindingResult::new(value.object_name());
    value.validate(&mut result);
    if result.has_errors() {
        Err(ArgumentNotValid::new(result.field_messages()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Signup {
        username: String,
        age: u32,
    }

    impl Validate for Signup {
        fn validate(&self, errors: &mut BindingResult) {
            if self.username.trim().is_empty() {
                errors.reject("username", "not_blank", "username must not be blank");
            }
            if self.username.len() < 3 {
                errors.reject_value("username", &self.username, "length", "username is too short");
            }
            if self.age < 18 {
                errors.reject_value("age", self.age, "min", "age must be at least 18");
            }
        }
    }

    fn sample_binding() -> BindingResult {
        let mut result = BindingResult::new("signup");
        result.reject("email", "not_blank", "email must not be blank");
        result.reject("email", "email", "email is malformed");
        result.reject("age", "min", "age must be at least 18");
        result
    }

    #[test]
    fn test_binding_result_preserves_order_and_duplicates() {
        let result = sample_binding();
        assert_eq!(
            result.field_messages(),
            vec![
                "email must not be blank",
                "email is malformed",
                "age must be at least 18"
            ]
        );
        assert_eq!(
            result
                .field_errors()
                .iter()
                .filter(|e| e.field == "email")
                .count(),
            2
        );
        assert_eq!(result.field_errors()[0].object_name, "signup");
    }

    #[test]
    fn test_empty_binding_yields_empty_list() {
        let err = BindError(BindingResult::new("query"));
        assert!(err.field_messages().is_empty());
    }

    #[test]
    fn test_method_argument_uses_nested_binding() {
        let err = MethodArgumentNotValid {
            parameter: "body".into(),
            binding_result: sample_binding(),
        };
        assert_eq!(err.field_messages().len(), 3);
        assert_eq!(err.to_string(), "validation failed for argument 'body' with 3 error(s)");
    }

    #[test]
    fn test_argument_not_valid_passes_list_through() {
        let err = ArgumentNotValid::new(vec!["b".into(), "a".into(), "b".into()]);
        assert_eq!(err.field_messages(), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_extract_from_known_shapes() {
        let bind = BindError(sample_binding());
        assert_eq!(extract_field_errors(&bind).len(), 3);

        let custom = ArgumentNotValid::new(vec!["x".into()]);
        assert_eq!(extract_field_errors(&custom), vec!["x"]);

        let wrapped = ValidationFailure::from(custom);
        assert_eq!(extract_field_errors(&wrapped), vec!["x"]);
    }

    #[test]
    fn test_extract_from_unknown_shape_is_empty() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        assert!(extract_field_errors(&io).is_empty());
    }

    #[test]
    fn test_validate_collects_messages() {
        let signup = Signup {
            username: " ".into(),
            age: 12,
        };
        let err = validate(&signup).unwrap_err();
        assert_eq!(
            err.errors,
            vec![
                "username must not be blank",
                "username is too short",
                "age must be at least 18"
            ]
        );
        assert_eq!(signup.object_name(), "Signup");
    }

    #[test]
    fn test_validate_passes() {
        let signup = Signup {
            username: "ferris".into(),
            age: 30,
        };
        assert!(validate(&signup).is_ok());
    }

    #[test]
    fn test_rejected_value_is_recorded() {
        let mut result = BindingResult::new("query");
        result.reject_value("page", 0, "min", "page must be at least 1");
        assert_eq!(
            result.field_errors()[0].rejected_value,
            Some(serde_json::json!(0))
        );
    }
}
