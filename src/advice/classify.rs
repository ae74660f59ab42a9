//! Classification of raw errors into [`Exception`] categories at the
//! framework boundary.

use super::exception::{BusinessException, Exception};
use super::validation::{ArgumentNotValid, BindError, MethodArgumentNotValid, ValidationFailure};

/// Turn an arbitrary error into the category the translator dispatches on.
///
/// Known types are recovered by downcasting, anything else is `Unhandled`.
pub fn classify(err: anyhow::Error) -> Exception {
    let err = match err.downcast::<Exception>() {
        Ok(ex) => return ex,
        Err(err) => err,
    };
    let err = match err.downcast::<BusinessException>() {
        Ok(ex) => return Exception::Business(ex),
        Err(err) => err,
    };
    let err = match err.downcast::<ValidationFailure>() {
        Ok(failure) => return Exception::Validation(failure),
        Err(err) => err,
    };
    let err = match err.downcast::<BindError>() {
        Ok(failure) => return failure.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<MethodArgumentNotValid>() {
        Ok(failure) => return failure.into(),
        Err(err) => err,
    };
    match err.downcast::<ArgumentNotValid>() {
        Ok(failure) => failure.into(),
        Err(err) => Exception::Unhandled(err),
    }
}

impl From<anyhow::Error> for Exception {
    fn from(err: anyhow::Error) -> Self {
        classify(err)
    }
}

impl From<BindError> for Exception {
    fn from(err: BindError) -> Self {
        Exception::Validation(err.into())
    }
}

impl From<MethodArgumentNotValid> for Exception {
    fn from(err: MethodArgumentNotValid) -> Self {
        Exception::Validation(err.into())
    }
}

impl From<ArgumentNotValid> for Exception {
    fn from(err: ArgumentNotValid) -> Self {
        Exception::Validation(err.into())
    }
}
