use std::fmt;

/// Stable error codes shared by every envelope the service emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Request handled successfully
    Success,

    /// Uncaught failure, details stay in the server log
    SystemException,

    /// Request argument binding or validation failed
    ArgumentNotValid,

    /// HTTP method not accepted by the matched route
    MethodNotSupported,

    /// No route matches the request path
    UrlNotFound,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::SystemException => write!(f, "SYSTEM_EXCEPTION"),
            Self::ArgumentNotValid => write!(f, "SYSTEM_ARGUMENT_NOT_VALID"),
            Self::MethodNotSupported => write!(f, "SYSTEM_REQUEST_METHOD_NOT_SUPPORTED"),
            Self::UrlNotFound => write!(f, "SYSTEM_REQUEST_URL_NOT_FOUND"),
        }
    }
}

impl ErrorCode {
    /// Numeric code written into the envelope
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::SystemException => 10000,
            Self::ArgumentNotValid => 10001,
            Self::MethodNotSupported => 10002,
            Self::UrlNotFound => 10003,
        }
    }

    /// Default human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::SystemException => "System exception",
            Self::ArgumentNotValid => "Request argument not valid",
            Self::MethodNotSupported => "Request method not supported",
            Self::UrlNotFound => "Request URL not found",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success => 200,
            Self::SystemException => 500,
            Self::ArgumentNotValid => 400,
            Self::MethodNotSupported => 405,
            Self::UrlNotFound => 404,
        }
    }
}
