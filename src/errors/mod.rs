//! Error code table and the uniform response envelope

pub mod codes;
pub mod response;

pub use codes::ErrorCode;
pub use response::ApiResponse;
