use utoipa::OpenApi;

use crate::api::handlers::{CreateUserRequest, SearchParams, User};
use crate::errors::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Controller Advice Demo",
        version = "0.1.0",
        description = "Demo API whose failures are all translated into a uniform {code, message, detail} envelope.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::create_user,
        crate::api::handlers::search_users,
        crate::api::handlers::check_user,
        crate::api::handlers::get_user,
    ),
    components(
        schemas(
            ApiResponse,
            User,
            CreateUserRequest,
            SearchParams,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User registration and lookup"),
    )
)]
pub struct ApiDoc;
