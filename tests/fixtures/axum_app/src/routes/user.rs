// User routes
use axum::{
    extract::Path,
    routing::{delete, get},
    Router,
};

/// @openapi
/// /api/user/{id}:
///   get:
///     tags: [user]
///     summary: Fetch a user profile.
pub fn router() -> Router {
    let profile = Router::new()
        .route("/", get(current_user))
        .route("/:id", get(user_by_id).delete(delete_user));

    profile.route("/terms", get(terms).post(accept_terms))
}

async fn current_user() {}

async fn user_by_id(Path(id): Path<String>) -> String {
    id
}

async fn delete_user(Path(_id): Path<String>) {}

async fn terms() {}

async fn accept_terms() {}
