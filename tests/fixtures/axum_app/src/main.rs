// Axum test fixture - a chat API split across route modules
mod routes;

use axum::{routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

fn app() -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", routes::auth::router())
        .nest("/api/user", routes::user::router())
}

#[tokio::main]
async fn main() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3080").await.unwrap();
    axum::serve(listener, app()).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> Router {
        Router::new().route("/only-in-tests", get(health))
    }
}
