// Actix-Web test fixture - scoped services and configure functions
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

#[get("/{id}")]
async fn get_user(path: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().body(path.into_inner())
}

#[post("")]
async fn create_user() -> impl Responder {
    HttpResponse::Created().finish()
}

async fn list_convos() -> impl Responder {
    HttpResponse::Ok().finish()
}

/**
 * @openapi
 * /api/convos:
 *   get:
 *     tags: [convos]
 *     summary: List conversations.
 */
fn convo_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/convos").route(web::get().to(list_convos)));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    HttpServer::new(|| {
        App::new().service(health).service(
            web::scope("/api")
                .service(web::scope("/user").service(get_user).service(create_user))
                .configure(convo_routes),
        )
    })
    .bind(("127.0.0.1", 3080))?
    .run()
    .await
}
