use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok", "service": "gridbot-service" }))
}

pub async fn ready() -> impl Responder {
    HttpResponse::Ok().finish()
}

pub async fn live() -> impl Responder {
    HttpResponse::Ok().finish()
}
