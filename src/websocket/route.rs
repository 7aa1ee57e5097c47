use super::Viewer;
use crate::graphql::AppState;
use actix_web::{web, HttpResponse};
use actix_web_actors::ws;

// Upgrades the request to the push channel and starts a viewer session
pub async fn ws_route(
    req: actix_web::HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let session = state.hub.connect();
    ws::start(Viewer::new(session, state.flush_interval), &req, stream)
}
