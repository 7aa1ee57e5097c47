// REST API over the explorer service
pub mod routes;

use actix_web::web;

// Registers every REST endpoint
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::stats)
        .service(routes::latest_blocks)
        .service(routes::block)
        .service(routes::transaction)
        .service(routes::address)
        .service(routes::tokens)
        .service(routes::token_balance)
        .service(routes::token)
        .service(routes::search);
}
