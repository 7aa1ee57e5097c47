use actix_web::{middleware, web, App, HttpServer};
use etherlens::graphql::{graphql, playground};
use etherlens::node::{NodeClient, RpcNodeClient};
use etherlens::pipeline::Relay;
use etherlens::websocket::{ws_route, Hub};
use etherlens::{metrics, rest, AppState, Config, Explorer};
use log::info;
use std::io;
use std::sync::Arc;

// Main function
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let node: Arc<dyn NodeClient> = Arc::new(
        RpcNodeClient::new(&config.node_http_url, &config.node_ws_url, config.rpc_timeout)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?,
    );

    let hub = Hub::new(config.session_buffer);
    let explorer = Explorer::new(node.clone(), &config);
    let state = AppState::new(explorer, hub.clone(), &config);

    // Start the real-time relay: one upstream subscription pair shared by every viewer
    let relay = Relay::new(node, hub, &config);
    tokio::spawn(relay.run());

    let bind_addr = config.bind_addr();
    info!("Explorer listening on {}", bind_addr);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(state.clone()))
            .configure(rest::configure)
            .service(graphql)
            .service(playground)
            .route("/metrics", web::get().to(metrics::metrics))
            .route("/ws", web::get().to(ws_route))
            .route("/", web::get().to(ws_route))
    })
    .bind(bind_addr)?
    .run()
    .await
}
