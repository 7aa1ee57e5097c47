// GraphQL module for defining the application state and GraphQL schema
pub mod routes;
pub mod schema;

pub use routes::{graphql, playground};
pub use schema::QueryRoot;

use super::config::Config;
use super::explorer::Explorer;
use super::websocket::Hub;
use async_graphql::{EmptyMutation, EmptySubscription, Schema};
use std::sync::Arc;
use std::time::Duration;

pub type ExplorerSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

// Application state shared across REST, GraphQL and WebSocket handlers
#[derive(Clone)]
pub struct AppState {
    pub explorer: Explorer, // Query service over the node
    pub hub: Arc<Hub>, // Fan-out hub owning viewer sessions
    pub flush_interval: Duration, // Session drain cadence for WebSocket actors
    pub schema: ExplorerSchema, // GraphQL schema instance
}

impl AppState {
    pub fn new(explorer: Explorer, hub: Arc<Hub>, config: &Config) -> Self {
        // Build the GraphQL schema with the query root and the explorer service
        let schema = Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
            .data(explorer.clone())
            .finish();

        AppState { explorer, hub, flush_interval: config.flush_interval, schema }
    }
}
