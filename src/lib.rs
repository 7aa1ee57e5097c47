pub mod client;
pub mod config;
pub mod error;
pub mod explorer;
pub mod graphql;
pub mod metrics;
pub mod models;
pub mod node;
pub mod pipeline;
pub mod rest;
pub mod utils;
pub mod websocket;

pub use config::{Config, WatchConfig};
pub use error::ExplorerError;
pub use explorer::Explorer;
pub use graphql::AppState;
pub use models::{BlockRecord, NetworkStats, ServerMessage, TransactionRecord, TxStatus};
pub use node::{NodeClient, RpcNodeClient};
pub use websocket::Hub;
