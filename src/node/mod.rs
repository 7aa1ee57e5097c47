// Node Client: JSON-RPC access to the Ethereum-compatible node
pub mod client;
pub mod token;
pub mod types;

pub use client::{BlockId, EventStream, HeadEvent, NodeClient, RpcNodeClient};
pub use token::{token_balance, token_info};
