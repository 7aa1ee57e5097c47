// Viewer side of the push channel: connection lifecycle, frame decoding and view state
pub mod controller;
pub mod dashboard;
pub mod message;

pub use controller::{Action, ConnectionState, ReconnectController};
pub use dashboard::Dashboard;
pub use message::parse_message;
