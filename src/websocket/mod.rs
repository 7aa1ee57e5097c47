// Fan-out Hub: viewer sessions and the WebSocket push channel
pub mod actor;
pub mod hub;
pub mod route;

pub use actor::Viewer;
pub use hub::{Frame, Hub, ViewerSession};
pub use route::ws_route;
