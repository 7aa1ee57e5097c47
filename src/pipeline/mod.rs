// Enrichment Pipeline: subscription events in, display-ready records out
pub mod enricher;
pub mod relay;

pub use enricher::{Enricher, Outbox};
pub use relay::Relay;
