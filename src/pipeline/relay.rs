use super::enricher::Enricher;
use crate::config::Config;
use crate::error::ExplorerError;
use crate::metrics::{ENRICH_TIME, EVENTS_DROPPED};
use crate::node::{EventStream, HeadEvent, NodeClient};
use crate::websocket::Hub;
use alloy_primitives::B256;
use backoff::{future::retry, ExponentialBackoff};
use futures::StreamExt;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

// Pause before re-subscribing after the upstream streams end or the backoff gives up
const UPSTREAM_RECONNECT_DELAY: u64 = 3;

// Holds the single upstream subscription pair and feeds every event through the
// enricher into the hub, which fans out to all viewers
pub struct Relay {
    node: Arc<dyn NodeClient>,
    enricher: Enricher,
    hub: Arc<Hub>,
    permits: Arc<Semaphore>,
    retry_window: Duration,
}

impl Relay {
    pub fn new(node: Arc<dyn NodeClient>, hub: Arc<Hub>, config: &Config) -> Self {
        Relay {
            enricher: Enricher::new(node.clone()),
            node,
            hub,
            permits: Arc::new(Semaphore::new(config.max_inflight)),
            retry_window: config.upstream_retry_window,
        }
    }

    // Never returns. An exhausted backoff window is logged and a fresh one started
    pub async fn run(self) {
        loop {
            match self.connect().await {
                Ok((heads, pending)) => {
                    info!("Relaying node events to {} connected viewers", self.hub.session_count());
                    self.pump(heads, pending).await;
                    warn!("Upstream subscription lost. Reconnecting...");
                }
                Err(e) => error!(
                    "Upstream unavailable for {:?}: {}. Restarting backoff",
                    self.retry_window, e
                ),
            }
            tokio::time::sleep(Duration::from_secs(UPSTREAM_RECONNECT_DELAY)).await;
        }
    }

    // Subscribes to both event kinds, retrying with exponential backoff
    async fn connect(&self) -> Result<(EventStream<HeadEvent>, EventStream<B256>), ExplorerError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_window),
            ..Default::default()
        };
        retry(backoff, || {
            let node = self.node.clone();
            async move {
                let heads = node.subscribe_new_heads().await.map_err(|e| {
                    warn!("Subscribing to new heads failed: {}", e);
                    backoff::Error::transient(e)
                })?;
                let pending = node.subscribe_pending_transactions().await.map_err(|e| {
                    warn!("Subscribing to pending transactions failed: {}", e);
                    backoff::Error::transient(e)
                })?;
                Ok::<_, backoff::Error<ExplorerError>>((heads, pending))
            }
        })
        .await
    }

    // Processes events until either stream ends, then waits for in-flight enrichment
    pub async fn pump(&self, mut heads: EventStream<HeadEvent>, mut pending: EventStream<B256>) {
        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                head = heads.next() => match head {
                    Some(Ok(head)) => self.dispatch_block(&mut tasks, head),
                    Some(Err(e)) => warn!("Malformed block header notification: {}", e),
                    None => break,
                },
                hash = pending.next() => match hash {
                    Some(Ok(hash)) => self.dispatch_pending(&mut tasks, hash),
                    Some(Err(e)) => warn!("Malformed pending transaction notification: {}", e),
                    None => break,
                },
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }
        while tasks.join_next().await.is_some() {}
    }

    fn dispatch_block(&self, tasks: &mut JoinSet<()>, head: HeadEvent) {
        if self.hub.session_count() == 0 {
            debug!("No viewers connected, skipping block {}", head.number);
            return;
        }
        let Ok(permit) = self.permits.clone().try_acquire_owned() else {
            EVENTS_DROPPED.inc();
            warn!("Enrichment saturated, dropping block {}", head.number);
            return;
        };
        let enricher = self.enricher.clone();
        let hub = self.hub.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let start_time = Instant::now();
            match enricher.enrich_block(head.number, &*hub).await {
                Ok(()) => ENRICH_TIME.observe(start_time.elapsed().as_secs_f64()),
                Err(e) => {
                    EVENTS_DROPPED.inc();
                    warn!("Dropping block {}: {}", head.number, e);
                }
            }
        });
    }

    fn dispatch_pending(&self, tasks: &mut JoinSet<()>, hash: B256) {
        if self.hub.session_count() == 0 {
            return;
        }
        let Ok(permit) = self.permits.clone().try_acquire_owned() else {
            EVENTS_DROPPED.inc();
            debug!("Enrichment saturated, dropping transaction {}", hash);
            return;
        };
        let enricher = self.enricher.clone();
        let hub = self.hub.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let start_time = Instant::now();
            match enricher.enrich_pending(hash, &*hub).await {
                Ok(()) => ENRICH_TIME.observe(start_time.elapsed().as_secs_f64()),
                Err(e) => {
                    EVENTS_DROPPED.inc();
                    warn!("Dropping transaction {}: {}", hash, e);
                }
            }
        });
    }
}
