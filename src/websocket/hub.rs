use crate::metrics::{ACTIVE_SESSIONS, FRAMES_DROPPED};
use crate::models::ServerMessage;
use crate::pipeline::Outbox;
use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast::{self, error::TryRecvError};
use uuid::Uuid;

pub type Frame = Arc<ServerMessage>;

// Owns the set of connected viewers and fans every enriched record out to all of them.
// Each channel is bounded: a session that falls behind loses its oldest frames
pub struct Hub {
    blocks: broadcast::Sender<Frame>,
    transactions: broadcast::Sender<Frame>,
    sessions: DashMap<Uuid, Instant>,
}

impl Hub {
    // Channel capacity is `session_buffer` rounded up to the next power of two
    pub fn new(session_buffer: usize) -> Arc<Self> {
        Arc::new(Hub {
            blocks: broadcast::channel(session_buffer).0,
            transactions: broadcast::channel(session_buffer).0,
            sessions: DashMap::new(),
        })
    }

    // Registers a viewer with one block handle and one transaction handle of its own
    pub fn connect(self: &Arc<Self>) -> ViewerSession {
        let id = Uuid::new_v4();
        self.sessions.insert(id, Instant::now());
        ACTIVE_SESSIONS.inc();
        info!("Viewer {} connected ({} active)", id, self.sessions.len());
        ViewerSession {
            id,
            blocks: Some(self.blocks.subscribe()),
            transactions: Some(self.transactions.subscribe()),
            hub: self.clone(),
        }
    }

    // Forgets a viewer. Safe to call any number of times
    pub fn disconnect(&self, id: &Uuid) -> bool {
        match self.sessions.remove(id) {
            Some((_, connected_at)) => {
                ACTIVE_SESSIONS.dec();
                info!(
                    "Viewer {} disconnected after {:.1}s ({} active)",
                    id,
                    connected_at.elapsed().as_secs_f64(),
                    self.sessions.len()
                );
                true
            }
            None => false,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // Live subscription handles across all sessions, per channel
    pub fn handle_counts(&self) -> (usize, usize) {
        (self.blocks.receiver_count(), self.transactions.receiver_count())
    }
}

impl Outbox for Hub {
    fn publish(&self, message: ServerMessage) {
        let channel = if message.is_transaction() { &self.transactions } else { &self.blocks };
        let kind = message.kind();
        // Fails only when nobody is listening, which just discards the frame
        if let Ok(receivers) = channel.send(Arc::new(message)) {
            debug!("Published {} to {} viewers", kind, receivers);
        }
    }
}

// One connected viewer. Holds exactly one handle per channel until closed
pub struct ViewerSession {
    id: Uuid,
    blocks: Option<broadcast::Receiver<Frame>>,
    transactions: Option<broadcast::Receiver<Frame>>,
    hub: Arc<Hub>,
}

impl ViewerSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.blocks.is_some() || self.transactions.is_some()
    }

    // Takes everything queued for this viewer without waiting. Empty once closed
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        drain_channel(&self.id, &mut self.blocks, &mut frames);
        drain_channel(&self.id, &mut self.transactions, &mut frames);
        frames
    }

    // Releases both handles and deregisters from the hub. Idempotent
    pub fn close(&mut self) {
        self.blocks.take();
        self.transactions.take();
        self.hub.disconnect(&self.id);
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn drain_channel(id: &Uuid, handle: &mut Option<broadcast::Receiver<Frame>>, frames: &mut Vec<Frame>) {
    let Some(rx) = handle.as_mut() else {
        return;
    };
    let mut closed = false;
    loop {
        match rx.try_recv() {
            Ok(frame) => frames.push(frame),
            Err(TryRecvError::Lagged(skipped)) => {
                FRAMES_DROPPED.inc_by(skipped as f64);
                debug!("Viewer {} fell behind, dropped {} oldest frames", id, skipped);
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Closed) => {
                closed = true;
                break;
            }
        }
    }
    if closed {
        handle.take();
    }
}
