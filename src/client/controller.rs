use log::{info, warn};
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    // Terminal: only a restart of the viewer recovers
    GivingUp,
}

// What the driver must do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    RetryAfter(Duration),
    GiveUp,
    Nothing,
}

// Keeps a single logical connection to the explorer's push channel. The driver
// feeds it socket events and timer expiry and performs the returned Action.
// Retries stop after `max_attempts` consecutive closes without a successful open
#[derive(Debug, Clone)]
pub struct ReconnectController {
    state: ConnectionState,
    attempts: u32,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Default for ReconnectController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl ReconnectController {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        ReconnectController { state: ConnectionState::Disconnected, attempts: 0, max_attempts, retry_delay }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // Initial load
    pub fn start(&mut self) -> Action {
        self.begin_connect()
    }

    pub fn on_open(&mut self) {
        if self.state == ConnectionState::Connecting {
            info!("Connected to real-time updates");
            self.state = ConnectionState::Connected;
            self.attempts = 0;
        }
    }

    // Errors are always followed by a close, which decides about retrying
    pub fn on_error(&mut self) {
        if matches!(self.state, ConnectionState::Connected | ConnectionState::Connecting) {
            self.state = ConnectionState::Disconnected;
        }
    }

    pub fn on_close(&mut self) -> Action {
        if self.state == ConnectionState::GivingUp {
            return Action::Nothing;
        }
        self.state = ConnectionState::Disconnected;
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            warn!("Real-time updates disconnected after {} attempts, giving up", self.attempts);
            self.state = ConnectionState::GivingUp;
            return Action::GiveUp;
        }
        info!("Disconnected, retrying in {:?} (attempt {}/{})", self.retry_delay, self.attempts, self.max_attempts);
        Action::RetryAfter(self.retry_delay)
    }

    // The retry delay elapsed
    pub fn on_retry_timer(&mut self) -> Action {
        self.begin_connect()
    }

    fn begin_connect(&mut self) -> Action {
        match self.state {
            ConnectionState::Disconnected if self.attempts < self.max_attempts => {
                self.state = ConnectionState::Connecting;
                Action::Connect
            }
            _ => Action::Nothing,
        }
    }
}
