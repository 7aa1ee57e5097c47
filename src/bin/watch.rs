use etherlens::client::{parse_message, Action, ConnectionState, Dashboard, ReconnectController};
use etherlens::models::{BlockRecord, NetworkStats, ServerMessage, TransactionRecord};
use etherlens::utils::{format_age, format_ether, format_gwei, format_hashrate, gas_utilization, shorten_hash};
use etherlens::WatchConfig;
use futures::StreamExt;
use log::{debug, error, info, warn};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_tungstenite::{connect_async, tungstenite::Message};

// Terminal viewer for the explorer's push channel
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = WatchConfig::from_env();
    let mut controller = ReconnectController::new(config.max_attempts, config.retry_delay);
    let mut dashboard = Dashboard::default();

    let mut action = controller.start();
    loop {
        action = match action {
            Action::Connect => {
                watch(&config.ws_url, &mut controller, &mut dashboard).await;
                controller.on_close()
            }
            Action::RetryAfter(delay) => {
                tokio::time::sleep(delay).await;
                controller.on_retry_timer()
            }
            Action::GiveUp => {
                error!("Giving up on {} after {} attempts", config.ws_url, controller.attempts());
                std::process::exit(1);
            }
            Action::Nothing => break,
        };
    }
}

// One connection lifetime; returns when the socket closes or fails
async fn watch(url: &str, controller: &mut ReconnectController, dashboard: &mut Dashboard) {
    let mut socket = match connect_async(url).await {
        Ok((socket, _)) => socket,
        Err(e) => {
            warn!("Connecting to {} failed: {}", url, e);
            controller.on_error();
            return;
        }
    };
    controller.on_open();
    info!("Watching {}", url);

    while let Some(frame) = socket.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(message) = parse_message(&text) {
                    let line = render(&message);
                    dashboard.apply(message);
                    println!("{}", line);
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(other) => debug!("Ignoring non-text frame {:?}", other),
            Err(e) => {
                warn!("Connection to {} failed: {}", url, e);
                controller.on_error();
                break;
            }
        }
    }
    if controller.state() == ConnectionState::Connected {
        info!("Disconnected from {}", url);
    }
}

fn render(message: &ServerMessage) -> String {
    match message {
        ServerMessage::NetworkStats(stats) => render_stats(stats),
        ServerMessage::NewBlock(block) => render_block(block),
        ServerMessage::NewTransaction(tx) => format!("tx    {}", render_transaction(tx)),
        ServerMessage::TransactionConfirmed(tx) => format!("done  {}", render_transaction(tx)),
    }
}

fn render_stats(stats: &NetworkStats) -> String {
    format!(
        "stats block #{} | gas {} gwei | {} peers | {}",
        stats.latest_block_number,
        stats.gas_price,
        stats.peer_count,
        format_hashrate(stats.hashrate)
    )
}

fn render_block(block: &BlockRecord) -> String {
    format!(
        "block #{} {} | {} txs | gas {} | {}",
        block.number,
        shorten_hash(&block.hash.to_string()),
        block.transactions.len(),
        gas_utilization(block.gas_used, block.gas_limit),
        format_age(block.timestamp, now())
    )
}

fn render_transaction(tx: &TransactionRecord) -> String {
    let to = match tx.to {
        Some(to) => shorten_hash(&to.to_string()),
        None => "contract creation".to_string(),
    };
    format!(
        "{} {} -> {} | {} ETH @ {} gwei | {:?}",
        shorten_hash(&tx.hash.to_string()),
        shorten_hash(&tx.from.to_string()),
        to,
        format_ether(tx.value),
        format_gwei(tx.gas_price),
        tx.status
    )
}

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
