use super::hub::ViewerSession;
use actix::{Actor, AsyncContext, StreamHandler};
use actix_web_actors::ws::{self, WebsocketContext};
use log::{debug, info, warn};
use std::time::Duration;

// WebSocket actor bridging one viewer's session to its socket
pub struct Viewer {
    session: ViewerSession,
    flush_interval: Duration,
}

impl Viewer {
    pub fn new(session: ViewerSession, flush_interval: Duration) -> Self {
        Viewer { session, flush_interval }
    }
}

impl Actor for Viewer {
    type Context = WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.run_interval(self.flush_interval, |act, ctx| {
            // A closed session drains nothing, so late enrichment output is discarded here
            for frame in act.session.drain() {
                match serde_json::to_string(&*frame) {
                    Ok(text) => ctx.text(text),
                    Err(e) => warn!("Failed to encode {} for viewer {}: {}", frame.kind(), act.session.id(), e),
                }
            }
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.session.close();
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for Viewer {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let id = self.session.id();
        match msg {
            // The push channel is one-way; anything the viewer says is ignored
            Ok(ws::Message::Text(text)) => {
                debug!("Ignoring {} byte text message from viewer {}", text.len(), id);
            }
            Ok(ws::Message::Binary(bin)) => {
                debug!("Ignoring {} byte binary message from viewer {}", bin.len(), id);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("WebSocket closed for {}: {:?}", id, reason);
                self.session.close();
                ctx.close(reason);
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Nop) => {}
            Ok(ws::Message::Continuation(_)) => {
                warn!("Received continuation message for {}: ignoring", id);
            }
            Err(e) => {
                warn!("WebSocket protocol error for {}: {:?}", id, e);
                self.session.close();
                ctx.close(None);
            }
        }
    }
}
