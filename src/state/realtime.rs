use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use log::{debug, warn};
use matchday_api::TeamSide;
use matchday_api::realtime::{Frame, FrameError, RealtimeEvent};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);
/// Cheers kept while disconnected; older ones are dropped first.
const MAX_PENDING: usize = 20;

#[derive(Debug, Clone, Copy)]
pub enum RealtimeCommand {
    Cheer(TeamSide),
}

#[derive(Debug, Clone)]
pub enum RealtimeUpdate {
    Connected,
    Disconnected,
    Event(RealtimeEvent),
    Error(String),
}

/// Owns the WebSocket connection for one fixture: subscribes on every
/// connect, forwards decoded events and sends cheers.
#[derive(Debug)]
pub struct RealtimeWorker {
    pub url: String,
    pub fixture_id: String,
    pub commands: mpsc::Receiver<RealtimeCommand>,
    pub updates: mpsc::Sender<RealtimeUpdate>,
}

impl RealtimeWorker {
    pub async fn run(mut self) {
        let mut pending: VecDeque<RealtimeCommand> = VecDeque::new();
        loop {
            match connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    let (mut write, mut read) = stream.split();

                    if let Err(e) = send_frame(&mut write, &Frame::subscribe(&self.fixture_id)).await {
                        let _ = self.updates.send(RealtimeUpdate::Error(format!("subscribe failed: {e}"))).await;
                        let _ = self.updates.send(RealtimeUpdate::Disconnected).await;
                        sleep(RECONNECT_DELAY).await;
                        continue;
                    }
                    let _ = self.updates.send(RealtimeUpdate::Connected).await;

                    for cmd in pending.drain(..) {
                        if let Err(e) = send_frame(&mut write, &self.frame_for(cmd)).await {
                            let _ = self.updates.send(RealtimeUpdate::Error(format!("send failed: {e}"))).await;
                        }
                    }

                    loop {
                        tokio::select! {
                            maybe_cmd = self.commands.recv() => {
                                let Some(cmd) = maybe_cmd else {
                                    return;
                                };
                                if let Err(e) = send_frame(&mut write, &self.frame_for(cmd)).await {
                                    hold(&mut pending, cmd);
                                    let _ = self.updates.send(RealtimeUpdate::Error(format!("send failed: {e}"))).await;
                                    let _ = self.updates.send(RealtimeUpdate::Disconnected).await;
                                    break;
                                }
                            }
                            inbound = read.next() => {
                                match inbound {
                                    Some(Ok(Message::Text(text))) => {
                                        if let Some(event) = self.decode(&text) {
                                            let _ = self.updates.send(RealtimeUpdate::Event(event)).await;
                                        }
                                    }
                                    Some(Ok(Message::Close(_))) | None => {
                                        let _ = self.updates.send(RealtimeUpdate::Disconnected).await;
                                        break;
                                    }
                                    Some(Ok(_)) => {}
                                    Some(Err(e)) => {
                                        let _ = self.updates.send(RealtimeUpdate::Error(format!("read failed: {e}"))).await;
                                        let _ = self.updates.send(RealtimeUpdate::Disconnected).await;
                                        break;
                                    }
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = self
                        .updates
                        .send(RealtimeUpdate::Error(format!("connect to {} failed: {e}", self.url)))
                        .await;
                    let _ = self.updates.send(RealtimeUpdate::Disconnected).await;
                }
            }

            loop {
                match self.commands.try_recv() {
                    Ok(cmd) => hold(&mut pending, cmd),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => return,
                }
            }
            sleep(RECONNECT_DELAY).await;
        }
    }

    fn frame_for(&self, cmd: RealtimeCommand) -> Frame {
        match cmd {
            RealtimeCommand::Cheer(side) => Frame::cheer(&self.fixture_id, side),
        }
    }

    /// Frames for other fixtures and unknown events are dropped.
    fn decode(&self, text: &str) -> Option<RealtimeEvent> {
        decode_for(&self.fixture_id, text)
    }
}

fn hold(pending: &mut VecDeque<RealtimeCommand>, cmd: RealtimeCommand) {
    if pending.len() == MAX_PENDING {
        pending.pop_front();
    }
    pending.push_back(cmd);
}

fn decode_for(fixture_id: &str, text: &str) -> Option<RealtimeEvent> {
    let frame = match Frame::decode(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("discarding realtime frame: {e}");
            return None;
        }
    };
    if !frame.is_for(fixture_id) {
        return None;
    }
    match frame.into_event() {
        Ok(event) => Some(event),
        Err(FrameError::UnknownEvent(name)) => {
            debug!("ignoring realtime event '{name}'");
            None
        }
        Err(e) => {
            warn!("discarding realtime frame: {e}");
            None
        }
    }
}

async fn send_frame<S>(write: &mut S, frame: &Frame) -> Result<(), String>
where
    S: futures_util::sink::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = frame.encode().map_err(|e| e.to_string())?;
    write
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_events_for_this_fixture_only() {
        let mine = r#"{"event":"minute","fixtureId":"fx-1","data":12}"#;
        let theirs = r#"{"event":"minute","fixtureId":"fx-2","data":80}"#;
        assert_eq!(decode_for("fx-1", mine), Some(RealtimeEvent::Minute(12)));
        assert_eq!(decode_for("fx-1", theirs), None);
    }

    #[test]
    fn pending_cheers_keep_only_the_newest() {
        let mut pending = VecDeque::new();
        hold(&mut pending, RealtimeCommand::Cheer(TeamSide::Away));
        for _ in 0..MAX_PENDING {
            hold(&mut pending, RealtimeCommand::Cheer(TeamSide::Home));
        }
        assert_eq!(pending.len(), MAX_PENDING);
        assert!(pending.iter().all(|c| matches!(c, RealtimeCommand::Cheer(TeamSide::Home))));
    }

    #[test]
    fn drops_unknown_and_malformed_frames() {
        assert_eq!(decode_for("fx-1", r#"{"event":"fireworks","data":1}"#), None);
        assert_eq!(decode_for("fx-1", "not json"), None);
        assert_eq!(decode_for("fx-1", r#"{"event":"score","data":"2-1"}"#), None);
    }
}
