use futures_util::{SinkExt, StreamExt};
use matchday_api::realtime::{CheerPayload, EVENT_CHEER, EVENT_SUBSCRIBE, Frame};
use matchday_api::{CheerMeter, TeamSide};
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// A frame on its way out, tagged with the fixture it belongs to.
#[derive(Debug, Clone)]
struct Outbound {
    fixture_id: Option<String>,
    text: String,
}

/// Running cheer counts per fixture.
#[derive(Debug, Default)]
struct CheerTally {
    meters: HashMap<String, CheerMeter>,
}

impl CheerTally {
    fn record(&mut self, fixture_id: &str, side: TeamSide) -> CheerMeter {
        let meter = self.meters.entry(fixture_id.to_string()).or_default();
        match side {
            TeamSide::Home => meter.home = meter.home.saturating_add(1),
            TeamSide::Away => meter.away = meter.away.saturating_add(1),
        }
        *meter
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = env::var("MATCHDAY_RELAY_BIND").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    let listener = TcpListener::bind(&addr).await?;
    let (tx, _rx) = broadcast::channel::<Outbound>(512);
    let tally = Arc::new(Mutex::new(CheerTally::default()));

    eprintln!("live relay listening on {addr}");

    loop {
        let (stream, peer) = listener.accept().await?;
        let tx = tx.clone();
        let rx = tx.subscribe();
        let tally = tally.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, tx, rx, tally).await {
                eprintln!("client {peer} disconnected: {e}");
            }
        });
    }
}

async fn handle_client(
    stream: TcpStream,
    tx: broadcast::Sender<Outbound>,
    mut rx: broadcast::Receiver<Outbound>,
    tally: Arc<Mutex<CheerTally>>,
) -> anyhow::Result<()> {
    let ws = accept_async(stream).await?;
    let (mut write, mut read) = ws.split();
    let mut subscribed: Option<String> = None;

    loop {
        tokio::select! {
            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(frame) = Frame::decode(&text) else {
                            continue;
                        };
                        match route(frame, &tally) {
                            Route::Subscribe(fixture_id) => subscribed = Some(fixture_id),
                            Route::Publish(outbound) => {
                                let _ = tx.send(outbound);
                            }
                            Route::Drop => {}
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Ok(out) if delivers_to(&out, subscribed.as_deref()) => {
                        write.send(Message::Text(out.text.into())).await?;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}

#[derive(Debug)]
enum Route {
    Subscribe(String),
    Publish(Outbound),
    Drop,
}

/// Subscriptions are remembered per client, cheers become an updated
/// `cheerMeter` event, and everything else is fanned out unchanged.
fn route(frame: Frame, tally: &Mutex<CheerTally>) -> Route {
    match frame.event.as_str() {
        EVENT_SUBSCRIBE => match frame.fixture_id {
            Some(fixture_id) => Route::Subscribe(fixture_id),
            None => Route::Drop,
        },
        EVENT_CHEER => {
            let (Some(fixture_id), Ok(cheer)) = (
                frame.fixture_id,
                serde_json::from_value::<CheerPayload>(frame.data),
            ) else {
                return Route::Drop;
            };
            let meter = match tally.lock() {
                Ok(mut tally) => tally.record(&fixture_id, cheer.side),
                Err(_) => return Route::Drop,
            };
            match Frame::cheer_meter(&fixture_id, meter).encode() {
                Ok(text) => Route::Publish(Outbound { fixture_id: Some(fixture_id), text }),
                Err(_) => Route::Drop,
            }
        }
        _ => match frame.encode() {
            Ok(text) => Route::Publish(Outbound { fixture_id: frame.fixture_id, text }),
            Err(_) => Route::Drop,
        },
    }
}

fn delivers_to(out: &Outbound, subscribed: Option<&str>) -> bool {
    match (&out.fixture_id, subscribed) {
        (None, _) => true,
        (Some(fixture), Some(sub)) => fixture == sub,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_api::realtime::RealtimeEvent;

    #[test]
    fn cheers_accumulate_per_fixture() {
        let tally = Mutex::new(CheerTally::default());
        for side in [TeamSide::Home, TeamSide::Home, TeamSide::Away] {
            route(Frame::cheer("fx-1", side), &tally);
        }
        let Route::Publish(out) = route(Frame::cheer("fx-2", TeamSide::Away), &tally) else {
            panic!("cheer should publish a meter update");
        };
        assert_eq!(out.fixture_id.as_deref(), Some("fx-2"));

        let meters = &tally.lock().unwrap().meters;
        assert_eq!(meters["fx-1"], CheerMeter { home: 2, away: 1 });
        assert_eq!(meters["fx-2"], CheerMeter { home: 0, away: 1 });
    }

    #[test]
    fn cheer_becomes_a_cheer_meter_event() {
        let tally = Mutex::new(CheerTally::default());
        let Route::Publish(out) = route(Frame::cheer("fx-1", TeamSide::Home), &tally) else {
            panic!("cheer should publish a meter update");
        };
        let event = Frame::decode(&out.text).unwrap().into_event().unwrap();
        assert_eq!(event, RealtimeEvent::CheerMeter(CheerMeter { home: 1, away: 0 }));
    }

    #[test]
    fn subscribe_is_not_forwarded() {
        let tally = Mutex::new(CheerTally::default());
        assert!(matches!(route(Frame::subscribe("fx-1"), &tally), Route::Subscribe(id) if id == "fx-1"));
    }

    #[test]
    fn delivery_follows_subscription() {
        let out = Outbound { fixture_id: Some("fx-1".into()), text: String::new() };
        assert!(delivers_to(&out, Some("fx-1")));
        assert!(!delivers_to(&out, Some("fx-2")));
        assert!(!delivers_to(&out, None));
        let broadcast = Outbound { fixture_id: None, text: String::new() };
        assert!(delivers_to(&broadcast, None));
    }
}
