//! Relay-backed transport.
//!
//! Each channel is one WebSocket to the relay's `rooms/<key>` endpoint. A
//! driver task owns the socket, multiplexing outbound publish frames and the
//! inbound value stream; everything the channel hands out is a plain queue,
//! so teardown is just cancelling the driver.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use drop_wire::{ClientFrame, ServerFrame, room_path};

use crate::error::TransportError;
use crate::payload::Payload;
use crate::room::RoomKey;

use super::{Channel, Subscription, Transport};

#[derive(Clone)]
pub struct RelayTransport {
    base_url: String,
}

impl RelayTransport {
    /// `base_url` is the relay root, e.g. `ws://127.0.0.1:4455`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn room_url(&self, key: &RoomKey) -> String {
        format!("{}/{}", self.base_url, room_path(key.as_str()))
    }
}

impl Transport for RelayTransport {
    type Channel = RelayChannel;

    async fn open(&self, key: &RoomKey) -> Result<RelayChannel, TransportError> {
        let url = self.room_url(key);
        let (socket, _) =
            connect_async(url.as_str())
                .await
                .map_err(|source| TransportError::Connect {
                    url: url.clone(),
                    source,
                })?;
        debug!(room = %key, %url, "room channel connected");
        Ok(RelayChannel::start(socket))
    }
}

pub struct RelayChannel {
    outbound: mpsc::Sender<ClientFrame>,
    /// Consumed by `subscribe`.
    inbound: Option<mpsc::Receiver<Payload>>,
    cancel: CancellationToken,
}

impl RelayChannel {
    fn start(
        socket: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    ) -> Self {
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<ClientFrame>(16);
        let (inbound_tx, inbound_rx) = mpsc::channel::<Payload>(16);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let (mut sink, mut stream) = socket.split();
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }

                    frame = outbound_rx.recv() => match frame {
                        Some(frame) => {
                            let json = match serde_json::to_string(&frame) {
                                Ok(json) => json,
                                Err(e) => {
                                    warn!("failed to encode frame: {}", e);
                                    continue;
                                }
                            };
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },

                    msg = stream.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ServerFrame>(text.as_str()) {
                                Ok(ServerFrame::Value { src: Some(src) }) => {
                                    match Payload::parse(&src) {
                                        Some(payload) => {
                                            if inbound_tx.send(payload).await.is_err() {
                                                break;
                                            }
                                        }
                                        None => warn!("discarding malformed room value"),
                                    }
                                }
                                // Empty slot on first connect: nothing to deliver.
                                Ok(ServerFrame::Value { src: None }) => {}
                                Ok(ServerFrame::Error { message }) => {
                                    warn!("relay rejected a frame: {}", message);
                                }
                                Err(e) => warn!("unparseable relay frame: {}", e),
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            debug!("room socket error: {}", e);
                            break;
                        }
                    },
                }
            }
        });

        Self {
            outbound: outbound_tx,
            inbound: Some(inbound_rx),
            cancel,
        }
    }
}

impl Channel for RelayChannel {
    async fn publish(&self, payload: &Payload) -> Result<(), TransportError> {
        self.outbound
            .send(ClientFrame::Publish {
                src: payload.as_str().to_string(),
            })
            .await
            .map_err(|_| TransportError::Closed)
    }

    fn subscribe(&mut self) -> Result<Subscription, TransportError> {
        let rx = self.inbound.take().ok_or(TransportError::AlreadySubscribed)?;
        Ok(Subscription::new(rx, self.cancel.child_token()))
    }
}

impl Drop for RelayChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
