//! Client for the shared real-time state service.
//!
//! The service holds named records (field → value maps) and pushes every
//! field write to subscribed clients. This crate owns the connection
//! lifecycle (connect → authenticate → ready) and exposes the capability
//! traits the controller core is written against: a [`SyncChannel`] handing
//! out [`SharedRecord`]s. A [`SyncClient`] value only exists once login has
//! succeeded, so holding one is the typed "ready" capability.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use shared::protocol::{ClientMessage, ServerMessage};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::Message};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid sync server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to connect to sync server {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("login denied by sync server: {reason}")]
    LoginDenied { reason: String },
    #[error("connection lost during login handshake")]
    HandshakeClosed,
    #[error("transport failure during login handshake: {0}")]
    Handshake(#[source] tungstenite::Error),
}

/// Access to the shared-state service, handed to components after a
/// successful login. No component reaches the service any other way.
#[async_trait]
pub trait SyncChannel: Send + Sync {
    /// Attach to a named record, subscribing to its changes on first use.
    /// Records are created by the service; attaching never creates one.
    async fn record(&self, name: &str) -> Arc<dyn SharedRecord>;
}

/// A remotely synchronized field → value mapping. Writes are fire-and-forget;
/// reads come from the locally mirrored copy.
#[async_trait]
pub trait SharedRecord: Send + Sync {
    /// Resolves once the initial snapshot has been applied. Returns
    /// immediately if the record is already loaded.
    async fn when_ready(&self);

    /// Read a field from the local mirror. Absent fields are `None`, never an
    /// error.
    async fn get(&self, field: &str) -> Option<Value>;

    /// Whole-object write.
    async fn set(&self, data: Map<String, Value>);

    /// Single-field write.
    async fn set_field(&self, field: &str, value: Value);

    /// Observe a field. Every value written to it, locally or remotely, is
    /// delivered with no change-discrimination or de-duplication. With
    /// `deliver_immediately` the current value (absent → `Null`) is delivered
    /// once at subscribe time.
    async fn subscribe(
        &self,
        field: &str,
        deliver_immediately: bool,
    ) -> mpsc::UnboundedReceiver<Value>;
}

#[derive(Default)]
struct RecordSlot {
    data: Map<String, Value>,
    ready: bool,
    subscribed: bool,
    ready_waiters: Vec<oneshot::Sender<()>>,
    field_subscribers: HashMap<String, Vec<mpsc::UnboundedSender<Value>>>,
}

impl RecordSlot {
    fn notify(&mut self, field: &str, value: &Value) {
        if let Some(subscribers) = self.field_subscribers.get_mut(field) {
            subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        }
    }

    fn mark_ready(&mut self) {
        self.ready = true;
        for waiter in self.ready_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}

type RecordTable = Arc<Mutex<HashMap<String, RecordSlot>>>;

/// Connection to the shared-state service after a successful login. Held for
/// the lifetime of the session; there is no teardown path. Reconnection is
/// the transport's concern, below this client's visibility.
pub struct SyncClient {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    records: RecordTable,
}

impl SyncClient {
    /// Dial the service and run the login handshake. The returned client is
    /// only constructed after the server acknowledged the login; a denied
    /// login or a transport failure during the handshake is fatal and no
    /// client value exists.
    pub async fn connect(
        url: &str,
        auth: Map<String, Value>,
    ) -> Result<Arc<SyncClient>, SyncError> {
        let parsed = url::Url::parse(url).map_err(|err| SyncError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
            return Err(SyncError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        info!(%url, "connecting to sync server");
        let (ws_stream, _) =
            connect_async(parsed.as_str())
                .await
                .map_err(|source| SyncError::Connect {
                    url: url.to_string(),
                    source,
                })?;
        let (mut sink, mut stream) = ws_stream.split();

        info!("authenticating with sync server");
        let login = serialize_frame(&ClientMessage::Login { auth });
        sink.send(Message::Text(login))
            .await
            .map_err(SyncError::Handshake)?;

        loop {
            let frame = match stream.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(err)) => return Err(SyncError::Handshake(err)),
                None => return Err(SyncError::HandshakeClosed),
            };
            let text = match frame {
                Message::Text(text) => text,
                Message::Close(_) => return Err(SyncError::HandshakeClosed),
                _ => continue,
            };
            match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::LoginOk) => break,
                Ok(ServerMessage::LoginDenied { reason }) => {
                    return Err(SyncError::LoginDenied { reason });
                }
                Ok(other) => {
                    warn!(?other, "unexpected frame during login handshake");
                }
                Err(err) => {
                    warn!("ignoring malformed handshake frame: {err}");
                }
            }
        }
        info!("sync server login acknowledged, connection ready");

        let records: RecordTable = Arc::new(Mutex::new(HashMap::new()));
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let text = serialize_frame(&message);
                if let Err(err) = sink.send(Message::Text(text)).await {
                    warn!("sync write failed, stopping writer: {err}");
                    break;
                }
            }
        });

        let reader_records = Arc::clone(&records);
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(message) => apply_server_message(&reader_records, message).await,
                            Err(err) => warn!("ignoring malformed server frame: {err}"),
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("sync server closed the connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!("sync read failed, stopping reader: {err}");
                        break;
                    }
                }
            }
        });

        Ok(Arc::new(SyncClient { outbound, records }))
    }

    fn send(&self, message: ClientMessage) {
        // Fire-and-forget by design; a closed channel means the connection is
        // gone and the session is over anyway.
        if self.outbound.send(message).is_err() {
            warn!("sync connection is gone, dropping outbound message");
        }
    }
}

fn serialize_frame(message: &ClientMessage) -> String {
    // The protocol enums only carry JSON-representable data.
    serde_json::to_string(message).unwrap_or_default()
}

async fn apply_server_message(records: &RecordTable, message: ServerMessage) {
    match message {
        ServerMessage::RecordData { record, data } => {
            let mut table = records.lock().await;
            let slot = table.entry(record).or_default();
            let fields: Vec<(String, Value)> =
                data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            slot.data = data;
            slot.mark_ready();
            for (field, value) in fields {
                slot.notify(&field, &value);
            }
        }
        ServerMessage::RecordPatch {
            record,
            field,
            value,
        } => {
            let mut table = records.lock().await;
            let slot = table.entry(record).or_default();
            slot.data.insert(field.clone(), value.clone());
            slot.notify(&field, &value);
        }
        ServerMessage::Error(err) => {
            warn!("sync server reported: {err}");
        }
        ServerMessage::LoginOk | ServerMessage::LoginDenied { .. } => {
            warn!("unexpected login frame after handshake");
        }
    }
}

#[async_trait]
impl SyncChannel for SyncClient {
    async fn record(&self, name: &str) -> Arc<dyn SharedRecord> {
        {
            let mut table = self.records.lock().await;
            let slot = table.entry(name.to_string()).or_default();
            if !slot.subscribed {
                slot.subscribed = true;
                self.send(ClientMessage::RecordSubscribe {
                    record: name.to_string(),
                });
            }
        }
        Arc::new(WsRecord {
            name: name.to_string(),
            outbound: self.outbound.clone(),
            records: Arc::clone(&self.records),
        })
    }
}

struct WsRecord {
    name: String,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    records: RecordTable,
}

impl WsRecord {
    fn send(&self, message: ClientMessage) {
        if self.outbound.send(message).is_err() {
            warn!(record = %self.name, "sync connection is gone, dropping write");
        }
    }
}

#[async_trait]
impl SharedRecord for WsRecord {
    async fn when_ready(&self) {
        let waiter = {
            let mut table = self.records.lock().await;
            let slot = table.entry(self.name.clone()).or_default();
            if slot.ready {
                return;
            }
            let (tx, rx) = oneshot::channel();
            slot.ready_waiters.push(tx);
            rx
        };
        let _ = waiter.await;
    }

    async fn get(&self, field: &str) -> Option<Value> {
        let table = self.records.lock().await;
        table.get(&self.name).and_then(|slot| slot.data.get(field).cloned())
    }

    async fn set(&self, data: Map<String, Value>) {
        {
            let mut table = self.records.lock().await;
            let slot = table.entry(self.name.clone()).or_default();
            let fields: Vec<(String, Value)> =
                data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            slot.data = data.clone();
            for (field, value) in fields {
                slot.notify(&field, &value);
            }
        }
        self.send(ClientMessage::RecordSet {
            record: self.name.clone(),
            data,
        });
    }

    async fn set_field(&self, field: &str, value: Value) {
        {
            let mut table = self.records.lock().await;
            let slot = table.entry(self.name.clone()).or_default();
            slot.data.insert(field.to_string(), value.clone());
            slot.notify(field, &value);
        }
        self.send(ClientMessage::RecordPatch {
            record: self.name.clone(),
            field: field.to_string(),
            value,
        });
    }

    async fn subscribe(
        &self,
        field: &str,
        deliver_immediately: bool,
    ) -> mpsc::UnboundedReceiver<Value> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut table = self.records.lock().await;
        let slot = table.entry(self.name.clone()).or_default();
        if deliver_immediately {
            let current = slot.data.get(field).cloned().unwrap_or(Value::Null);
            let _ = tx.send(current);
        }
        slot.field_subscribers
            .entry(field.to_string())
            .or_default()
            .push(tx);
        rx
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
