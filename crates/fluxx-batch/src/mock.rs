//! In-process `RecordApi` sessions for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::api::{Connector, RecordApi, RemoteError};
use crate::error::{Error, ErrorKind, Result};
use crate::operation::{Record, RecordId};

/// A call seen by a mock session.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: &'static str,
    pub model: String,
    pub id: Option<RecordId>,
    pub payload: Option<Record>,
}

pub(crate) enum Reply {
    Ok(Value),
    Err(RemoteError),
    /// Answer after a delay, to shuffle completion order.
    Delayed(Duration, Value),
    Panic(&'static str),
}

type Responder = dyn Fn(&Call) -> Reply + Send + Sync;

/// Session whose replies come from a closure. Clones share the call counter.
#[derive(Clone)]
pub(crate) struct MockApi {
    respond: Arc<Responder>,
    calls: Arc<AtomicUsize>,
}

impl MockApi {
    pub fn new(respond: impl Fn(&Call) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            respond: Arc::new(respond),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn reply(&self, call: Call) -> std::result::Result<Value, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (self.respond)(&call) {
            Reply::Ok(value) => Ok(value),
            Reply::Err(err) => Err(err),
            Reply::Delayed(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Reply::Panic(message) => panic!("{}", message),
        }
    }
}

impl RecordApi for MockApi {
    async fn create(&self, model: &str, payload: &Record) -> std::result::Result<Value, RemoteError> {
        self.reply(Call {
            method: "create",
            model: model.to_string(),
            id: None,
            payload: Some(payload.clone()),
        })
        .await
    }

    async fn update(
        &self,
        model: &str,
        id: &RecordId,
        payload: &Record,
    ) -> std::result::Result<Value, RemoteError> {
        self.reply(Call {
            method: "update",
            model: model.to_string(),
            id: Some(id.clone()),
            payload: Some(payload.clone()),
        })
        .await
    }

    async fn delete(&self, model: &str, id: &RecordId) -> std::result::Result<(), RemoteError> {
        self.reply(Call {
            method: "delete",
            model: model.to_string(),
            id: Some(id.clone()),
            payload: None,
        })
        .await
        .map(|_| ())
    }
}

/// Hands out clones of one mock session and counts connections.
pub(crate) struct MockConnector {
    api: MockApi,
    connections: Arc<AtomicUsize>,
    fail: bool,
}

impl MockConnector {
    pub fn new(api: MockApi) -> Self {
        Self {
            api,
            connections: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(MockApi::new(|_| Reply::Ok(Value::Null)))
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    type Session = MockApi;

    async fn connect(&self) -> Result<MockApi> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::new(ErrorKind::Connect(
                "invalid client credentials".to_string(),
            )));
        }
        Ok(self.api.clone())
    }
}
