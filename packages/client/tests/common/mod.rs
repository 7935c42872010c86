//! Shared fixtures: bound types, sample documents and a scripted transport

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;
use http::StatusCode;
use xsoap_client::error;
use xsoap_client::prelude::*;

pub const ITEMS_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetItemsResponse>
      <count>2</count>
      <item><id>1</id><name>a</name></item>
      <note>between</note>
      <item><id>2</id><name>b</name></item>
    </GetItemsResponse>
  </soap:Body>
</soap:Envelope>"#;

pub const FAULT_RESPONSE: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
      <faultstring>Item store unavailable</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: i32,
    pub name: String,
}

impl XmlObject for Item {
    fn declare(decl: &mut Declaration<Self>) {
        decl.root("//Envelope/Body/GetItemsResponse/item")
            .constructor(Self::default)
            .text("id", "id", |item: &mut Self, v: i32| item.id = v)
            .text("name", "name", |item: &mut Self, v: String| item.name = v);
    }
}

pub fn url() -> Url {
    Url::parse("http://soap.test/items").expect("static test URL parses")
}

pub fn envelope() -> RawEnvelope {
    RawEnvelope::wrap_body(SoapVersion::Soap11, "<GetItems/>")
}

enum Reply {
    Respond(StatusCode, String),
    Fail(String),
}

/// Transport answering every call with the same canned reply
pub struct ScriptedTransport {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
    last_action: Mutex<Option<String>>,
}

impl ScriptedTransport {
    pub fn respond(status: u16, body: &str) -> Arc<Self> {
        let status = StatusCode::from_u16(status).expect("valid status code");
        Arc::new(Self::with_reply(Reply::Respond(status, body.to_string()), Duration::ZERO))
    }

    pub fn respond_after(status: u16, body: &str, delay: Duration) -> Arc<Self> {
        let status = StatusCode::from_u16(status).expect("valid status code");
        Arc::new(Self::with_reply(Reply::Respond(status, body.to_string()), delay))
    }

    pub fn fail(message: &str) -> Arc<Self> {
        Arc::new(Self::with_reply(Reply::Fail(message.to_string()), Duration::ZERO))
    }

    fn with_reply(reply: Reply, delay: Duration) -> Self {
        Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            last_action: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_action(&self) -> Option<String> {
        self.last_action.lock().expect("action lock").clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, message: OutboundMessage) -> BoxFuture<'_, Result<TransportResponse>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let action = message
            .headers
            .get("soapaction")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        *self.last_action.lock().expect("action lock") = action;

        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Reply::Respond(status, body) => Ok(TransportResponse::new(*status, body.clone())),
                Reply::Fail(message) => Err(error::transport(message.clone())),
            }
        })
    }
}

pub fn client(transport: Arc<ScriptedTransport>) -> SoapClient {
    SoapClient::with_transport(SoapConfig::default(), transport).expect("default config is valid")
}

/// Observer recording every notification it receives
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("recorder lock").clone()
    }

    fn push(&self, event: String) {
        self.events.lock().expect("recorder lock").push(event);
    }
}

impl ItemObserver<Item> for Recorder {
    fn on_new_item(&self, item: &Item) {
        self.push(format!("item {} {}", item.id, item.name));
    }
}

impl<T, F> SoapObserver<T, F> for Recorder {
    fn on_completion(&self, _result: &T) {
        self.push("completed".to_string());
    }

    fn on_fault(&self, _fault: &F) {
        self.push("fault".to_string());
    }

    fn on_error(&self, _error: &Error) {
        self.push("error".to_string());
    }

    fn on_cancelled(&self) {
        self.push("cancelled".to_string());
    }
}
