//! Background unit of one execution
//!
//! The job renders the envelope, performs the round-trip, classifies the
//! response and publishes item and terminal events. It checks the shared
//! cancel flag before the transport call and before acting on its result,
//! and publishes nothing once cancellation has been observed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use super::outcome::{Capture, Outcome};
use crate::config::SoapConfig;
use crate::error::{self, Error};
use crate::parser::{Parser, ResponseParser, XmlObject};
use crate::soap::Envelope;
use crate::transport::{OutboundMessage, Transport, TransportResponse};

pub(crate) enum TaskEvent<I, T, F> {
    Item(I),
    Terminal { outcome: Outcome<T, F>, capture: Capture },
}

pub(crate) type EventSender<P, F> =
    UnboundedSender<TaskEvent<<P as ResponseParser>::Item, <P as ResponseParser>::Output, F>>;

pub(crate) struct Job<P: ResponseParser, F: XmlObject> {
    pub(crate) url: Url,
    pub(crate) envelope: Arc<dyn Envelope>,
    pub(crate) action: Option<String>,
    pub(crate) parser: Arc<P>,
    pub(crate) fault_parser: Arc<Parser<F>>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) config: Arc<SoapConfig>,
    pub(crate) debug_capture: bool,
    pub(crate) cancelled: Arc<AtomicBool>,
}

impl<P: ResponseParser, F: XmlObject> Job<P, F> {
    pub(crate) async fn run(self, events: EventSender<P, F>) {
        let mut capture = Capture::default();

        let Some(outcome) = self.perform(&events, &mut capture).await else {
            tracing::debug!(
                target: "xsoap::request",
                url = %self.url,
                "Cancellation observed, discarding work"
            );
            return;
        };

        if let Outcome::Errored(ref err) = outcome {
            tracing::warn!(
                target: "xsoap::request",
                url = %self.url,
                error = %err,
                "Request errored"
            );
        }

        // The receiver is gone if the handle was cancelled or dropped meanwhile
        let _ = events.send(TaskEvent::Terminal { outcome, capture });
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn perform(
        &self,
        events: &EventSender<P, F>,
        capture: &mut Capture,
    ) -> Option<Outcome<P::Output, F>> {
        if self.is_cancelled() {
            return None;
        }

        let xml = self.envelope.to_xml();
        if self.debug_capture {
            capture.request_xml = Some(xml.clone());
        }

        let message = match OutboundMessage::new(
            self.url.clone(),
            xml,
            self.envelope.version(),
            self.action.as_deref(),
        ) {
            Ok(message) => message,
            Err(err) => return Some(Outcome::Errored(err.with_url(self.url.clone()))),
        };

        if self.is_cancelled() {
            return None;
        }
        let response = self.transport.send(message).await;
        if self.is_cancelled() {
            return None;
        }

        let response = match response {
            Ok(response) => response,
            Err(err) => return Some(Outcome::Errored(self.wrap_transport(err))),
        };

        if self.debug_capture {
            capture.response_xml = Some(String::from_utf8_lossy(&response.body).into_owned());
        }

        Some(self.classify(&response, events))
    }

    fn classify(
        &self,
        response: &TransportResponse,
        events: &EventSender<P, F>,
    ) -> Outcome<P::Output, F> {
        let status = response.status;
        tracing::debug!(
            target: "xsoap::request",
            url = %self.url,
            status = status.as_u16(),
            "Classifying response"
        );

        if self.config.is_fault_status(status) {
            return self.parse_fault(response).unwrap_or_else(|err| {
                Outcome::Errored(error::status_code(self.url.clone(), status).with(err))
            });
        }

        if !status.is_success() {
            return Outcome::Errored(error::status_code(self.url.clone(), status));
        }

        if self.fault_parser.matches_document(&response.body) {
            return self
                .parse_fault(response)
                .unwrap_or_else(|err| Outcome::Errored(err.with_url(self.url.clone())));
        }

        let mut body = &response.body[..];
        let parsed = self.parser.parse_body(&mut body, &mut |item| {
            // A closed channel means the handle stopped listening
            let _ = events.send(TaskEvent::Item(item));
        });

        match parsed {
            Ok(output) => Outcome::Completed(output),
            Err(err) => Outcome::Errored(err.with_url(self.url.clone())),
        }
    }

    fn parse_fault(&self, response: &TransportResponse) -> Result<Outcome<P::Output, F>, Error> {
        let mut body = &response.body[..];
        self.fault_parser.parse(&mut body).map(Outcome::Faulted)
    }

    fn wrap_transport(&self, err: Error) -> Error {
        if err.url().is_some() {
            err
        } else {
            err.with_url(self.url.clone())
        }
    }
}
