//! Cancellable, observable request execution
//!
//! A [`Request`] runs one transport round-trip plus materialization on a
//! tokio task. The task publishes item and terminal events on a channel;
//! the handle drains them on the caller's side, so every observer runs in the
//! caller's context, items strictly before the single terminal notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};
use tokio::task::JoinHandle;
use url::Url;

use crate::config::SoapConfig;
use crate::error::{self, Result};
use crate::parser::{ItemObserver, ListParser, Parser, ResponseParser, XmlObject};
use crate::soap::{Envelope, Soap11Fault};
use crate::transport::Transport;

pub mod observer;
pub mod outcome;
mod task;

pub use observer::SoapObserver;
pub use outcome::{Capture, Outcome, RequestState};

use task::{Job, TaskEvent};

/// Request materializing a single `T`
pub type ObjectRequest<T, F = Soap11Fault> = Request<Parser<T>, F>;

/// Request materializing a list of `T`, announcing each item as it is parsed
pub type ListRequest<T, F = Soap11Fault> = Request<ListParser<T>, F>;

type Events<P, F> =
    UnboundedReceiver<TaskEvent<<P as ResponseParser>::Item, <P as ResponseParser>::Output, F>>;

struct Delivery<T, I, F> {
    state: RequestState,
    outcome: Option<Outcome<T, F>>,
    capture: Option<Capture>,
    observers: Vec<Arc<dyn SoapObserver<T, F>>>,
    item_observers: Vec<Arc<dyn ItemObserver<I>>>,
}

impl<T, I, F> Delivery<T, I, F> {
    fn new() -> Self {
        Self {
            state: RequestState::Idle,
            outcome: None,
            capture: None,
            observers: Vec::new(),
            item_observers: Vec::new(),
        }
    }

    fn start(&mut self) {
        self.state = RequestState::Running;
        self.outcome = None;
        self.capture = None;
    }

    /// Returns true when the event was terminal
    fn handle(&mut self, event: TaskEvent<I, T, F>) -> bool {
        match event {
            TaskEvent::Item(item) => {
                for observer in &self.item_observers {
                    observer.on_new_item(&item);
                }
                false
            }
            TaskEvent::Terminal { outcome, capture } => {
                self.finish(outcome, Some(capture));
                true
            }
        }
    }

    fn finish(&mut self, outcome: Outcome<T, F>, capture: Option<Capture>) {
        self.state = outcome.state();
        tracing::debug!(
            target: "xsoap::request",
            state = ?self.state,
            "Request reached terminal state"
        );

        for observer in &self.observers {
            match &outcome {
                Outcome::Completed(value) => observer.on_completion(value),
                Outcome::Faulted(fault) => observer.on_fault(fault),
                Outcome::Errored(err) => observer.on_error(err),
                Outcome::Cancelled => observer.on_cancelled(),
            }
        }

        self.outcome = Some(outcome);
        self.capture = capture;
    }
}

/// Handle for one SOAP call
///
/// `P` materializes the success body, `F` is the declared fault shape.
pub struct Request<P: ResponseParser, F: XmlObject = Soap11Fault> {
    url: Url,
    envelope: Arc<dyn Envelope>,
    action: Option<String>,
    parser: Arc<P>,
    fault_parser: Arc<Parser<F>>,
    transport: Arc<dyn Transport>,
    config: Arc<SoapConfig>,
    debug_capture: bool,
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    events: Option<Events<P, F>>,
    delivery: Delivery<P::Output, P::Item, F>,
}

impl<P: ResponseParser, F: XmlObject> Request<P, F> {
    #[must_use]
    pub fn new(
        url: Url,
        envelope: Arc<dyn Envelope>,
        parser: Arc<P>,
        fault_parser: Arc<Parser<F>>,
        transport: Arc<dyn Transport>,
        config: Arc<SoapConfig>,
    ) -> Self {
        let debug_capture = config.debug_capture;
        Self {
            url,
            envelope,
            action: None,
            parser,
            fault_parser,
            transport,
            config,
            debug_capture,
            cancelled: Arc::new(AtomicBool::new(false)),
            task: None,
            events: None,
            delivery: Delivery::new(),
        }
    }

    /// Set the SOAP action sent with the envelope
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the action cannot be sent as a header.
    pub fn with_action(mut self, action: impl Into<String>) -> Result<Self> {
        let action = action.into();
        let version = self.envelope.version();
        let rendered = version
            .soap_action_header(Some(&action))
            .unwrap_or_else(|| version.content_type(Some(&action)));
        http::HeaderValue::from_str(&rendered).map_err(error::configuration)?;
        self.action = Some(action);
        Ok(self)
    }

    /// Retain outbound and inbound XML for inspection after completion
    #[must_use]
    pub fn with_debug_capture(mut self, enabled: bool) -> Self {
        self.debug_capture = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.delivery.state
    }

    /// Terminal outcome, once delivered
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome<P::Output, F>> {
        self.delivery.outcome.as_ref()
    }

    /// Take the terminal outcome, leaving the handle without one
    pub fn take_outcome(&mut self) -> Option<Outcome<P::Output, F>> {
        self.delivery.outcome.take()
    }

    /// Outbound XML of the last finished execution, with debug capture on
    #[must_use]
    pub fn request_xml(&self) -> Option<&str> {
        self.delivery.capture.as_ref()?.request_xml.as_deref()
    }

    /// Response text of the last finished execution, with debug capture on
    #[must_use]
    pub fn response_xml(&self) -> Option<&str> {
        self.delivery.capture.as_ref()?.response_xml.as_deref()
    }

    pub fn register_observer(&mut self, observer: Arc<dyn SoapObserver<P::Output, F>>) {
        self.delivery.observers.push(observer);
    }

    /// Returns whether `observer` was registered
    pub fn deregister_observer(&mut self, observer: &Arc<dyn SoapObserver<P::Output, F>>) -> bool {
        let before = self.delivery.observers.len();
        self.delivery
            .observers
            .retain(|registered| !Arc::ptr_eq(registered, observer));
        self.delivery.observers.len() != before
    }

    pub fn register_item_observer(&mut self, observer: Arc<dyn ItemObserver<P::Item>>) {
        self.delivery.item_observers.push(observer);
    }

    /// Returns whether `observer` was registered
    pub fn deregister_item_observer(&mut self, observer: &Arc<dyn ItemObserver<P::Item>>) -> bool {
        let before = self.delivery.item_observers.len();
        self.delivery
            .item_observers
            .retain(|registered| !Arc::ptr_eq(registered, observer));
        self.delivery.item_observers.len() != before
    }

    /// Start the background round-trip and return immediately
    ///
    /// A handle in a terminal state starts a fresh round.
    ///
    /// # Errors
    ///
    /// Returns a usage error while a previous execution is still running or
    /// when called outside a tokio runtime.
    pub fn execute(&mut self) -> Result<()> {
        if self.delivery.state == RequestState::Running {
            return Err(error::usage("request is already running"));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(error::usage)?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::unbounded_channel();
        let job = Job {
            url: self.url.clone(),
            envelope: Arc::clone(&self.envelope),
            action: self.action.clone(),
            parser: Arc::clone(&self.parser),
            fault_parser: Arc::clone(&self.fault_parser),
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            debug_capture: self.debug_capture,
            cancelled: Arc::clone(&cancelled),
        };

        tracing::debug!(
            target: "xsoap::request",
            url = %self.url,
            action = self.action.as_deref().unwrap_or(""),
            "Executing request"
        );

        self.delivery.start();
        self.cancelled = cancelled;
        self.events = Some(receiver);
        self.task = Some(runtime.spawn(job.run(sender)));
        Ok(())
    }

    /// Deliver every event already published, without waiting
    ///
    /// Returns the number of events delivered.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(receiver) = self.events.as_mut() {
            match receiver.try_recv() {
                Ok(event) => {
                    delivered += 1;
                    if self.delivery.handle(event) {
                        self.release_task();
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.lose_task(),
            }
        }
        delivered
    }

    /// Deliver events until the terminal one
    ///
    /// # Errors
    ///
    /// Returns a usage error if the request was never executed.
    pub async fn wait(&mut self) -> Result<&Outcome<P::Output, F>> {
        while !self.delivery.state.is_terminal() {
            let Some(receiver) = self.events.as_mut() else {
                return Err(error::usage("request has not been executed"));
            };
            match receiver.recv().await {
                Some(event) => {
                    if self.delivery.handle(event) {
                        self.release_task();
                    }
                }
                None => self.lose_task(),
            }
        }

        self.delivery
            .outcome
            .as_ref()
            .ok_or_else(|| error::usage("request outcome was already taken"))
    }

    /// [`Request::wait`] bounded by `timeout`
    ///
    /// Running out of time leaves the request running.
    ///
    /// # Errors
    ///
    /// Returns a timeout error when `timeout` elapses first, or any error of
    /// [`Request::wait`].
    pub async fn get(&mut self, timeout: Duration) -> Result<&Outcome<P::Output, F>> {
        let url = self.url.clone();
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(outcome) => outcome,
            Err(elapsed) => Err(error::timeout(elapsed).with_url(url)),
        }
    }

    /// [`Request::get`] with the configured default bound
    ///
    /// # Errors
    ///
    /// See [`Request::get`].
    pub async fn get_default(&mut self) -> Result<&Outcome<P::Output, F>> {
        let timeout = self.config.get_timeout;
        self.get(timeout).await
    }

    /// Stop the running execution and report `Cancelled`
    ///
    /// Undelivered events are discarded. Does nothing unless running.
    pub fn cancel(&mut self) {
        if self.delivery.state != RequestState::Running {
            return;
        }

        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events = None;

        tracing::debug!(target: "xsoap::request", url = %self.url, "Request cancelled");
        self.delivery.finish(Outcome::Cancelled, None);
    }

    fn release_task(&mut self) {
        self.events = None;
        self.task = None;
    }

    fn lose_task(&mut self) {
        self.release_task();
        self.delivery.finish(
            Outcome::Errored(
                error::transport("request task ended without an outcome")
                    .with_url(self.url.clone()),
            ),
            None,
        );
    }
}

impl<P: ResponseParser, F: XmlObject> Drop for Request<P, F> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.cancelled.store(true, Ordering::SeqCst);
            task.abort();
        }
    }
}

impl<P: ResponseParser, F: XmlObject> std::fmt::Debug for Request<P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url.as_str())
            .field("action", &self.action)
            .field("state", &self.delivery.state)
            .field("debug_capture", &self.debug_capture)
            .finish_non_exhaustive()
    }
}
