//! Terminal outcomes and lifecycle states

use crate::error::Error;

/// Lifecycle of a request handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    Idle,
    Running,
    Completed,
    Faulted,
    Errored,
    Cancelled,
}

impl RequestState {
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestState::Idle | RequestState::Running)
    }
}

/// The single terminal result of one execution
#[derive(Debug)]
pub enum Outcome<T, F> {
    Completed(T),
    Faulted(F),
    Errored(Error),
    Cancelled,
}

impl<T, F> Outcome<T, F> {
    #[must_use]
    pub fn state(&self) -> RequestState {
        match self {
            Outcome::Completed(_) => RequestState::Completed,
            Outcome::Faulted(_) => RequestState::Faulted,
            Outcome::Errored(_) => RequestState::Errored,
            Outcome::Cancelled => RequestState::Cancelled,
        }
    }

    #[must_use]
    pub fn completed(&self) -> Option<&T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn fault(&self) -> Option<&F> {
        match self {
            Outcome::Faulted(fault) => Some(fault),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Outcome::Errored(err) => Some(err),
            _ => None,
        }
    }

    /// Completed value, or the fault/error/cancellation as an `Err`
    pub fn into_result(self) -> Result<T, Outcome<T, F>> {
        match self {
            Outcome::Completed(value) => Ok(value),
            other => Err(other),
        }
    }
}

/// Raw XML retained when debug capture is on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub request_xml: Option<String>,
    pub response_xml: Option<String>,
}
