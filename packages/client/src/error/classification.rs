use std::error::Error as StdError;
use std::io;

use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error came from building a pattern table or config.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), Kind::Configuration)
    }

    /// Returns true if the response document could not be materialized.
    #[must_use]
    pub fn is_data_format(&self) -> bool {
        matches!(self.kind(), Kind::DataFormat)
    }

    /// Returns true if the error is a wrapped transport failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), Kind::Transport)
    }

    /// Returns true if the error carries a non-fault, non-success status.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self.kind(), Kind::Status(_))
    }

    /// Returns true if the handle was used out of order.
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self.kind(), Kind::Usage)
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        if matches!(self.kind(), Kind::Timeout) {
            return true;
        }

        let mut source = self.source();

        while let Some(err) = source {
            if err.is::<tokio::time::error::Elapsed>() {
                return true;
            }
            if let Some(io) = err.downcast_ref::<io::Error>()
                && io.kind() == io::ErrorKind::TimedOut
            {
                return true;
            }
            source = err.source();
        }

        false
    }

    /// Returns the status code, if the error was generated from a response.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self.kind() {
            Kind::Status(code) => Some(*code),
            _ => None,
        }
    }
}
