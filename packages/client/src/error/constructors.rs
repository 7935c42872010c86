use http::StatusCode;
use url::Url;

use super::BoxError;
use super::types::{Error, Kind};

/// Creates an `Error` for an unbuildable pattern table or invalid settings.
pub fn configuration<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Configuration).with(e.into())
}

/// Creates an `Error` for a response that cannot be materialized.
pub fn data_format<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::DataFormat).with(e.into())
}

/// Creates an `Error` wrapping a transport-level failure.
pub fn transport<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transport).with(e.into())
}

/// Creates an `Error` for a status that is neither success nor a fault.
pub fn status_code(url: Url, status: StatusCode) -> Error {
    Error::new(Kind::Status(status)).with_url(url)
}

/// Creates an `Error` for an elapsed deadline.
pub fn timeout<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Timeout).with(e.into())
}

/// Creates an `Error` for out-of-order use of a request handle.
pub fn usage<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Usage).with(e.into())
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        data_format(err)
    }
}

impl From<crate::config::ConfigurationError> for Error {
    fn from(err: crate::config::ConfigurationError) -> Self {
        configuration(err)
    }
}
