//! SOAP envelopes and fault types

pub mod envelope;
pub mod fault;

pub use envelope::{Envelope, RawEnvelope, SoapVersion};
pub use fault::{FaultReason, Soap11Fault, Soap12Fault};
