use std::time::Duration;

use thiserror::Error;

use crate::oid::{Oid, ParseOidError};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the SNMP exchange itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("cannot encode OID {0}")]
    Encode(Oid),
    #[error("agent returned error status {status} (index {index})")]
    Agent { status: u32, index: u32 },
    #[error("walk did not advance past {0}")]
    NotIncreasing(Oid),
    #[error("{0}")]
    InvalidOid(#[from] ParseOidError),
}

/// Failures while acquiring a metric.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Disk {0} not found")]
    DiskNotFound(String),
    #[error("Interface {0} not found")]
    InterfaceNotFound(String),
    #[error("No CPU cores found")]
    NoCpuCores,
    #[error("no value returned for {0}")]
    MissingValue(Oid),
    #[error("unexpected value for {oid}: {value}")]
    UnexpectedValue { oid: Oid, value: String },
    #[error("{0} reports a size of zero")]
    ZeroCapacity(String),
    #[error("{0} is out of range")]
    OutOfRange(String),
    #[error("invalid descriptor pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<ParseOidError> for Error {
    fn from(err: ParseOidError) -> Self {
        Error::Transport(TransportError::InvalidOid(err))
    }
}

/// An [Error] tagged with the operation that raised it. Renders as `<op> error: <detail>`.
#[derive(Debug, Error)]
#[error("{operation} error: {source}")]
pub struct CheckError {
    pub operation: &'static str,
    #[source]
    pub source: Error,
}

impl CheckError {
    pub fn new(operation: &'static str, source: impl Into<Error>) -> Self {
        CheckError {
            operation,
            source: source.into(),
        }
    }
}
