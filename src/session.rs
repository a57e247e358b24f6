//! The SNMP session seam: what the collectors need from an agent, a UDP implementation speaking
//! SNMPv2c, and an in-memory agent used to replay a known MIB.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::TransportError;
use crate::oid::Oid;
use crate::pdu::{self, Request};

/// GETBULK repetitions per request while walking.
const MAX_REPETITIONS: u32 = 10;

/// Largest UDP payload accepted from an agent.
const MAX_MESSAGE_SIZE: usize = 65_507;

/// Owned copy of an SNMP value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    OctetString(Vec<u8>),
    IpAddress([u8; 4]),
    Counter32(u32),
    Unsigned32(u32),
    Timeticks(u32),
    Counter64(u64),
    Null,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
    Unsupported,
}

impl Value {
    pub fn string<S: Into<String>>(s: S) -> Self {
        Value::OctetString(s.into().into_bytes())
    }

    /// Numeric value of any integer-like type. Counter64 values above `i64::MAX` have none.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Integer(v) => Some(v),
            Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => Some(i64::from(v)),
            Value::Counter64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Raw counter value, never scaled or sign-converted.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Counter64(v) => Some(v),
            Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => Some(u64::from(v)),
            Value::Integer(v) if v >= 0 => Some(v as u64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::OctetString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// True for the varbind exceptions an agent returns instead of a value.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "INTEGER: {}", v),
            Value::OctetString(bytes) => write!(f, "STRING: {:?}", String::from_utf8_lossy(bytes)),
            Value::IpAddress([a, b, c, d]) => write!(f, "IpAddress: {}.{}.{}.{}", a, b, c, d),
            Value::Counter32(v) => write!(f, "Counter32: {}", v),
            Value::Unsigned32(v) => write!(f, "Gauge32: {}", v),
            Value::Timeticks(v) => write!(f, "Timeticks: {}", v),
            Value::Counter64(v) => write!(f, "Counter64: {}", v),
            Value::Null => f.write_str("NULL"),
            Value::NoSuchObject => f.write_str("No Such Object"),
            Value::NoSuchInstance => f.write_str("No Such Instance"),
            Value::EndOfMibView => f.write_str("End of MIB View"),
            Value::Unsupported => f.write_str("unsupported type"),
        }
    }
}

impl<'a> From<snmp::Value<'a>> for Value {
    fn from(value: snmp::Value<'a>) -> Self {
        match value {
            snmp::Value::Integer(v) => Value::Integer(v),
            snmp::Value::OctetString(bytes) => Value::OctetString(bytes.to_vec()),
            snmp::Value::IpAddress(addr) => Value::IpAddress(addr),
            snmp::Value::Counter32(v) => Value::Counter32(v),
            snmp::Value::Unsigned32(v) => Value::Unsigned32(v),
            snmp::Value::Timeticks(v) => Value::Timeticks(v),
            snmp::Value::Counter64(v) => Value::Counter64(v),
            snmp::Value::Null => Value::Null,
            _ => Value::Unsupported,
        }
    }
}

/// A single variable binding of a response.
#[derive(Clone, Debug, PartialEq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

/// The operations the probe issues against an agent.
///
/// Both calls block until the agent answers or the session timeout expires.
pub trait Session {
    /// Fetches the given OIDs. The returned bindings are not guaranteed to follow the request
    /// order; callers must look them up by OID.
    fn get(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>, TransportError>;

    /// Calls `f` for every binding below `prefix`, in the agent's lexicographic order.
    fn bulk_walk<F, E>(&mut self, prefix: &Oid, f: F) -> Result<(), E>
    where
        F: FnMut(&VarBind) -> Result<(), E>,
        E: From<TransportError>;
}

/// Where and how to reach an agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub timeout: Duration,
}

impl Target {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// What a walk does after handing out one GETBULK batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum WalkStep {
    /// Request the next batch after this OID.
    Continue(Oid),
    Done,
}

/// Hands the bindings of `batch` below `prefix` to `f`, in order.
///
/// The walk ends at the first binding outside the subtree, at endOfMibView, or on an empty batch.
/// Every binding must sort after the previous one, starting from `cursor`.
pub(crate) fn walk_batch<F, E>(prefix: &Oid, cursor: &Oid, batch: &[VarBind], f: &mut F) -> Result<WalkStep, E>
where
    F: FnMut(&VarBind) -> Result<(), E>,
    E: From<TransportError>,
{
    let mut last = cursor;
    for binding in batch {
        if binding.value == Value::EndOfMibView || !binding.oid.is_below(prefix) {
            return Ok(WalkStep::Done);
        }
        if binding.oid <= *last {
            return Err(TransportError::NotIncreasing(binding.oid.clone()).into());
        }
        f(binding)?;
        last = &binding.oid;
    }

    if batch.is_empty() {
        Ok(WalkStep::Done)
    } else {
        Ok(WalkStep::Continue(last.clone()))
    }
}

/// SNMPv2c over UDP. The socket is released when the session is dropped.
pub struct UdpSession {
    socket: UdpSocket,
    community: Vec<u8>,
    request_id: i32,
    address: String,
    timeout: Duration,
    buf: Vec<u8>,
}

impl UdpSession {
    pub fn connect(target: &Target) -> Result<Self, TransportError> {
        let address = target.address();
        debug!(%address, timeout = ?target.timeout, "opening SNMP session");

        let connect_error = |source| TransportError::Connect {
            target: address.clone(),
            source,
        };

        let remote = address
            .to_socket_addrs()
            .map_err(connect_error)?
            .next()
            .ok_or_else(|| {
                connect_error(io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "host did not resolve to an address",
                ))
            })?;
        let local: SocketAddr = match remote {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(local).map_err(connect_error)?;
        socket.set_read_timeout(Some(target.timeout)).map_err(connect_error)?;
        socket.connect(remote).map_err(connect_error)?;

        Ok(UdpSession {
            socket,
            community: target.community.as_bytes().to_vec(),
            request_id: 0,
            address,
            timeout: target.timeout,
            buf: vec![0; MAX_MESSAGE_SIZE],
        })
    }

    /// Sends one request and waits for its response, skipping answers to earlier requests.
    fn request(&mut self, request: Request<'_>) -> Result<Vec<VarBind>, TransportError> {
        self.request_id = self.request_id.wrapping_add(1);
        let request_id = self.request_id;
        let timeout = self.timeout;

        let message = pdu::encode(&self.community, request_id, request)?;
        self.socket.send(&message).map_err(TransportError::Io)?;

        loop {
            let len = self
                .socket
                .recv(&mut self.buf)
                .map_err(|err| io_error(err, timeout))?;
            let response = pdu::decode(&self.buf[..len], &self.community)?;
            if response.request_id != request_id {
                trace!(expected = request_id, got = response.request_id, "discarding stale response");
                continue;
            }
            if response.error_status != 0 {
                return Err(TransportError::Agent {
                    status: response.error_status,
                    index: response.error_index,
                });
            }
            return Ok(response.bindings);
        }
    }
}

fn io_error(err: io::Error, timeout: Duration) -> TransportError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout(timeout),
        _ => TransportError::Io(err),
    }
}

impl Session for UdpSession {
    fn get(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>, TransportError> {
        let bindings = self.request(Request::Get(oids))?;
        trace!(requested = oids.len(), count = bindings.len(), "get");
        Ok(bindings)
    }

    fn bulk_walk<F, E>(&mut self, prefix: &Oid, mut f: F) -> Result<(), E>
    where
        F: FnMut(&VarBind) -> Result<(), E>,
        E: From<TransportError>,
    {
        let mut cursor = prefix.clone();
        loop {
            let batch = self.request(Request::GetBulk {
                from: &cursor,
                max_repetitions: MAX_REPETITIONS,
            })?;
            trace!(%cursor, count = batch.len(), "getbulk");

            match walk_batch(prefix, &cursor, &batch, &mut f)? {
                WalkStep::Continue(next) => cursor = next,
                WalkStep::Done => return Ok(()),
            }
        }
    }
}

impl Drop for UdpSession {
    fn drop(&mut self) {
        debug!(address = %self.address, "closing SNMP session");
    }
}

/// An agent answering from a fixed set of bindings.
///
/// With `fail_after(n)` a walk hands out at most `n` bindings and then times out, the way an agent
/// that stops answering half-way through a table behaves.
#[derive(Clone, Debug, Default)]
pub struct MemoryAgent {
    values: BTreeMap<Oid, Value>,
    fail_after: Option<usize>,
    unreachable: bool,
}

impl MemoryAgent {
    pub fn new() -> Self {
        MemoryAgent::default()
    }

    pub fn with(mut self, oid: Oid, value: Value) -> Self {
        self.values.insert(oid, value);
        self
    }

    pub fn fail_after(mut self, bindings: usize) -> Self {
        self.fail_after = Some(bindings);
        self
    }

    /// Every request times out.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn timeout() -> TransportError {
        TransportError::Timeout(Duration::from_secs(5))
    }
}

impl FromIterator<(Oid, Value)> for MemoryAgent {
    fn from_iter<I: IntoIterator<Item = (Oid, Value)>>(iter: I) -> Self {
        MemoryAgent {
            values: iter.into_iter().collect(),
            ..MemoryAgent::default()
        }
    }
}

impl Session for MemoryAgent {
    fn get(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>, TransportError> {
        if self.unreachable {
            return Err(Self::timeout());
        }

        Ok(oids
            .iter()
            .map(|oid| VarBind {
                oid: oid.clone(),
                value: self
                    .values
                    .get(oid)
                    .cloned()
                    .unwrap_or(Value::NoSuchInstance),
            })
            .collect())
    }

    fn bulk_walk<F, E>(&mut self, prefix: &Oid, mut f: F) -> Result<(), E>
    where
        F: FnMut(&VarBind) -> Result<(), E>,
        E: From<TransportError>,
    {
        if self.unreachable {
            return Err(Self::timeout().into());
        }

        let rows = self
            .values
            .range(prefix.clone()..)
            .skip_while(|(oid, _)| *oid == prefix)
            .take_while(|(oid, _)| oid.is_below(prefix));

        for (served, (oid, value)) in rows.enumerate() {
            if self.fail_after == Some(served) {
                return Err(Self::timeout().into());
            }
            f(&VarBind {
                oid: oid.clone(),
                value: value.clone(),
            })?;
        }

        if self.fail_after.is_some() {
            return Err(Self::timeout().into());
        }
        Ok(())
    }
}
