//! SNMPv2c message framing.
//!
//! Requests are BER-encoded here since the `snmp` crate only builds single-name GETs. Responses
//! are read with its [AsnReader], except for the varbind exceptions (noSuchObject,
//! noSuchInstance, endOfMibView) and Counter64 values above `i64::MAX`, which it cannot decode.

use snmp::asn1::{TYPE_INTEGER, TYPE_NULL, TYPE_OBJECTIDENTIFIER, TYPE_OCTETSTRING, TYPE_SEQUENCE};
use snmp::snmp::{MSG_GET, MSG_GET_BULK, MSG_RESPONSE, TYPE_COUNTER64, VERSION_2};
use snmp::{AsnReader, ObjIdBuf, SnmpError};

use crate::error::TransportError;
use crate::oid::Oid;
use crate::session::{Value, VarBind};

const NO_SUCH_OBJECT: u8 = 0x80;
const NO_SUCH_INSTANCE: u8 = 0x81;
const END_OF_MIB_VIEW: u8 = 0x82;

/// The requests the probe sends.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Request<'a> {
    /// One GET carrying every name.
    Get(&'a [Oid]),
    /// GETBULK without non-repeaters, starting after `from`.
    GetBulk { from: &'a Oid, max_repetitions: u32 },
}

/// A decoded response PDU.
#[derive(Debug)]
pub(crate) struct Response {
    pub request_id: i32,
    pub error_status: u32,
    pub error_index: u32,
    pub bindings: Vec<VarBind>,
}

pub(crate) fn encode(community: &[u8], request_id: i32, request: Request<'_>) -> Result<Vec<u8>, TransportError> {
    let (tag, names, field2, field3) = match request {
        Request::Get(oids) => (MSG_GET, oids, 0, 0),
        Request::GetBulk {
            from,
            max_repetitions,
        } => (MSG_GET_BULK, std::slice::from_ref(from), 0, i64::from(max_repetitions)),
    };

    let mut varbinds = Vec::new();
    for name in names {
        let mut pair = Vec::new();
        tlv(TYPE_OBJECTIDENTIFIER, &oid_content(name)?, &mut pair);
        tlv(TYPE_NULL, &[], &mut pair);
        tlv(TYPE_SEQUENCE, &pair, &mut varbinds);
    }

    let mut pdu = Vec::new();
    tlv(TYPE_INTEGER, &integer_content(i64::from(request_id)), &mut pdu);
    tlv(TYPE_INTEGER, &integer_content(field2), &mut pdu);
    tlv(TYPE_INTEGER, &integer_content(field3), &mut pdu);
    tlv(TYPE_SEQUENCE, &varbinds, &mut pdu);

    let mut message = Vec::new();
    tlv(TYPE_INTEGER, &integer_content(VERSION_2), &mut message);
    tlv(TYPE_OCTETSTRING, community, &mut message);
    tlv(tag, &pdu, &mut message);

    let mut out = Vec::with_capacity(message.len() + 4);
    tlv(TYPE_SEQUENCE, &message, &mut out);
    Ok(out)
}

pub(crate) fn decode(bytes: &[u8], community: &[u8]) -> Result<Response, TransportError> {
    let message = AsnReader::from_bytes(bytes).read_raw(TYPE_SEQUENCE).map_err(malformed)?;
    let mut message = AsnReader::from_bytes(message);

    let version = message.read_asn_integer().map_err(malformed)?;
    if version != VERSION_2 {
        return Err(TransportError::Malformed(format!("unsupported version {}", version)));
    }
    if message.read_asn_octetstring().map_err(malformed)? != community {
        return Err(TransportError::Malformed("community mismatch".to_owned()));
    }

    let tag = message.peek_byte().map_err(malformed)?;
    if tag != MSG_RESPONSE {
        return Err(TransportError::Malformed(format!("unexpected PDU type {:#04x}", tag)));
    }
    let mut pdu = AsnReader::from_bytes(message.read_raw(MSG_RESPONSE).map_err(malformed)?);

    let request_id = pdu.read_asn_integer().map_err(malformed)?;
    let error_status = pdu.read_asn_integer().map_err(malformed)?;
    let error_index = pdu.read_asn_integer().map_err(malformed)?;

    let mut varbinds = AsnReader::from_bytes(pdu.read_raw(TYPE_SEQUENCE).map_err(malformed)?);
    let mut bindings = Vec::new();
    while varbinds.peek_byte().is_ok() {
        let mut pair = AsnReader::from_bytes(varbinds.read_raw(TYPE_SEQUENCE).map_err(malformed)?);
        let name = pair.read_asn_objectidentifier().map_err(malformed)?;
        let mut buf: ObjIdBuf = [0; 128];
        let oid = Oid::from_slice(name.read_name(&mut buf).map_err(malformed)?);
        let value = decode_value(&mut pair)?;
        bindings.push(VarBind { oid, value });
    }

    Ok(Response {
        request_id: i32::try_from(request_id).map_err(|_| out_of_range("request id", request_id))?,
        error_status: u32::try_from(error_status).map_err(|_| out_of_range("error status", error_status))?,
        error_index: u32::try_from(error_index).map_err(|_| out_of_range("error index", error_index))?,
        bindings,
    })
}

fn decode_value(pair: &mut AsnReader<'_>) -> Result<Value, TransportError> {
    let tag = pair.peek_byte().map_err(malformed)?;
    let value = match tag {
        NO_SUCH_OBJECT | NO_SUCH_INSTANCE | END_OF_MIB_VIEW => {
            pair.read_raw(tag).map_err(malformed)?;
            match tag {
                NO_SUCH_OBJECT => Value::NoSuchObject,
                NO_SUCH_INSTANCE => Value::NoSuchInstance,
                _ => Value::EndOfMibView,
            }
        }
        TYPE_COUNTER64 => Value::Counter64(unsigned(pair.read_raw(tag).map_err(malformed)?)?),
        _ => pair.next().map(Value::from).unwrap_or(Value::Unsupported),
    };
    Ok(value)
}

/// Big-endian unsigned content of up to 8 significant bytes, plus a possible leading zero.
fn unsigned(content: &[u8]) -> Result<u64, TransportError> {
    let significant = match content {
        [0, rest @ ..] => rest,
        all => all,
    };
    if significant.len() > 8 {
        return Err(TransportError::Malformed("Counter64 wider than 64 bits".to_owned()));
    }
    Ok(significant.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn malformed(err: SnmpError) -> TransportError {
    TransportError::Malformed(format!("{:?}", err))
}

fn out_of_range(field: &str, value: i64) -> TransportError {
    TransportError::Malformed(format!("{} {} out of range", field, value))
}

fn tlv(tag: u8, content: &[u8], out: &mut Vec<u8>) {
    out.push(tag);
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (bytes.len() - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
    out.extend_from_slice(content);
}

/// Minimal two's complement encoding.
fn integer_content(n: i64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

fn oid_content(oid: &Oid) -> Result<Vec<u8>, TransportError> {
    let (head, rest) = match oid.arcs() {
        [first, second, rest @ ..] if *first < 2 && *second < 40 || *first == 2 => {
            match (first * 40).checked_add(*second) {
                Some(head) => (head, rest),
                None => return Err(TransportError::Encode(oid.clone())),
            }
        }
        _ => return Err(TransportError::Encode(oid.clone())),
    };

    let mut out = Vec::new();
    for arc in std::iter::once(head).chain(rest.iter().copied()) {
        let mut chunk = [0u8; 5];
        let mut pos = chunk.len() - 1;
        let mut value = arc;
        chunk[pos] = (value & 0x7f) as u8;
        value >>= 7;
        while value > 0 {
            pos -= 1;
            chunk[pos] = (value & 0x7f) as u8 | 0x80;
            value >>= 7;
        }
        out.extend_from_slice(&chunk[pos..]);
    }
    Ok(out)
}

/// Encodes a response PDU the way an agent does.
#[cfg(test)]
pub(crate) fn encode_response(community: &[u8], request_id: i32, error_status: i64, bindings: &[VarBind]) -> Vec<u8> {
    use snmp::snmp::{TYPE_COUNTER32, TYPE_IPADDRESS, TYPE_TIMETICKS, TYPE_UNSIGNED32};

    let mut varbinds = Vec::new();
    for binding in bindings {
        let mut pair = Vec::new();
        tlv(TYPE_OBJECTIDENTIFIER, &oid_content(&binding.oid).unwrap(), &mut pair);
        match &binding.value {
            Value::Integer(v) => tlv(TYPE_INTEGER, &integer_content(*v), &mut pair),
            Value::OctetString(bytes) => tlv(TYPE_OCTETSTRING, bytes, &mut pair),
            Value::IpAddress(addr) => tlv(TYPE_IPADDRESS, addr, &mut pair),
            Value::Counter32(v) => tlv(TYPE_COUNTER32, &integer_content(i64::from(*v)), &mut pair),
            Value::Unsigned32(v) => tlv(TYPE_UNSIGNED32, &integer_content(i64::from(*v)), &mut pair),
            Value::Timeticks(v) => tlv(TYPE_TIMETICKS, &integer_content(i64::from(*v)), &mut pair),
            Value::Counter64(v) => {
                let mut content = vec![0];
                content.extend_from_slice(&v.to_be_bytes());
                tlv(TYPE_COUNTER64, &content, &mut pair)
            }
            Value::Null | Value::Unsupported => tlv(TYPE_NULL, &[], &mut pair),
            Value::NoSuchObject => tlv(NO_SUCH_OBJECT, &[], &mut pair),
            Value::NoSuchInstance => tlv(NO_SUCH_INSTANCE, &[], &mut pair),
            Value::EndOfMibView => tlv(END_OF_MIB_VIEW, &[], &mut pair),
        }
        tlv(TYPE_SEQUENCE, &pair, &mut varbinds);
    }

    let mut pdu = Vec::new();
    tlv(TYPE_INTEGER, &integer_content(i64::from(request_id)), &mut pdu);
    tlv(TYPE_INTEGER, &integer_content(error_status), &mut pdu);
    tlv(TYPE_INTEGER, &integer_content(0), &mut pdu);
    tlv(TYPE_SEQUENCE, &varbinds, &mut pdu);

    let mut message = Vec::new();
    tlv(TYPE_INTEGER, &integer_content(VERSION_2), &mut message);
    tlv(TYPE_OCTETSTRING, community, &mut message);
    tlv(MSG_RESPONSE, &pdu, &mut message);

    let mut out = Vec::new();
    tlv(TYPE_SEQUENCE, &message, &mut out);
    out
}
