use std::fmt;

use tracing::debug;

use crate::check::Values;
use crate::error::{Error, Result};
use crate::mib::{IF_CONNECTOR_PRESENT, IF_HC_IN_OCTETS, IF_HC_OUT_OCTETS, IF_NAME};
use crate::oid::Oid;
use crate::perfdata::{PerfData, Unit};
use crate::report::Report;
use crate::resolver::{resolve_index, MatchRule};
use crate::session::Session;
use crate::State;

/// SNMPv2-TC TruthValue as used by ifConnectorPresent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TruthValue {
    True,
    False,
}

impl From<i64> for TruthValue {
    /// Only 1 means true; anything else an agent sends is taken as false.
    fn from(value: i64) -> Self {
        match value {
            1 => TruthValue::True,
            _ => TruthValue::False,
        }
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TruthValue::True => "Connected",
            TruthValue::False => "Disconnected",
        })
    }
}

/// Octet counters and link state of one ifXTable row. Counters are the agent's raw values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub index: String,
    pub in_octets: u64,
    pub out_octets: u64,
    pub connector_present: TruthValue,
}

impl Interface {
    /// Only the connector state decides the result; thresholds do not apply.
    pub fn state(&self) -> State {
        match self.connector_present {
            TruthValue::True => State::Ok,
            TruthValue::False => State::Warning,
        }
    }

    pub fn report(&self) -> Report {
        Report::new(
            self.state(),
            format!("INTERFACE {} - {}", self.name, self.connector_present),
        )
        .with_perfdata(PerfData::new("Interface In", self.in_octets).with_unit(Unit::Counter))
        .with_perfdata(PerfData::new("Interface Out", self.out_octets).with_unit(Unit::Counter))
    }
}

/// Looks up the interface by ifName and reads its 64-bit counters and connector state.
pub fn collect<S: Session>(session: &mut S, name: &str) -> Result<Interface> {
    let row = resolve_index(session, &IF_NAME.parse::<Oid>()?, &MatchRule::exact(name))?
        .ok_or_else(|| Error::InterfaceNotFound(name.to_owned()))?;

    let oid_in = IF_HC_IN_OCTETS.parse::<Oid>()?.with_index(&row.index)?;
    let oid_out = IF_HC_OUT_OCTETS.parse::<Oid>()?.with_index(&row.index)?;
    let oid_connector = IF_CONNECTOR_PRESENT.parse::<Oid>()?.with_index(&row.index)?;

    let values = Values::fetch(
        session,
        &[oid_in.clone(), oid_out.clone(), oid_connector.clone()],
    )?;

    let interface = Interface {
        name: name.to_owned(),
        index: row.index,
        in_octets: values.counter(&oid_in)?,
        out_octets: values.counter(&oid_out)?,
        connector_present: TruthValue::from(values.integer(&oid_connector)?),
    };
    debug!(index = %interface.index, connector = ?interface.connector_present, "collected interface");
    Ok(interface)
}
