//! A nagios/icinga check that reads one metric of a host over SNMPv2c: processor load, disk or
//! memory usage, or the link state of a network interface.
//!
//! Disks and interfaces are named the way an operator knows them (`/var`, `C`, `eth0`). The check
//! walks the descriptor column of the matching MIB table to find the row index, fetches the row's
//! values, derives a usage percentage and compares it against the warning and critical levels.
//!
//! ```rust
//! # use check_snmp_status::{probe, Config, Mode, Os, MemoryAgent, Oid, Target, Thresholds, Value};
//! # use std::time::Duration;
//! let mut agent: MemoryAgent = [1u32, 2]
//!     .iter()
//!     .map(|core| {
//!         let oid: Oid = format!("1.3.6.1.2.1.25.3.3.1.2.{}", core).parse().unwrap();
//!         (oid, Value::Integer(40))
//!     })
//!     .collect();
//!
//! let config = Config {
//!     target: Target {
//!         host: "192.0.2.1".to_owned(),
//!         port: 161,
//!         community: "public".to_owned(),
//!         timeout: Duration::from_secs(5),
//!     },
//!     mode: Mode::Cpu,
//!     os: Os::Linux,
//!     path: None,
//!     thresholds: Thresholds::new(30, 90),
//! };
//!
//! let report = probe(&config, &mut agent).unwrap();
//! assert_eq!(
//!     &report.to_nagios_string(),
//!     "CPU WARNING - 40%|'CPU average'=40%;30;90;0;100 'CPU core 0'=40%;;;0;100 'CPU core 1'=40%;;;0;100"
//! );
//! assert_eq!(report.exit_code(), 1);
//! ```

use std::fmt;

#[macro_use]
mod macros;

pub mod check;
pub mod cli;
pub mod config;
pub mod config_generator;
pub mod error;
pub mod mib;
pub mod oid;
mod pdu;
pub mod perfdata;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod session;
pub mod threshold;

pub use crate::config::{Config, Mode, Os};
pub use crate::error::{CheckError, Error, TransportError};
pub use crate::oid::Oid;
pub use crate::perfdata::{PerfData, ToPerfString, Unit};
pub use crate::report::Report;
pub use crate::runner::{Runner, RunnerResult};
pub use crate::session::{MemoryAgent, Session, Target, UdpSession, Value, VarBind};
pub use crate::threshold::{percent, round_half_even, Thresholds};

/// Version printed by `-version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Represents a service state from nagios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl State {
    /// Returns the corresponding nagios exit code to signal the service state of self.
    pub fn exit_code(&self) -> i32 {
        match self {
            State::Ok => 0,
            State::Warning => 1,
            State::Critical => 2,
            State::Unknown => 3,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Ok => "OK",
            State::Warning => "WARNING",
            State::Critical => "CRITICAL",
            State::Unknown => "UNKNOWN",
        })
    }
}

/// Runs the check selected by `config` against an open session.
///
/// Any failure is returned tagged with the mode's operation name; the caller decides how it is
/// reported. Polling several hosts means calling this once per host with its own session.
pub fn probe<S: Session>(config: &Config, session: &mut S) -> Result<Report, CheckError> {
    let thresholds = &config.thresholds;

    let report = match (config.mode, config.os) {
        (Mode::Cpu, _) => check::cpu::collect(session).map(|cpu| cpu.report(thresholds)),
        (Mode::Disk, Os::Linux) => {
            check::disk::collect_linux(session, config.path()).map(|disk| disk.report(thresholds))
        }
        (Mode::Disk, Os::Windows) => {
            check::disk::collect_windows(session, config.path()).map(|disk| disk.report(thresholds))
        }
        (Mode::Ram, Os::Linux) => {
            check::ram::collect_linux(session).map(|ram| ram.report(thresholds))
        }
        (Mode::Ram, Os::Windows) => check::ram::collect_windows(session)
            .map(|memory| check::ram::report_storage(&memory, thresholds)),
        (Mode::Interface, _) => {
            check::interface::collect(session, config.path()).map(|interface| interface.report())
        }
    };

    report.map_err(|err| CheckError::new(config.mode.operation(), err))
}

/// Opens a UDP session to the configured target, runs [probe] and closes the session again.
pub fn run(config: &Config) -> Result<Report, CheckError> {
    let mut session = UdpSession::connect(&config.target)
        .map_err(|err| CheckError::new(config.mode.operation(), err))?;
    probe(config, &mut session)
}
