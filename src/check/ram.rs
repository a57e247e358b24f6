use tracing::debug;

use crate::check::disk::{self, usage_perfdata, Disk};
use crate::check::Values;
use crate::error::{Error, Result};
use crate::mib::{
    PHYSICAL_MEMORY, UCD_MEM_AVAIL_REAL, UCD_MEM_BUFFER, UCD_MEM_CACHED, UCD_MEM_TOTAL_REAL,
};
use crate::oid::Oid;
use crate::perfdata::{PerfData, Unit};
use crate::report::Report;
use crate::resolver::MatchRule;
use crate::session::Session;
use crate::threshold::{percent, Thresholds};

/// Memory figures of UCD-SNMP-MIB, all in kB as the agent reports them.
///
/// Buffers and cache count as free since the kernel hands them out on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ram {
    pub total: i64,
    pub available: i64,
    pub buffered: i64,
    pub cached: i64,
    pub used: i64,
    pub percent: i64,
}

impl Ram {
    pub fn new(total: i64, available: i64, buffered: i64, cached: i64) -> Result<Self> {
        if total <= 0 {
            return Err(Error::ZeroCapacity("memTotalReal".to_owned()));
        }

        let used = total
            .checked_sub(available)
            .and_then(|v| v.checked_sub(buffered))
            .and_then(|v| v.checked_sub(cached))
            .ok_or_else(|| Error::OutOfRange("used memory".to_owned()))?;
        Ok(Ram {
            total,
            available,
            buffered,
            cached,
            used,
            percent: percent(used, total),
        })
    }

    pub fn report(&self, thresholds: &Thresholds) -> Report {
        memory_report(self.used, self.total, self.percent, Unit::KiloBytes, thresholds)
    }
}

/// Windows exposes memory as an hrStorageTable row, so its figures are bytes rather than kB.
pub fn report_storage(memory: &Disk, thresholds: &Thresholds) -> Report {
    memory_report(memory.used, memory.total, memory.percent, Unit::Bytes, thresholds)
}

fn memory_report(used: i64, total: i64, percent: i64, unit: Unit, thresholds: &Thresholds) -> Report {
    let state = thresholds.evaluate(percent);

    Report::new(state, format!("RAM {} - {}% used", state, percent))
        .with_perfdata(PerfData::new("RAM", used).with_unit(unit).with_range(0, total))
        .with_perfdata(usage_perfdata("RAM %", percent, thresholds))
}

/// Reads total, available, buffered and cached memory in one request.
pub fn collect_linux<S: Session>(session: &mut S) -> Result<Ram> {
    let oid_total: Oid = UCD_MEM_TOTAL_REAL.parse()?;
    let oid_available: Oid = UCD_MEM_AVAIL_REAL.parse()?;
    let oid_buffered: Oid = UCD_MEM_BUFFER.parse()?;
    let oid_cached: Oid = UCD_MEM_CACHED.parse()?;

    let values = Values::fetch(
        session,
        &[
            oid_available.clone(),
            oid_total.clone(),
            oid_buffered.clone(),
            oid_cached.clone(),
        ],
    )?;

    let ram = Ram::new(
        values.integer(&oid_total)?,
        values.integer(&oid_available)?,
        values.integer(&oid_buffered)?,
        values.integer(&oid_cached)?,
    )?;
    debug!(total = ram.total, used = ram.used, "collected memory");
    Ok(ram)
}

/// Reads the "Physical Memory" row of hrStorageTable.
pub fn collect_windows<S: Session>(session: &mut S) -> Result<Disk> {
    disk::collect(session, PHYSICAL_MEMORY, &MatchRule::exact(PHYSICAL_MEMORY))
}

#[cfg(test)]
mod tests {
    use super::{collect_linux, collect_windows, report_storage, Ram};
    use crate::error::Error;
    use crate::oid::Oid;
    use crate::session::{MemoryAgent, Value};
    use crate::threshold::Thresholds;
    use crate::State;

    fn oid(s: &str) -> Oid {
        s.parse().unwrap()
    }

    fn ucd_agent(total: i64, available: i64, buffered: i64, cached: i64) -> MemoryAgent {
        MemoryAgent::new()
            .with(oid("1.3.6.1.4.1.2021.4.5.0"), Value::Integer(total))
            .with(oid("1.3.6.1.4.1.2021.4.6.0"), Value::Integer(available))
            .with(oid("1.3.6.1.4.1.2021.4.14.0"), Value::Integer(buffered))
            .with(oid("1.3.6.1.4.1.2021.4.15.0"), Value::Integer(cached))
    }

    #[test]
    fn test_linux_ram() {
        let mut agent = ucd_agent(8_000_000, 2_000_000, 500_000, 500_000);
        let ram = collect_linux(&mut agent).unwrap();
        assert_eq!(ram.used, 5_000_000);
        // 62.5 rounds half to even
        assert_eq!(ram.percent, 62);

        let report = ram.report(&Thresholds::new(60, 90));
        assert_eq!(report.state(), State::Warning);
        assert_eq!(
            &report.to_nagios_string(),
            "RAM WARNING - 62% used|'RAM'=5000000KB;;;0;8000000 'RAM %'=62%;60;90;0;100"
        );
    }

    #[test]
    fn test_linux_ram_missing_value() {
        let mut agent = MemoryAgent::new().with(oid("1.3.6.1.4.1.2021.4.5.0"), Value::Integer(1024));
        assert!(matches!(collect_linux(&mut agent), Err(Error::MissingValue(_))));
    }

    #[test]
    fn test_zero_total() {
        assert!(matches!(Ram::new(0, 0, 0, 0), Err(Error::ZeroCapacity(_))));
    }

    #[test]
    fn test_used_out_of_range() {
        assert!(matches!(Ram::new(i64::MAX, -1, 0, 0), Err(Error::OutOfRange(_))));
        assert!(matches!(Ram::new(1, 0, i64::MIN, 0), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_windows_ram_in_bytes() {
        let mut agent = MemoryAgent::new()
            .with(oid("1.3.6.1.2.1.25.2.3.1.3.3"), Value::string("Virtual Memory"))
            .with(oid("1.3.6.1.2.1.25.2.3.1.3.4"), Value::string("Physical Memory"))
            .with(oid("1.3.6.1.2.1.25.2.3.1.4.4"), Value::Integer(65536))
            .with(oid("1.3.6.1.2.1.25.2.3.1.5.4"), Value::Integer(1000))
            .with(oid("1.3.6.1.2.1.25.2.3.1.6.4"), Value::Integer(250));

        let memory = collect_windows(&mut agent).unwrap();
        let report = report_storage(&memory, &Thresholds::default());
        assert_eq!(report.state(), State::Ok);
        assert_eq!(
            &report.to_nagios_string(),
            "RAM OK - 25% used|'RAM'=16384000B;;;0;65536000 'RAM %'=25%;100;100;0;100"
        );
    }

    #[test]
    fn test_windows_ram_not_found() {
        let mut agent = MemoryAgent::new();
        let err = collect_windows(&mut agent).unwrap_err();
        assert_eq!(&err.to_string(), "Disk Physical Memory not found");
    }
}
