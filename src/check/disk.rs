use tracing::debug;

use crate::check::Values;
use crate::error::{Error, Result};
use crate::mib::{HR_STORAGE_ALLOCATION_UNITS, HR_STORAGE_DESCR, HR_STORAGE_SIZE, HR_STORAGE_USED};
use crate::oid::Oid;
use crate::perfdata::{PerfData, Unit};
use crate::report::Report;
use crate::resolver::{resolve_index, MatchRule};
use crate::session::Session;
use crate::threshold::{percent, Thresholds};

/// Usage of one hrStorageTable row, scaled to bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disk {
    /// Row index in hrStorageTable.
    pub index: String,
    /// The label the row was looked up by.
    pub path: String,
    pub total: i64,
    pub used: i64,
    pub percent: i64,
}

impl Disk {
    pub fn report(&self, thresholds: &Thresholds) -> Report {
        let state = thresholds.evaluate(self.percent);

        Report::new(
            state,
            format!("DISK {} {} - {}% used", self.path, state, self.percent),
        )
        .with_perfdata(
            PerfData::new("Disk", self.used)
                .with_unit(Unit::Bytes)
                .with_range(0, self.total),
        )
        .with_perfdata(usage_perfdata("Disk %", self.percent, thresholds))
    }
}

pub(crate) fn usage_perfdata(label: &str, percent: i64, thresholds: &Thresholds) -> PerfData<i64> {
    PerfData::new(label, percent)
        .with_unit(Unit::Percentage)
        .with_thresholds(i64::from(thresholds.warning), i64::from(thresholds.critical))
        .with_range(0, 100)
}

/// Looks up the storage row matching `rule` and reads its size and usage.
pub fn collect<S: Session>(session: &mut S, path: &str, rule: &MatchRule) -> Result<Disk> {
    let row = resolve_index(session, &HR_STORAGE_DESCR.parse::<Oid>()?, rule)?
        .ok_or_else(|| Error::DiskNotFound(path.to_owned()))?;

    let oid_units = HR_STORAGE_ALLOCATION_UNITS.parse::<Oid>()?.with_index(&row.index)?;
    let oid_size = HR_STORAGE_SIZE.parse::<Oid>()?.with_index(&row.index)?;
    let oid_used = HR_STORAGE_USED.parse::<Oid>()?.with_index(&row.index)?;

    let values = Values::fetch(
        session,
        &[oid_units.clone(), oid_size.clone(), oid_used.clone()],
    )?;
    let units = values.integer(&oid_units)?;
    let scale = |blocks: i64| {
        blocks
            .checked_mul(units)
            .ok_or_else(|| Error::OutOfRange(format!("size of {}", path)))
    };
    let total = scale(values.integer(&oid_size)?)?;
    let used = scale(values.integer(&oid_used)?)?;

    if total <= 0 {
        return Err(Error::ZeroCapacity(path.to_owned()));
    }

    debug!(index = %row.index, total, used, "collected storage");
    Ok(Disk {
        index: row.index,
        path: path.to_owned(),
        total,
        used,
        percent: percent(used, total),
    })
}

/// Linux mount points are matched literally.
pub fn collect_linux<S: Session>(session: &mut S, path: &str) -> Result<Disk> {
    collect(session, path, &MatchRule::exact(path))
}

/// Windows drives are given as a bare letter and matched against the agent's descriptor format.
pub fn collect_windows<S: Session>(session: &mut S, drive: &str) -> Result<Disk> {
    collect(session, drive, &MatchRule::windows_drive(drive)?)
}
