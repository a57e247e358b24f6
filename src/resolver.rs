//! Maps a human label (mount point, drive letter, interface name) to the row index of a MIB table
//! by walking its descriptor column.

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::mib::{PHYSICAL_MEMORY, WINDOWS_DRIVE_PATTERN};
use crate::oid::Oid;
use crate::session::Session;

/// How a descriptor is compared against the caller's label.
#[derive(Clone, Debug)]
pub enum MatchRule {
    Exact(String),
    Pattern(Regex),
}

impl MatchRule {
    pub fn exact(label: &str) -> Self {
        MatchRule::Exact(label.to_owned())
    }

    /// Drive letters are matched against the Windows agent's descriptor format; the physical
    /// memory row is matched literally.
    pub fn windows_drive(label: &str) -> Result<Self> {
        if label == PHYSICAL_MEMORY {
            return Ok(MatchRule::exact(label));
        }

        let pattern = WINDOWS_DRIVE_PATTERN.replace("{label}", &regex::escape(label));
        Ok(MatchRule::Pattern(Regex::new(&pattern)?))
    }

    pub fn matches(&self, descr: &str) -> bool {
        match self {
            MatchRule::Exact(label) => label == descr,
            MatchRule::Pattern(regex) => regex.is_match(descr),
        }
    }
}

/// A table row whose descriptor matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub index: String,
    pub descr: String,
}

/// Walks `column` and returns the first row whose descriptor satisfies `rule`.
///
/// `Ok(None)` means the walk completed without a match. A transport error aborts the lookup even
/// if a row was already found.
pub fn resolve_index<S: Session>(session: &mut S, column: &Oid, rule: &MatchRule) -> Result<Option<Row>> {
    let row_pattern = Regex::new(&format!(r"^{}\.(\d+)$", regex::escape(&column.to_string())))?;
    let mut found: Option<Row> = None;

    session.bulk_walk(column, |binding| -> std::result::Result<(), TransportError> {
        let name = binding.oid.to_string();
        let index = match row_pattern.captures(&name).and_then(|c| c.get(1)) {
            Some(index) => index.as_str(),
            None => return Ok(()),
        };

        let descr = match binding.value.as_string() {
            Some(descr) => descr,
            None => {
                trace!(oid = %binding.oid, value = %binding.value, "skipping non-string descriptor");
                return Ok(());
            }
        };

        if found.is_none() && rule.matches(&descr) {
            debug!(%column, index, %descr, "resolved row");
            found = Some(Row {
                index: index.to_owned(),
                descr,
            });
        }

        Ok(())
    })?;

    Ok(found)
}
