use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A numeric SNMP object identifier such as `1.3.6.1.2.1.25.2.3.1.3.1`.
///
/// Parsing accepts an optional leading dot; the canonical display form has none.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

#[derive(Debug, Error, PartialEq)]
#[error("invalid OID {0:?}")]
pub struct ParseOidError(String);

impl Oid {
    pub fn from_slice(arcs: &[u32]) -> Self {
        Oid(arcs.to_vec())
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// Returns true if `self` lies strictly below `prefix` in the OID tree.
    pub fn is_below(&self, prefix: &Oid) -> bool {
        self.0.len() > prefix.0.len() && self.0.starts_with(&prefix.0)
    }

    /// Appends a row index (itself a dotted string, usually a single arc) to a column OID.
    pub fn with_index(&self, index: &str) -> Result<Oid, ParseOidError> {
        let suffix: Oid = index.parse()?;
        let mut arcs = self.0.clone();
        arcs.extend_from_slice(&suffix.0);
        Ok(Oid(arcs))
    }
}

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(ParseOidError(s.to_owned()));
        }

        trimmed
            .split('.')
            .map(|arc| arc.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map(Oid)
            .map_err(|_| ParseOidError(s.to_owned()))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
        }
        for arc in arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}
