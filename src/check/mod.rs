//! One collector per mode: each issues its walk and get requests, builds a measurement and turns
//! it into a [Report](crate::Report).

pub mod cpu;
pub mod disk;
pub mod interface;
pub mod ram;

use std::collections::HashMap;

use tracing::trace;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::session::{Session, Value};

/// The bindings of a single get request, keyed by OID.
pub(crate) struct Values(HashMap<Oid, Value>);

impl Values {
    pub(crate) fn fetch<S: Session>(session: &mut S, oids: &[Oid]) -> Result<Self> {
        let bindings = session.get(oids)?;
        for binding in &bindings {
            trace!(oid = %binding.oid, value = %binding.value, "value");
        }
        Ok(Values(bindings.into_iter().map(|b| (b.oid, b.value)).collect()))
    }

    fn value(&self, oid: &Oid) -> Result<&Value> {
        match self.0.get(oid) {
            Some(value) if !value.is_exception() => Ok(value),
            _ => Err(Error::MissingValue(oid.clone())),
        }
    }

    pub(crate) fn integer(&self, oid: &Oid) -> Result<i64> {
        let value = self.value(oid)?;
        value.as_i64().ok_or_else(|| unexpected(oid, value))
    }

    pub(crate) fn counter(&self, oid: &Oid) -> Result<u64> {
        let value = self.value(oid)?;
        value.as_u64().ok_or_else(|| unexpected(oid, value))
    }
}

pub(crate) fn unexpected(oid: &Oid, value: &Value) -> Error {
    Error::UnexpectedValue {
        oid: oid.clone(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::Values;
    use crate::error::Error;
    use crate::oid::Oid;
    use crate::session::{MemoryAgent, Value};

    #[test]
    fn test_values_by_oid() {
        let a: Oid = "1.3.6.1.4.1.2021.4.5.0".parse().unwrap();
        let b: Oid = "1.3.6.1.4.1.2021.4.6.0".parse().unwrap();
        let c: Oid = "1.3.6.1.4.1.2021.4.14.0".parse().unwrap();
        let d: Oid = "1.3.6.1.4.1.2021.4.15.0".parse().unwrap();

        let mut agent = MemoryAgent::new()
            .with(a.clone(), Value::Integer(8))
            .with(b.clone(), Value::Counter64(u64::MAX))
            .with(c.clone(), Value::string("eight"));

        let values = Values::fetch(&mut agent, &[d.clone(), c.clone(), b.clone(), a.clone()]).unwrap();
        assert_eq!(values.integer(&a).unwrap(), 8);
        assert_eq!(values.counter(&b).unwrap(), u64::MAX);
        assert!(matches!(values.integer(&c), Err(Error::UnexpectedValue { .. })));
        assert!(matches!(values.integer(&d), Err(Error::MissingValue(_))));
    }

    #[test]
    fn test_exceptions_are_missing_values() {
        let a: Oid = "1.3.6.1.2.1.25.2.3.1.4.1".parse().unwrap();
        let b: Oid = "1.3.6.1.2.1.25.2.3.1.5.1".parse().unwrap();
        let c: Oid = "1.3.6.1.2.1.25.2.3.1.6.1".parse().unwrap();

        let mut agent = MemoryAgent::new()
            .with(a.clone(), Value::NoSuchObject)
            .with(b.clone(), Value::EndOfMibView)
            .with(c.clone(), Value::Null);

        let values = Values::fetch(&mut agent, &[a.clone(), b.clone(), c.clone()]).unwrap();
        assert!(matches!(values.integer(&a), Err(Error::MissingValue(ref oid)) if *oid == a));
        assert!(matches!(values.integer(&b), Err(Error::MissingValue(_))));
        assert!(matches!(values.counter(&c), Err(Error::UnexpectedValue { .. })));
    }
}
