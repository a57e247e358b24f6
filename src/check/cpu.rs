use tracing::debug;

use crate::check::unexpected;
use crate::error::{Error, Result};
use crate::mib::HR_PROCESSOR_LOAD;
use crate::oid::Oid;
use crate::perfdata::{PerfData, Unit};
use crate::report::Report;
use crate::session::Session;
use crate::threshold::Thresholds;

/// Per-core load in percent.
///
/// hrProcessorTable indexes carry no meaning, so cores are numbered 0..n in the order the walk
/// returns them and the agent's index is never shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cpu {
    loads: Vec<i64>,
}

impl Cpu {
    pub fn new(loads: Vec<i64>) -> Result<Self> {
        if loads.is_empty() {
            return Err(Error::NoCpuCores);
        }
        Ok(Cpu { loads })
    }

    /// `(core, load)` pairs in discovery order.
    pub fn cores(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.loads.iter().copied().enumerate()
    }

    /// Integer mean of all cores, truncated.
    pub fn average(&self) -> i64 {
        self.loads.iter().sum::<i64>() / self.loads.len() as i64
    }

    pub fn report(&self, thresholds: &Thresholds) -> Report {
        let average = self.average();
        let state = thresholds.evaluate(average);

        let mut report = Report::new(state, format!("CPU {} - {}%", state, average));
        report.push(
            PerfData::new("CPU average", average)
                .with_unit(Unit::Percentage)
                .with_thresholds(i64::from(thresholds.warning), i64::from(thresholds.critical))
                .with_range(0, 100),
        );
        for (core, load) in self.cores() {
            report.push(
                PerfData::new(&format!("CPU core {}", core), load)
                    .with_unit(Unit::Percentage)
                    .with_range(0, 100),
            );
        }
        report
    }
}

/// Walks hrProcessorLoad and collects one load per row.
pub fn collect<S: Session>(session: &mut S) -> Result<Cpu> {
    let column: Oid = HR_PROCESSOR_LOAD.parse()?;
    let mut loads = Vec::new();

    session.bulk_walk(&column, |binding| -> Result<()> {
        if binding.oid.arcs().len() != column.arcs().len() + 1 {
            return Ok(());
        }
        let load = binding
            .value
            .as_i64()
            .ok_or_else(|| unexpected(&binding.oid, &binding.value))?;
        loads.push(load);
        Ok(())
    })?;

    debug!(cores = loads.len(), "collected processor load");
    Cpu::new(loads)
}

#[cfg(test)]
mod tests {
    use super::{collect, Cpu};
    use crate::error::Error;
    use crate::oid::Oid;
    use crate::session::{MemoryAgent, Value};
    use crate::threshold::Thresholds;
    use crate::State;

    fn agent(loads: &[(u32, i64)]) -> MemoryAgent {
        loads
            .iter()
            .map(|(index, load)| {
                let oid: Oid = format!("1.3.6.1.2.1.25.3.3.1.2.{}", index).parse().unwrap();
                (oid, Value::Integer(*load))
            })
            .collect()
    }

    #[test]
    fn test_cores_are_renumbered() {
        let mut agent = agent(&[(196608, 10), (196609, 20), (196610, 30)]);
        let cpu = collect(&mut agent).unwrap();
        assert_eq!(cpu.cores().collect::<Vec<_>>(), vec![(0, 10), (1, 20), (2, 30)]);
        assert_eq!(cpu.average(), 20);
    }

    #[test]
    fn test_average_truncates() {
        assert_eq!(Cpu::new(vec![1, 2]).unwrap().average(), 1);
        assert_eq!(Cpu::new(vec![99, 100, 100]).unwrap().average(), 99);
        assert_eq!(Cpu::new(vec![0]).unwrap().average(), 0);
        assert_eq!(Cpu::new(vec![5, 6, 6, 6]).unwrap().average(), 5);
    }

    #[test]
    fn test_no_cores() {
        let mut agent = MemoryAgent::new();
        assert!(matches!(collect(&mut agent), Err(Error::NoCpuCores)));
    }

    #[test]
    fn test_non_integer_load() {
        let oid: Oid = "1.3.6.1.2.1.25.3.3.1.2.1".parse().unwrap();
        let mut agent = MemoryAgent::new().with(oid, Value::string("busy"));
        assert!(matches!(collect(&mut agent), Err(Error::UnexpectedValue { .. })));
    }

    #[test]
    fn test_report() {
        let cpu = Cpu::new(vec![10, 20, 30]).unwrap();
        let report = cpu.report(&Thresholds::new(50, 80));
        assert_eq!(report.state(), State::Ok);
        assert_eq!(
            &report.to_nagios_string(),
            "CPU OK - 20%|'CPU average'=20%;50;80;0;100 'CPU core 0'=10%;;;0;100 \
             'CPU core 1'=20%;;;0;100 'CPU core 2'=30%;;;0;100"
        );

        let report = Cpu::new(vec![90, 95]).unwrap().report(&Thresholds::new(80, 100));
        assert_eq!(report.state(), State::Warning);
        assert!(report.to_nagios_string().starts_with("CPU WARNING - 92%|"));
    }
}
