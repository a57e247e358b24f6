use std::fmt;
use std::process;

use crate::perfdata::ToPerfString;
use crate::State;

/// The single line a check prints: display text, then `|` and the perfdata tuples.
///
/// ```rust
/// # use check_snmp_status::{PerfData, Report, State, Unit};
/// let report = Report::new(State::Warning, "INTERFACE eth1 - Disconnected")
///     .with_perfdata(PerfData::new("Interface In", 123u64).with_unit(Unit::Counter))
///     .with_perfdata(PerfData::new("Interface Out", 456u64).with_unit(Unit::Counter));
/// assert_eq!(
///     &report.to_nagios_string(),
///     "INTERFACE eth1 - Disconnected|'Interface In'=123c 'Interface Out'=456c"
/// );
/// assert_eq!(report.exit_code(), 1);
/// ```
pub struct Report {
    state: State,
    display: String,
    perfdata: Vec<Box<dyn ToPerfString>>,
}

impl Report {
    pub fn new(state: State, display: impl Into<String>) -> Report {
        Report {
            state,
            display: display.into(),
            perfdata: Vec::new(),
        }
    }

    /// Pushes a single perfdata tuple into the report.
    pub fn push<M>(&mut self, metric: M)
    where
        M: 'static + ToPerfString,
    {
        self.perfdata.push(Box::new(metric))
    }

    pub fn with_perfdata<M>(mut self, metric: M) -> Self
    where
        M: 'static + ToPerfString,
    {
        self.push(metric);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Returns a string which nagios understands to determine the service state.
    pub fn to_nagios_string(&self) -> String {
        let mut s = self.display.clone();

        if !self.perfdata.is_empty() {
            s.push('|');
            let tuples: Vec<String> = self.perfdata.iter().map(|m| m.to_perf_string()).collect();
            s.push_str(&tuples.join(" "));
        }

        s
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }

    /// Will print Self::to_nagios_string and exit with the exit code from Self::exit_code
    pub fn print_and_exit(&self) -> ! {
        println!("{}", self.to_nagios_string());
        process::exit(self.exit_code());
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_nagios_string())
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("state", &self.state)
            .field("line", &self.to_nagios_string())
            .finish()
    }
}
