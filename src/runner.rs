use std::fmt::Display;

use tracing::debug;

use crate::{Report, State};

/// Turns the outcome of a check into the final line and exit code.
///
/// A failed check prints its error on stdout and exits UNKNOWN unless an [Runner::on_error]
/// handler picks another state.
pub struct Runner<E> {
    on_error: Option<Box<dyn FnOnce(&E) -> State>>,
}

impl<E: Display> Runner<E> {
    pub fn new() -> Self {
        Self { on_error: None }
    }

    pub fn on_error(mut self, f: impl FnOnce(&E) -> State + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn safe_run(self, f: impl FnOnce() -> Result<Report, E>) -> RunnerResult<E> {
        match f() {
            Ok(report) => RunnerResult::Ok(report),
            Err(err) => {
                let state = self
                    .on_error
                    .map(|f| f(&err))
                    .unwrap_or(State::Unknown);

                RunnerResult::Err(state, err)
            }
        }
    }
}

impl<E: Display> Default for Runner<E> {
    fn default() -> Self {
        Self::new()
    }
}

pub enum RunnerResult<E> {
    Ok(Report),
    Err(State, E),
}

impl<E: Display> RunnerResult<E> {
    pub fn state(&self) -> State {
        match self {
            RunnerResult::Ok(report) => report.state(),
            RunnerResult::Err(state, _) => *state,
        }
    }

    /// The line printed by [RunnerResult::print_and_exit].
    pub fn line(&self) -> String {
        match self {
            RunnerResult::Ok(report) => report.to_nagios_string(),
            RunnerResult::Err(_, err) => err.to_string(),
        }
    }

    pub fn print_and_exit(self) -> ! {
        debug!(state = %self.state(), "check finished");
        println!("{}", self.line());
        std::process::exit(self.state().exit_code());
    }
}
