use std::process;

use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

use check_snmp_status::cli::{self, Cli, Invocation};
use check_snmp_status::config_generator::print_icinga_command_config_if_env_and_exit;
use check_snmp_status::{run, Runner, State, VERSION};

fn main() {
    if let Err(err) = print_icinga_command_config_if_env_and_exit("check_snmp_status", &Cli::command()) {
        eprintln!("{}", err);
        process::exit(State::Unknown.exit_code());
    }

    let (config, verbose) = match cli::parse(std::env::args_os()) {
        Ok(Invocation::Version) => {
            println!("check_snmp_status version {}", VERSION);
            process::exit(State::Unknown.exit_code());
        }
        Ok(Invocation::Check { config, verbose }) => (config, verbose),
        Err(err) => err.exit(),
    };

    init_logging(verbose);

    Runner::new().safe_run(|| run(&config)).print_and_exit()
}

/// Logs go to stderr; stdout carries only the check result.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
