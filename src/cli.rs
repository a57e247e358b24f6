//! Command line handling. Flags follow the single-dash long form (`-host`, `-mode`, `-W`) that
//! existing service definitions use; the double-dash forms work as well.

use std::ffi::OsString;
use std::process;
use std::time::Duration;

use clap::{CommandFactory, Parser, ValueEnum};
use thiserror::Error;

use crate::config::{Config, Mode, Os};
use crate::session::Target;
use crate::threshold::{Thresholds, DISABLED};
use crate::State;

/// Check the CPU, disk, RAM or interface status of a host over SNMPv2c.
#[derive(Debug, Parser)]
#[command(name = "check_snmp_status", disable_version_flag = true)]
pub struct Cli {
    /// Host IP address, required parameter
    #[arg(long)]
    pub host: Option<String>,

    /// SNMP port
    #[arg(long, default_value_t = 161)]
    pub port: u16,

    /// SNMP community
    #[arg(long, default_value = "public")]
    pub community: String,

    /// Partition mount-point with linux, drive letter with windows or interface name, required with disk and interface mode
    #[arg(long)]
    pub path: Option<String>,

    /// [disk|cpu|ram|interface] Specify the mode to be used
    #[arg(long, default_value = "")]
    pub mode: String,

    /// [linux|windows] Operating system of the target
    #[arg(long, value_enum, ignore_case = true, default_value_t = Os::Linux)]
    pub os: Os,

    /// Percentage that should trigger a warning level
    #[arg(short = 'W', long = "W", default_value_t = DISABLED, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub warning: u8,

    /// Percentage that should trigger a critical level
    #[arg(short = 'C', long = "C", default_value_t = DISABLED, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub critical: u8,

    /// Seconds to wait for each SNMP response
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Log the SNMP exchange on stderr
    #[arg(long)]
    pub verbose: bool,

    /// Using this parameter will display the version number
    #[arg(long)]
    pub version: bool,
}

/// What the command line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Version,
    Check { config: Config, verbose: bool },
}

#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error(transparent)]
    Clap(#[from] clap::Error),
    #[error("-host is required")]
    MissingHost,
    #[error("-path is required with mode {0}")]
    MissingPath(Mode),
    #[error("unknown mode {0:?}")]
    UnknownMode(String),
    #[error("No mode selected")]
    NoMode,
}

impl ArgumentError {
    /// Prints the error (with usage where it helps) and exits UNKNOWN.
    pub fn exit(&self) -> ! {
        match self {
            ArgumentError::Clap(err) => {
                let _ = err.print();
            }
            ArgumentError::NoMode => println!("{}", self),
            other => {
                eprintln!("{}", other);
                eprintln!("{}", Cli::command().render_help());
            }
        }
        process::exit(State::Unknown.exit_code())
    }
}

/// Rewrites Go style `-flag` arguments to `--flag`. Single letter flags (`-W`, `-C`, `-h`) are
/// left alone, and nothing after a bare `--` is touched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(position, arg)| {
            if position == 0 || passthrough {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    arg
                }
                Some(s) if is_single_dash_long(s) => OsString::from(format!("-{}", s)),
                _ => arg,
            }
        })
        .collect()
}

fn is_single_dash_long(arg: &str) -> bool {
    let mut chars = arg.chars();
    chars.next() == Some('-')
        && chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.next().map_or(false, |c| c != '=')
}

/// Parses and validates the command line into an [Invocation].
pub fn parse<I, T>(args: I) -> Result<Invocation, ArgumentError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cli = Cli::try_parse_from(normalize_args(args))?;
    cli.into_invocation()
}

impl Cli {
    pub fn into_invocation(self) -> Result<Invocation, ArgumentError> {
        if self.version {
            return Ok(Invocation::Version);
        }

        let host = match self.host {
            Some(host) if !host.is_empty() => host,
            _ => return Err(ArgumentError::MissingHost),
        };

        if self.mode.is_empty() {
            return Err(ArgumentError::NoMode);
        }
        let mode = Mode::from_str(&self.mode, false)
            .map_err(|_| ArgumentError::UnknownMode(self.mode.clone()))?;

        let path = self.path.filter(|p| !p.is_empty());
        if mode.requires_path() && path.is_none() {
            return Err(ArgumentError::MissingPath(mode));
        }

        Ok(Invocation::Check {
            config: Config {
                target: Target {
                    host,
                    port: self.port,
                    community: self.community,
                    timeout: Duration::from_secs(self.timeout),
                },
                mode,
                os: self.os,
                path,
                thresholds: Thresholds::new(self.warning, self.critical),
            },
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::time::Duration;

    use super::{normalize_args, parse, ArgumentError, Invocation};
    use crate::config::{Mode, Os};
    use crate::threshold::Thresholds;

    fn check(args: &[&str]) -> Result<Invocation, ArgumentError> {
        parse(std::iter::once("check_snmp_status").chain(args.iter().copied()))
    }

    #[test]
    fn test_normalize_args() {
        let args = normalize_args(["prog", "-host", "10.0.0.1", "-W", "80", "-C=90", "--port", "1161", "-mode=disk", "--", "-path"]);
        let expected: Vec<OsString> = ["prog", "--host", "10.0.0.1", "-W", "80", "-C=90", "--port", "1161", "--mode=disk", "--", "-path"]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_defaults() {
        let invocation = check(&["-host", "192.0.2.10", "-mode", "cpu"]).unwrap();
        let Invocation::Check { config, verbose } = invocation else {
            panic!("expected a check invocation");
        };

        assert!(!verbose);
        assert_eq!(&config.target.host, "192.0.2.10");
        assert_eq!(config.target.port, 161);
        assert_eq!(&config.target.community, "public");
        assert_eq!(config.target.timeout, Duration::from_secs(5));
        assert_eq!(config.mode, Mode::Cpu);
        assert_eq!(config.os, Os::Linux);
        assert_eq!(config.path, None);
        assert_eq!(config.thresholds, Thresholds::new(100, 100));
    }

    #[test]
    fn test_full_command_line() {
        let invocation = check(&[
            "-host", "db1", "-port", "1161", "-community", "s3cret", "-mode", "disk", "-os",
            "Windows", "-path", "C", "-W", "80", "-C", "90", "-timeout", "2", "-verbose",
        ])
        .unwrap();
        let Invocation::Check { config, verbose } = invocation else {
            panic!("expected a check invocation");
        };

        assert!(verbose);
        assert_eq!(config.target.port, 1161);
        assert_eq!(&config.target.community, "s3cret");
        assert_eq!(config.target.timeout, Duration::from_secs(2));
        assert_eq!(config.mode, Mode::Disk);
        assert_eq!(config.os, Os::Windows);
        assert_eq!(config.path(), "C");
        assert_eq!(config.thresholds, Thresholds::new(80, 90));
    }

    #[test]
    fn test_version_wins() {
        assert_eq!(check(&["-version"]).unwrap(), Invocation::Version);
        assert_eq!(check(&["--version", "-mode", "cpu"]).unwrap(), Invocation::Version);
    }

    #[test]
    fn test_argument_errors() {
        assert!(matches!(check(&["-mode", "cpu"]), Err(ArgumentError::MissingHost)));
        assert!(matches!(check(&["-host", "h"]), Err(ArgumentError::NoMode)));
        assert!(matches!(check(&["-host", "h", "-mode", ""]), Err(ArgumentError::NoMode)));
        assert!(matches!(check(&["-host", "h", "-mode", "swap"]), Err(ArgumentError::UnknownMode(_))));
        assert!(matches!(check(&["-host", "h", "-mode", "disk"]), Err(ArgumentError::MissingPath(Mode::Disk))));
        assert!(matches!(
            check(&["-host", "h", "-mode", "interface"]),
            Err(ArgumentError::MissingPath(Mode::Interface))
        ));
        assert!(matches!(check(&["-host", "h", "-mode", "cpu", "-os", "solaris"]), Err(ArgumentError::Clap(_))));
        assert!(matches!(check(&["-host", "h", "-mode", "cpu", "-W", "101"]), Err(ArgumentError::Clap(_))));
        assert!(matches!(check(&["-host", "h", "-mode", "cpu", "-timeout", "0"]), Err(ArgumentError::Clap(_))));
    }

    #[test]
    fn test_ram_needs_no_path() {
        assert!(check(&["-host", "h", "-mode", "ram", "-os", "WINDOWS"]).is_ok());
    }
}
