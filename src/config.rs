use std::fmt;

use clap::ValueEnum;

use crate::session::Target;
use crate::threshold::Thresholds;

/// Which metric a run retrieves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Disk,
    Cpu,
    Ram,
    Interface,
}

impl Mode {
    /// Name of the operation reported in front of error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            Mode::Cpu => "getCPU",
            Mode::Disk => "getDisk",
            Mode::Ram => "getRAM",
            Mode::Interface => "getInterface",
        }
    }

    pub fn requires_path(&self) -> bool {
        matches!(self, Mode::Disk | Mode::Interface)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Disk => "disk",
            Mode::Cpu => "cpu",
            Mode::Ram => "ram",
            Mode::Interface => "interface",
        })
    }
}

/// Operating system of the monitored host, which decides the MIB used for disks and memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Os {
    #[default]
    Linux,
    Windows,
}

/// Everything a single probe needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub target: Target,
    pub mode: Mode,
    pub os: Os,
    /// Mount point, drive letter or interface name.
    pub path: Option<String>,
    pub thresholds: Thresholds,
}

impl Config {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }
}
