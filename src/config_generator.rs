//! Icinga2 `CheckCommand` generation from the clap definition of the command line.

use std::fmt::{self, Write};

use clap::ArgAction;

/// Prefix of the custom variables the generated command reads its arguments from.
const VAR_PREFIX: &str = "snmp_status";

/// Set this variable to make the binary print its `CheckCommand` instead of checking anything.
const ENV_TRIGGER: &str = "GENERATE_ICINGA_COMMAND";

/// A check command as icinga sees it: one entry per accepted argument.
pub struct IcingaCommand {
    arguments: Vec<CommandArgument>,
}

/// How icinga passes an argument on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Passing {
    /// `-flag value`, taken from a custom variable.
    Value,
    /// bare `-flag`, present when the custom variable is true.
    Switch,
}

struct CommandArgument {
    flag: String,
    var: String,
    help: Option<String>,
    passing: Passing,
    default: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToIcingaCommandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("executable path is not valid UTF-8")]
    InvalidExecutablePath,
    #[error("argument {0} has no long name")]
    MissingLongArgument(String),
    #[error("formatting failed")]
    Format(#[from] fmt::Error),
}

impl IcingaCommand {
    /// Renders the command for the running executable.
    pub fn to_icinga_command(&self, name: &str) -> Result<String, ToIcingaCommandError> {
        let exe = std::env::current_exe()?;
        let exe = exe.to_str().ok_or(ToIcingaCommandError::InvalidExecutablePath)?;

        Ok(self.render(name, exe)?)
    }

    fn render(&self, name: &str, executable: &str) -> Result<String, fmt::Error> {
        let mut out = String::new();

        writeln!(out, "object CheckCommand \"{}\" {{", name)?;
        writeln!(out, "  command = [ \"{}\" ]", executable)?;
        writeln!(out, "  arguments = {{")?;
        for arg in &self.arguments {
            writeln!(out, "  \"{}\" = {{", arg.flag)?;
            match arg.passing {
                Passing::Value => writeln!(out, "    value = \"${}$\"", arg.var)?,
                Passing::Switch => writeln!(out, "    set_if = \"${}$\"", arg.var)?,
            }
            if let Some(help) = &arg.help {
                writeln!(out, "    description = \"{}\"", escape_string(help))?;
            }
            writeln!(out, "  }}")?;
        }
        writeln!(out)?;

        for (var, default) in self
            .arguments
            .iter()
            .filter_map(|arg| arg.default.as_ref().map(|d| (&arg.var, d)))
        {
            writeln!(out, "  vars.{} = \"{}\"", var, escape_string(default))?;
        }
        writeln!(out, "}}")?;

        Ok(out)
    }
}

fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '"' || c == '$' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl TryFrom<&clap::Command> for IcingaCommand {
    type Error = ToIcingaCommandError;

    fn try_from(cmd: &clap::Command) -> Result<Self, Self::Error> {
        let arguments = cmd
            .get_arguments()
            // `-version` only prints and exits
            .filter(|arg| arg.get_id().as_str() != "version")
            .map(|arg| {
                let id = arg.get_id().as_str();
                let long = arg
                    .get_long()
                    .ok_or_else(|| ToIcingaCommandError::MissingLongArgument(id.to_owned()))?;

                let passing = match arg.get_action() {
                    ArgAction::SetTrue => Passing::Switch,
                    _ => Passing::Value,
                };

                let default = match passing {
                    Passing::Switch => None,
                    Passing::Value => arg
                        .get_default_values()
                        .first()
                        .and_then(|v| v.to_str())
                        .filter(|v| !v.is_empty())
                        .map(str::to_owned),
                };

                Ok(CommandArgument {
                    flag: format!("-{}", long),
                    var: format!("{}_{}", VAR_PREFIX, id.replace('-', "_")),
                    help: arg.get_help().map(|s| s.to_string()),
                    passing,
                    default,
                })
            })
            .collect::<Result<_, ToIcingaCommandError>>()?;

        Ok(IcingaCommand { arguments })
    }
}

/// Prints the Icinga command configuration and exits if `GENERATE_ICINGA_COMMAND` is set.
pub fn print_icinga_command_config_if_env_and_exit(
    name: &str,
    cmd: &clap::Command,
) -> Result<(), ToIcingaCommandError> {
    if std::env::var_os(ENV_TRIGGER).is_none() {
        return Ok(());
    }

    let out = IcingaCommand::try_from(cmd)?.to_icinga_command(name)?;

    println!("{}", out.trim());
    std::process::exit(0);
}
