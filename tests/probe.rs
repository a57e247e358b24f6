use std::time::Duration;

use anyhow::Result;

use check_snmp_status::cli::{self, Invocation};
use check_snmp_status::{probe, Config, MemoryAgent, Oid, Runner, State, Value};

fn oid(s: &str) -> Oid {
    s.parse().unwrap()
}

/// Parses a command line the way the binary does.
fn config(args: &[&str]) -> Result<Config> {
    let argv = std::iter::once("check_snmp_status")
        .chain(["-host", "192.0.2.7"])
        .chain(args.iter().copied());
    match cli::parse(argv)? {
        Invocation::Check { config, .. } => Ok(config),
        Invocation::Version => anyhow::bail!("unexpected version invocation"),
    }
}

/// Runs a probe and returns the printed line and exit code.
fn run(args: &[&str], agent: &mut MemoryAgent) -> Result<(String, i32)> {
    let config = config(args)?;
    let result = Runner::new().safe_run(|| probe(&config, agent));
    Ok((result.line(), result.state().exit_code()))
}

fn storage(agent: MemoryAgent, index: u32, descr: &str, units: i64, size: i64, used: i64) -> MemoryAgent {
    let column = |c: u32| oid(&format!("1.3.6.1.2.1.25.2.3.1.{}.{}", c, index));
    agent
        .with(column(3), Value::string(descr))
        .with(column(4), Value::Integer(units))
        .with(column(5), Value::Integer(size))
        .with(column(6), Value::Integer(used))
}

#[test]
fn linux_disk_healthy() -> Result<()> {
    let agent = storage(MemoryAgent::new(), 1, "Physical memory", 1024, 4_000_000, 1_000_000);
    let agent = storage(agent, 31, "/", 4096, 2_000_000, 1_500_000);
    let mut agent = storage(agent, 36, "/var", 4096, 1_000_000, 200_000);

    let (line, code) = run(&["-mode", "disk", "-path", "/var", "-W", "80", "-C", "95"], &mut agent)?;
    assert_eq!(code, 0);
    assert_eq!(
        line,
        "DISK /var OK - 20% used|'Disk'=819200000B;;;0;4096000000 'Disk %'=20%;80;95;0;100"
    );
    Ok(())
}

#[test]
fn windows_disk_critical() -> Result<()> {
    let agent = storage(MemoryAgent::new(), 1, "A:\\", 0, 0, 0);
    let mut agent = storage(agent, 2, "C:\\ Label: Sys Serial Number A", 4096, 100, 98);

    let (line, code) = run(&["-mode", "disk", "-os", "Windows", "-path", "C", "-W", "80", "-C", "90"], &mut agent)?;
    assert_eq!(code, 2);
    assert_eq!(
        line,
        "DISK C CRITICAL - 98% used|'Disk'=401408B;;;0;409600 'Disk %'=98%;80;90;0;100"
    );
    Ok(())
}

#[test]
fn linux_ram_warning() -> Result<()> {
    let mut agent = MemoryAgent::new()
        .with(oid("1.3.6.1.4.1.2021.4.5.0"), Value::Integer(8_000_000))
        .with(oid("1.3.6.1.4.1.2021.4.6.0"), Value::Integer(2_000_000))
        .with(oid("1.3.6.1.4.1.2021.4.14.0"), Value::Integer(500_000))
        .with(oid("1.3.6.1.4.1.2021.4.15.0"), Value::Integer(500_000));

    let (line, code) = run(&["-mode", "ram", "-W", "60", "-C", "90"], &mut agent)?;
    assert_eq!(code, 1);
    assert_eq!(
        line,
        "RAM WARNING - 62% used|'RAM'=5000000KB;;;0;8000000 'RAM %'=62%;60;90;0;100"
    );
    Ok(())
}

#[test]
fn windows_ram_in_bytes() -> Result<()> {
    let agent = storage(MemoryAgent::new(), 3, "Virtual Memory", 65536, 2000, 1900);
    let mut agent = storage(agent, 4, "Physical Memory", 65536, 1000, 950);

    let (line, code) = run(&["-mode", "ram", "-os", "windows", "-W", "80", "-C", "90"], &mut agent)?;
    assert_eq!(code, 2);
    assert_eq!(
        line,
        "RAM CRITICAL - 95% used|'RAM'=62259200B;;;0;65536000 'RAM %'=95%;80;90;0;100"
    );
    Ok(())
}

#[test]
fn cpu_average_of_three_cores() -> Result<()> {
    let mut agent = MemoryAgent::new()
        .with(oid("1.3.6.1.2.1.25.3.3.1.2.768"), Value::Integer(10))
        .with(oid("1.3.6.1.2.1.25.3.3.1.2.769"), Value::Integer(20))
        .with(oid("1.3.6.1.2.1.25.3.3.1.2.770"), Value::Integer(30));

    let (line, code) = run(&["-mode", "cpu", "-W", "50", "-C", "80"], &mut agent)?;
    assert_eq!(code, 0);
    assert_eq!(
        line,
        "CPU OK - 20%|'CPU average'=20%;50;80;0;100 'CPU core 0'=10%;;;0;100 \
         'CPU core 1'=20%;;;0;100 'CPU core 2'=30%;;;0;100"
    );
    Ok(())
}

#[test]
fn interface_disconnected() -> Result<()> {
    let mut agent = MemoryAgent::new()
        .with(oid("1.3.6.1.2.1.31.1.1.1.1.1"), Value::string("lo"))
        .with(oid("1.3.6.1.2.1.31.1.1.1.1.3"), Value::string("eth1"))
        .with(oid("1.3.6.1.2.1.31.1.1.1.6.3"), Value::Counter64(123))
        .with(oid("1.3.6.1.2.1.31.1.1.1.10.3"), Value::Counter64(456))
        .with(oid("1.3.6.1.2.1.31.1.1.1.17.3"), Value::Integer(2));

    let (line, code) = run(&["-mode", "interface", "-path", "eth1"], &mut agent)?;
    assert_eq!(code, 1);
    assert_eq!(line, "INTERFACE eth1 - Disconnected|'Interface In'=123c 'Interface Out'=456c");
    Ok(())
}

#[test]
fn disk_not_found() -> Result<()> {
    let agent = storage(MemoryAgent::new(), 31, "/", 4096, 10, 1);
    let mut agent = storage(agent, 32, "/boot", 1024, 10, 1);

    let (line, code) = run(&["-mode", "disk", "-path", "/nonexistent"], &mut agent)?;
    assert_eq!(code, 3);
    assert_eq!(line, "getDisk error: Disk /nonexistent not found");
    Ok(())
}

#[test]
fn interface_not_found() -> Result<()> {
    let mut agent = MemoryAgent::new().with(oid("1.3.6.1.2.1.31.1.1.1.1.1"), Value::string("lo"));

    let (line, code) = run(&["-mode", "interface", "-path", "eth0"], &mut agent)?;
    assert_eq!(code, 3);
    assert_eq!(line, "getInterface error: Interface eth0 not found");
    Ok(())
}

#[test]
fn no_cpu_cores() -> Result<()> {
    let mut agent = MemoryAgent::new();

    let (line, code) = run(&["-mode", "cpu"], &mut agent)?;
    assert_eq!(code, 3);
    assert_eq!(line, "getCPU error: No CPU cores found");
    Ok(())
}

#[test]
fn transport_errors_are_unknown() -> Result<()> {
    let mut agent = MemoryAgent::new().unreachable();
    let (line, code) = run(&["-mode", "ram"], &mut agent)?;
    assert_eq!(code, 3);
    assert_eq!(line, "getRAM error: request timed out after 5s");

    // the walk breaks off after the matching row was seen
    let agent = storage(MemoryAgent::new(), 1, "/", 4096, 10, 1);
    let agent = storage(agent, 2, "/var", 4096, 10, 1);
    let mut agent = storage(agent, 3, "/home", 4096, 10, 1).fail_after(2);
    let (line, code) = run(&["-mode", "disk", "-path", "/var"], &mut agent)?;
    assert_eq!(code, 3);
    assert_eq!(line, "getDisk error: request timed out after 5s");
    Ok(())
}

#[test]
fn default_thresholds_never_alert() -> Result<()> {
    let mut agent = MemoryAgent::new()
        .with(oid("1.3.6.1.2.1.25.3.3.1.2.1"), Value::Integer(100))
        .with(oid("1.3.6.1.2.1.25.3.3.1.2.2"), Value::Integer(100));

    let config = config(&["-mode", "cpu"])?;
    assert_eq!(config.target.timeout, Duration::from_secs(5));

    let report = probe(&config, &mut agent)?;
    assert_eq!(report.state(), State::Ok);
    assert_eq!(
        &report.to_nagios_string(),
        "CPU OK - 100%|'CPU average'=100%;100;100;0;100 'CPU core 0'=100%;;;0;100 'CPU core 1'=100%;;;0;100"
    );
    Ok(())
}
