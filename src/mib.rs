//! Object identifiers read by the checks.

// HOST-RESOURCES-MIB::hrStorageTable
pub const HR_STORAGE_DESCR: &str = "1.3.6.1.2.1.25.2.3.1.3";
pub const HR_STORAGE_ALLOCATION_UNITS: &str = "1.3.6.1.2.1.25.2.3.1.4";
pub const HR_STORAGE_SIZE: &str = "1.3.6.1.2.1.25.2.3.1.5";
pub const HR_STORAGE_USED: &str = "1.3.6.1.2.1.25.2.3.1.6";

// HOST-RESOURCES-MIB::hrProcessorTable
pub const HR_PROCESSOR_LOAD: &str = "1.3.6.1.2.1.25.3.3.1.2";

// UCD-SNMP-MIB::memory, values in kB
pub const UCD_MEM_TOTAL_REAL: &str = "1.3.6.1.4.1.2021.4.5.0";
pub const UCD_MEM_AVAIL_REAL: &str = "1.3.6.1.4.1.2021.4.6.0";
pub const UCD_MEM_BUFFER: &str = "1.3.6.1.4.1.2021.4.14.0";
pub const UCD_MEM_CACHED: &str = "1.3.6.1.4.1.2021.4.15.0";

// IF-MIB::ifXTable
pub const IF_NAME: &str = "1.3.6.1.2.1.31.1.1.1.1";
pub const IF_HC_IN_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.6";
pub const IF_HC_OUT_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.10";
pub const IF_CONNECTOR_PRESENT: &str = "1.3.6.1.2.1.31.1.1.1.17";

/// hrStorageDescr of the physical memory row on Windows agents.
pub const PHYSICAL_MEMORY: &str = "Physical Memory";

/// hrStorageDescr of a Windows drive, e.g. `C:\ Label: System  Serial Number 1234abcd`.
/// `{label}` is replaced by the escaped drive letter.
pub const WINDOWS_DRIVE_PATTERN: &str = r"{label}:\\.*Label:.*Serial Number.*";
