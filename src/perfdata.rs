use std::fmt;

/// The purpose of ToPerfString is only so one can define custom representations of custom types
/// without using the ToString trait so we don't interfere with that.
///
/// Also used internally for generation of the final output.
pub trait ToPerfString {
    fn to_perf_string(&self) -> String;
}

impl_to_perf_string_on_to_string!(u8, u16, u32, u64, usize);
impl_to_perf_string_on_to_string!(i8, i16, i32, i64);
impl_to_perf_string_on_to_string!(String);

impl<T> ToPerfString for Option<T>
where
    T: ToPerfString,
{
    fn to_perf_string(&self) -> String {
        match self {
            Some(ref s) => s.to_perf_string(),
            None => String::new(),
        }
    }
}

/// Unit of measurement appended to a perfdata value.
#[derive(Clone, Debug, PartialEq)]
pub enum Unit {
    Percentage,
    Bytes,
    KiloBytes,
    Counter,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Unit::Percentage => "%",
            Unit::Bytes => "B",
            Unit::KiloBytes => "KB",
            Unit::Counter => "c",
        })
    }
}

/// One `'label'=value[unit];warn;crit;min;max` tuple.
///
/// ```rust
/// # use check_snmp_status::{PerfData, ToPerfString, Unit};
/// let perf = PerfData::new("Disk %", 20)
///     .with_unit(Unit::Percentage)
///     .with_thresholds(80, 95)
///     .with_range(0, 100);
/// assert_eq!(&perf.to_perf_string(), "'Disk %'=20%;80;95;0;100");
/// ```
#[derive(Clone, Debug)]
pub struct PerfData<T>
where
    T: ToPerfString + Clone,
{
    label: String,
    value: T,
    warning: Option<T>,
    critical: Option<T>,
    min: Option<T>,
    max: Option<T>,
    unit: Option<Unit>,
}

impl<T> PerfData<T>
where
    T: ToPerfString + Clone,
{
    pub fn new(label: &str, value: T) -> Self {
        PerfData {
            label: label.to_owned(),
            value,
            warning: None,
            critical: None,
            min: None,
            max: None,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_thresholds(mut self, warning: T, critical: T) -> Self {
        self.warning = Some(warning);
        self.critical = Some(critical);
        self
    }

    pub fn with_range(mut self, min: T, max: T) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

impl<T> ToPerfString for PerfData<T>
where
    T: ToPerfString + Clone,
{
    fn to_perf_string(&self) -> String {
        // replace `=` and quote `'`, the label is always enclosed in single quotes
        let label = self.label.replace('=', "_").replace('\'', "''");
        let unit = self.unit.as_ref().map(Unit::to_string).unwrap_or_default();

        metric_string!(
            format!("'{}'", label),
            format!("{}{}", self.value.to_perf_string(), unit),
            self.warning,
            self.critical,
            self.min,
            self.max
        )
    }
}
