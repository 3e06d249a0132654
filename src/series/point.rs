use serde::Deserialize;
use serde_json::Number;
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Sample time as written in the input file (epoch seconds, int or float).
///
/// The JSON literal is kept so the output carries the same representation.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(Number);

#[cfg(test)]
impl Timestamp {
    pub fn new(n: impl Into<Number>) -> Self {
        Self(n.into())
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.0, &other.0);
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            return x.cmp(&y);
        }
        if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
            return x.cmp(&y);
        }
        // JSON has no NaN, so every number has a finite f64 view.
        let x = a.as_f64().unwrap_or(f64::NAN);
        let y = b.as_f64().unwrap_or(f64::NAN);
        x.total_cmp(&y)
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Measured value of a data point.
///
/// Prometheus encodes sample values as strings (`"0.25"`), so a numeric
/// string is accepted as well and written back verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawReading")]
pub enum Reading {
    Number(Number),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(Number),
    Text(String),
}

impl TryFrom<RawReading> for Reading {
    type Error = String;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        match raw {
            RawReading::Number(n) => Ok(Reading::Number(n)),
            RawReading::Text(s) => match s.trim().parse::<f64>() {
                Ok(_) => Ok(Reading::Text(s)),
                Err(_) => Err(format!("value {:?} is not a number", s)),
            },
        }
    }
}

impl From<f64> for Reading {
    fn from(v: f64) -> Self {
        Number::from_f64(v).map_or_else(|| Reading::Text(v.to_string()), Reading::Number)
    }
}

impl From<i64> for Reading {
    fn from(v: i64) -> Self {
        Reading::Number(v.into())
    }
}

impl From<i32> for Reading {
    fn from(v: i32) -> Self {
        Reading::Number(v.into())
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(n) => n.fmt(f),
            Reading::Text(s) => f.write_str(s),
        }
    }
}

/// One `[timestamp, value]` pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(Timestamp, Reading)")]
pub struct DataPoint {
    pub timestamp: Timestamp,
    pub value: Reading,
}

impl From<(Timestamp, Reading)> for DataPoint {
    fn from((timestamp, value): (Timestamp, Reading)) -> Self {
        Self { timestamp, value }
    }
}

#[cfg(test)]
impl DataPoint {
    pub fn new(timestamp: impl Into<Number>, value: impl Into<Reading>) -> Self {
        Self {
            timestamp: Timestamp::new(timestamp),
            value: value.into(),
        }
    }
}

/// The monitored signal a series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Requests,
    Cpu,
    Memory,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Requests => "requests",
            Signal::Cpu => "cpu",
            Signal::Memory => "memory",
        })
    }
}

/// A loaded series, in file order. Ordering is assumed, not checked.
#[derive(Debug, Clone)]
pub struct Series {
    pub signal: Signal,
    pub source: PathBuf,
    pub points: Vec<DataPoint>,
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} series ({})", self.signal, self.source.display())
    }
}
