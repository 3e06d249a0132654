//! Alignment: cut the three series to a common start and zip them into rows.
//!
//! Rows are built by position, not by matching timestamps. The collectors
//! sample on one shared fixed interval, so once every series starts at the
//! same timestamp, index `i` refers to the same sample time in each of them.
//! When that assumption breaks the rows are still produced, and
//! [`warn_anomalies`] reports the drift on stderr.

use crate::Result;
use crate::error::Error;
use crate::series::{DataPoint, Reading, Series, Timestamp};

/// A series cut down to the points at or after the alignment timestamp.
#[derive(Debug, Clone, Copy)]
pub struct Aligned<'a> {
    pub series: &'a Series,
    pub points: &'a [DataPoint],
}

impl Aligned<'_> {
    /// Number of leading points dropped by truncation.
    pub fn dropped(&self) -> usize {
        self.series.points.len() - self.points.len()
    }
}

/// One output line.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow<'a> {
    pub timestamp: &'a Timestamp,
    pub cpu_seconds: &'a Reading,
    pub memory_bytes: &'a Reading,
    pub requests_rate: &'a Reading,
}

impl MergedRow<'_> {
    /// Fields in output column order.
    pub fn fields(&self) -> [String; 4] {
        [
            self.timestamp.to_string(),
            self.cpu_seconds.to_string(),
            self.memory_bytes.to_string(),
            self.requests_rate.to_string(),
        ]
    }
}

/// The latest of the three starting timestamps.
///
/// Errors if any series is empty: it has no start to align on.
pub fn alignment_timestamp(requests: &Series, cpu: &Series, memory: &Series) -> Result<Timestamp> {
    let a = start(requests)?;
    let b = start(cpu)?;
    let c = start(memory)?;
    Ok(a.max(b).max(c).clone())
}

fn start(series: &Series) -> Result<&Timestamp> {
    match series.points.first() {
        Some(p) => Ok(&p.timestamp),
        None => Err(Error::Alignment(format!("{} has no data points", series)).into()),
    }
}

/// Drop leading points strictly before `at`.
///
/// Stops at the first point with timestamp `>= at`; that point and
/// everything after it are kept as-is.
pub fn truncate<'a>(points: &'a [DataPoint], at: &Timestamp) -> &'a [DataPoint] {
    let keep_from = points
        .iter()
        .position(|p| p.timestamp >= *at)
        .unwrap_or(points.len());
    &points[keep_from..]
}

pub fn align<'a>(series: &'a Series, at: &Timestamp) -> Aligned<'a> {
    Aligned {
        series,
        points: truncate(&series.points, at),
    }
}

/// Zip aligned series into rows, one per remaining requests point.
///
/// Errors before producing anything if cpu or memory is shorter than
/// requests. Extra trailing cpu/memory points are left out.
pub fn merge<'a>(
    requests: &Aligned<'a>,
    cpu: &Aligned<'a>,
    memory: &Aligned<'a>,
) -> Result<Vec<MergedRow<'a>>> {
    let n = requests.points.len();
    for other in [cpu, memory] {
        if other.points.len() < n {
            return Err(Error::Alignment(format!(
                "{} has {} points after alignment but {} has {}",
                other.series,
                other.points.len(),
                requests.series,
                n
            ))
            .into());
        }
    }

    let rows = requests
        .points
        .iter()
        .zip(cpu.points)
        .zip(memory.points)
        .map(|((r, c), m)| MergedRow {
            timestamp: &r.timestamp,
            cpu_seconds: &c.value,
            memory_bytes: &m.value,
            requests_rate: &r.value,
        })
        .collect();

    Ok(rows)
}

/// Rows whose cpu or memory sample time differs from the requests one.
#[derive(Debug, Clone, PartialEq)]
pub struct Drift {
    pub rows: usize,
    pub first_index: usize,
}

pub fn drift(requests: &Aligned<'_>, cpu: &Aligned<'_>, memory: &Aligned<'_>) -> Option<Drift> {
    let mut out: Option<Drift> = None;
    for (i, ((r, c), m)) in requests
        .points
        .iter()
        .zip(cpu.points)
        .zip(memory.points)
        .enumerate()
    {
        if c.timestamp != r.timestamp || m.timestamp != r.timestamp {
            out.get_or_insert(Drift {
                rows: 0,
                first_index: i,
            })
            .rows += 1;
        }
    }
    out
}

/// Report non-fatal oddities of a merge on stderr.
pub fn warn_anomalies(requests: &Aligned<'_>, cpu: &Aligned<'_>, memory: &Aligned<'_>) {
    let n = requests.points.len();
    if n == 0 {
        eprintln!(
            "WARN: {} has no points at or after the alignment timestamp; output has no rows",
            requests.series
        );
    }

    for other in [cpu, memory] {
        let extra = other.points.len().saturating_sub(n);
        if extra > 0 {
            eprintln!(
                "WARN: {} has {} trailing point(s) beyond the requests series; they are not written",
                other.series, extra
            );
        }
    }

    if let Some(d) = drift(requests, cpu, memory) {
        let i = d.first_index;
        eprintln!(
            "WARN: {} row(s) combine samples with different timestamps; first at row {} \
             (requests {}, cpu {}, memory {})",
            d.rows,
            i,
            requests.points[i].timestamp,
            cpu.points[i].timestamp,
            memory.points[i].timestamp
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Signal;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn series(signal: Signal, points: &[(i64, f64)]) -> Series {
        Series {
            signal,
            source: PathBuf::from(format!("{}.json", signal)),
            points: points.iter().map(|&(t, v)| DataPoint::new(t, v)).collect(),
        }
    }

    fn stamps(points: &[DataPoint]) -> Vec<String> {
        points.iter().map(|p| p.timestamp.to_string()).collect()
    }

    fn is_alignment_error(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<Error>(), Some(Error::Alignment(_)))
    }

    #[test]
    fn alignment_timestamp_is_latest_start() {
        let cases = [(100, 99, 100), (5, 7, 6), (3, 2, 1), (10, 10, 10)];
        for (a, b, c) in cases {
            let r = series(Signal::Requests, &[(a, 1.0)]);
            let cp = series(Signal::Cpu, &[(b, 1.0)]);
            let m = series(Signal::Memory, &[(c, 1.0)]);
            let at = alignment_timestamp(&r, &cp, &m).unwrap();
            assert_eq!(at, Timestamp::new(a.max(b).max(c)));
        }
    }

    #[test]
    fn alignment_timestamp_with_float_start() {
        let r = series(Signal::Requests, &[(100, 1.0)]);
        let cp = series(Signal::Cpu, &[(99, 1.0)]);
        let mut m = series(Signal::Memory, &[]);
        m.points.push(serde_json::from_str("[100.5, 2]").unwrap());

        let at = alignment_timestamp(&r, &cp, &m).unwrap();
        assert_eq!(at.to_string(), "100.5");
    }

    #[test]
    fn empty_series_has_no_alignment_timestamp() {
        let full = series(Signal::Requests, &[(1, 1.0)]);
        let empty = series(Signal::Memory, &[]);
        let err = alignment_timestamp(&full, &full, &empty).unwrap_err();

        assert!(is_alignment_error(&err));
        assert_eq!(err.to_string(), "memory series (memory.json) has no data points");
    }

    #[test]
    fn truncate_keeps_contiguous_suffix_at_or_after() {
        let s = series(Signal::Cpu, &[(97, 0.0), (98, 0.0), (99, 0.0), (100, 0.0), (101, 0.0)]);
        let at = Timestamp::new(99);
        let kept = truncate(&s.points, &at);

        assert_eq!(stamps(kept), vec!["99", "100", "101"]);
        assert!(kept.iter().all(|p| p.timestamp >= at));
        let removed = &s.points[..s.points.len() - kept.len()];
        assert!(removed.iter().all(|p| p.timestamp < at));
    }

    #[test]
    fn truncate_stops_at_first_kept_point() {
        // Out-of-order tail is left alone.
        let s = series(Signal::Cpu, &[(1, 0.0), (5, 0.0), (2, 0.0), (6, 0.0)]);
        let kept = truncate(&s.points, &Timestamp::new(3));
        assert_eq!(stamps(kept), vec!["5", "2", "6"]);
    }

    #[test]
    fn truncate_edges() {
        let s = series(Signal::Cpu, &[(1, 0.0), (2, 0.0)]);
        assert!(truncate(&s.points, &Timestamp::new(3)).is_empty());
        assert_eq!(truncate(&s.points, &Timestamp::new(1)).len(), 2);
        assert!(truncate(&[], &Timestamp::new(1)).is_empty());
    }

    #[test]
    fn truncate_is_idempotent() {
        let s = series(Signal::Cpu, &[(1, 0.0), (2, 0.0), (3, 0.0), (4, 0.0)]);
        for t in 0..6 {
            let at = Timestamp::new(t);
            let once = truncate(&s.points, &at);
            let twice = truncate(once, &at);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn merge_is_positional() {
        let r = series(Signal::Requests, &[(100, 5.0), (101, 6.0), (102, 7.0)]);
        let cp = series(Signal::Cpu, &[(99, 1.0), (100, 1.1), (101, 1.2), (102, 1.3)]);
        let m = series(Signal::Memory, &[(100, 200.0), (101, 210.0), (102, 220.0)]);
        let at = alignment_timestamp(&r, &cp, &m).unwrap();
        let (r, cp, m) = (align(&r, &at), align(&cp, &at), align(&m, &at));

        assert_eq!(cp.dropped(), 1);
        assert_eq!(r.dropped(), 0);

        let rows = merge(&r, &cp, &m).unwrap();
        assert_eq!(rows.len(), r.points.len());
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.timestamp, &r.points[i].timestamp);
            assert_eq!(row.requests_rate, &r.points[i].value);
            assert_eq!(row.cpu_seconds, &cp.points[i].value);
            assert_eq!(row.memory_bytes, &m.points[i].value);
        }
        assert_eq!(rows[0].fields(), ["100", "1.1", "200.0", "5.0"]);
        assert_eq!(drift(&r, &cp, &m), None);
    }

    #[test]
    fn merge_ignores_extra_trailing_points() {
        let r = series(Signal::Requests, &[(1, 1.0), (2, 2.0)]);
        let cp = series(Signal::Cpu, &[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
        let m = series(Signal::Memory, &[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let at = Timestamp::new(1);

        let rows = merge(&align(&r, &at), &align(&cp, &at), &align(&m, &at)).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn merge_rejects_short_series() {
        let r = series(Signal::Requests, &[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let cp = series(Signal::Cpu, &[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let m = series(Signal::Memory, &[(1, 1.0), (2, 2.0)]);
        let at = Timestamp::new(1);

        let err = merge(&align(&r, &at), &align(&cp, &at), &align(&m, &at)).unwrap_err();
        assert!(is_alignment_error(&err));
        assert_eq!(
            err.to_string(),
            "memory series (memory.json) has 2 points after alignment but \
             requests series (requests.json) has 3"
        );
    }

    #[test]
    fn drift_counts_mismatched_rows() {
        let r = series(Signal::Requests, &[(10, 1.0), (11, 1.0), (12, 1.0)]);
        let cp = series(Signal::Cpu, &[(10, 1.0), (12, 1.0), (13, 1.0)]);
        let m = series(Signal::Memory, &[(10, 1.0), (11, 1.0), (13, 1.0)]);
        let at = Timestamp::new(10);

        let d = drift(&align(&r, &at), &align(&cp, &at), &align(&m, &at));
        assert_eq!(
            d,
            Some(Drift {
                rows: 2,
                first_index: 1
            })
        );
    }
}
