use crate::Result;
use crate::error::Error;
use crate::series::point::{DataPoint, Series, Signal};
use std::fs;
use std::path::Path;

/// Load one series file: a JSON array of `[timestamp, value]` pairs.
///
/// Example:
/// [[1700000000, "12.5"], [1700000015, "13"]]
///
/// Points are kept in file order. A blank file loads as an empty series;
/// alignment rejects it later with a message naming the file.
pub fn load_series(signal: Signal, path: &Path) -> Result<Series> {
    // Read fully so the handle is closed before the next file is opened.
    let bytes = fs::read(path).map_err(|source| Error::FileAccess {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;

    let points: Vec<DataPoint> = if bytes.iter().all(u8::is_ascii_whitespace) {
        Vec::new()
    } else {
        serde_json::from_slice(&bytes).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    Ok(Series {
        signal,
        source: path.to_path_buf(),
        points,
    })
}
