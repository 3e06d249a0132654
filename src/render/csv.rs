use crate::Result;
use crate::align::MergedRow;
use crate::error::Error;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

pub const HEADER: [&str; 4] = ["timestamp", "cpu_seconds", "memory_bytes", "requests_rate"];

/// Write merged rows as CSV, replacing whatever is at `path`.
///
/// The rows go to a temporary file next to `path` first, which is renamed
/// into place once fully flushed. On any failure the temporary file is
/// removed and `path` is left as it was.
pub fn write_csv(rows: &[MergedRow<'_>], path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| file_access("create", path, e))?;
    {
        let mut out = ::csv::WriterBuilder::new()
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(tmp.as_file_mut());

        let write_err = |e: ::csv::Error| file_access("write", path, io::Error::from(e));
        out.write_record(HEADER).map_err(write_err)?;
        for row in rows {
            out.write_record(row.fields()).map_err(write_err)?;
        }
        out.flush().map_err(|e| file_access("write", path, e))?;
    }

    tmp.persist(path).map_err(|e| file_access("replace", path, e.error))?;
    Ok(())
}

fn file_access(action: &'static str, path: &Path, source: io::Error) -> Error {
    Error::FileAccess {
        action,
        path: path.to_path_buf(),
        source,
    }
}
