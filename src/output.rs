//! Flat text output: one unit per block, separated by blank lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Separator written after every unit.
pub const UNIT_SEPARATOR: &str = "\n\n";

/// Render units as they are written to disk.
pub fn render_units<S: AsRef<str>>(units: &[S]) -> String {
    let capacity = units
        .iter()
        .map(|u| u.as_ref().len() + UNIT_SEPARATOR.len())
        .sum();
    let mut out = String::with_capacity(capacity);
    for unit in units {
        out.push_str(unit.as_ref());
        out.push_str(UNIT_SEPARATOR);
    }
    out
}

/// Split rendered output back into units: blocks separated by blank lines,
/// trimmed, empty blocks dropped.
pub fn split_units(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write units to `path` as UTF-8, replacing any existing file.
pub fn write_units<S, P>(units: &[S], path: P) -> Result<()>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    for unit in units {
        writer.write_all(unit.as_ref().as_bytes())?;
        writer.write_all(UNIT_SEPARATOR.as_bytes())?;
    }
    writer.flush()?;
    log::debug!("Wrote {} unit(s) to {}", units.len(), path.display());
    Ok(())
}
