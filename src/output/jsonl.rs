//! JSON-lines emission of records

use crate::Result;
use serde::Serialize;
use std::io::Write;

/// Writes one value as a single JSON line
pub fn write_json_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes every value as its own JSON line and returns how many were written
pub fn write_json_lines<'a, W, T, I>(writer: &mut W, values: I) -> Result<usize>
where
    W: Write,
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut written = 0;
    for value in values {
        write_json_line(writer, value)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
