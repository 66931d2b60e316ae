use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader};
use chrono::Timelike;
use tracing::debug;

use super::ExtractError;

/// Render every sheet as CSV, in workbook order, each followed by a blank line.
///
/// The container format is sniffed from the bytes, so XLSX, XLS, XLSB and ODS
/// all work regardless of which spreadsheet MIME type the client declared.
pub fn extract_text(data: &[u8]) -> Result<String, ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    let sheet_names = workbook.sheet_names();
    debug!(sheets = sheet_names.len(), "Opened workbook");

    let mut content = String::new();
    for name in sheet_names {
        let range = workbook.worksheet_range(&name)?;
        content.push_str(&sheet_to_csv(&range)?);
        content.push('\n');
    }

    Ok(content)
}

/// One CSV line per row, LF-terminated. Fields are quoted only when they
/// contain a delimiter, quote or line break.
pub fn sheet_to_csv(range: &Range<Data>) -> Result<String, ExtractError> {
    let mut builder = csv::WriterBuilder::new();
    builder.terminator(csv::Terminator::Any(b'\n'));

    let mut out = Vec::new();
    for row in range.rows() {
        let fields: Vec<String> = row.iter().map(render_cell).collect();

        // csv writes a lone empty field as `""`; a blank line is what we want.
        if fields.len() == 1 && fields[0].is_empty() {
            out.push(b'\n');
            continue;
        }

        let mut writer = builder.from_writer(&mut out);
        writer.write_record(&fields)?;
        writer.flush()?;
    }

    Ok(String::from_utf8(out)?)
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => format_number(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => format_datetime(dt),
    }
}

/// ISO date, with the time only when it is not midnight. Durations and
/// serials outside chrono's range stay numeric.
fn format_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return format_number(dt.as_f64());
    }
    match dt.as_datetime() {
        Some(ndt) if ndt.time().num_seconds_from_midnight() == 0 => ndt.format("%Y-%m-%d").to_string(),
        Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format_number(dt.as_f64()),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
