//! CSV export of projected rows.
//!
//! One record per row, no header, columns in this fixed order: display date,
//! balance, cumulative income, cumulative expenses, day expenses, day income,
//! day net, diff from start, `;`-joined names. Output is byte-stable for a
//! given row sequence.

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::{currency::format_cents, ledger::format_display_date, projection::ResultRow};

pub const NAME_SEPARATOR: &str = ";";

/// Renders one row as its CSV fields.
pub fn row_fields(row: &ResultRow) -> [String; 9] {
    [
        format_display_date(row.date),
        format_cents(row.balance),
        format_cents(row.cumulative_income),
        format_cents(row.cumulative_expenses),
        format_cents(row.day_expenses),
        format_cents(row.day_income),
        format_cents(row.day_net),
        format_cents(row.diff_from_start),
        row.names.join(NAME_SEPARATOR),
    ]
}

/// Streams `rows` as CSV into `writer`.
pub fn write_rows<W: Write>(rows: &[ResultRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);
    for row in rows {
        csv_writer.write_record(row_fields(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Renders `rows` as a CSV string.
pub fn to_csv_string(rows: &[ResultRow]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_rows(rows, &mut buffer)?;
    // Every field is built from `String`s, so the buffer is valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
