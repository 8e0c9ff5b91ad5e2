use std::io::Write;

use sitewatch_core::models::QueryResult;

/// Write a query result as tab-separated values, header row first.
///
/// Results without columns (statements that return nothing) write nothing.
pub fn write_tsv<W: Write>(result: &QueryResult, out: W) -> csv::Result<()> {
    if result.columns.is_empty() {
        return Ok(());
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(out);
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
