use crate::error::SinkError;
use crate::repositories::TabularSink;
use log::info;

/// A row of one of the generated reports.
pub trait ReportRow {
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

/// Writes the header, every row, then flushes. Returns the number of data rows.
pub fn save_report<R, S>(sink: &mut S, rows: &[R]) -> Result<usize, SinkError>
where
    R: ReportRow,
    S: TabularSink + ?Sized,
{
    sink.write_header(R::HEADER)?;
    for row in rows {
        sink.write_row(&row.fields())?;
    }
    sink.flush()?;

    info!("Wrote {} rows", rows.len());
    Ok(rows.len())
}
