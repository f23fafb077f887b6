use crate::error::SinkError;
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Destination for one tabular report.
pub trait TabularSink {
    fn write_row(&mut self, fields: &[String]) -> Result<(), SinkError>;

    fn write_header(&mut self, header: &[&str]) -> Result<(), SinkError> {
        let fields: Vec<String> = header.iter().map(|field| field.to_string()).collect();
        self.write_row(&fields)
    }

    /// Pushes buffered rows to the destination and reports any write error.
    fn flush(&mut self) -> Result<(), SinkError>;
}

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Returns the underlying writer after flushing what is buffered.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Flush(e.into_error()))
    }
}

impl<W: Write> TabularSink for CsvSink<W> {
    fn write_row(&mut self, fields: &[String]) -> Result<(), SinkError> {
        self.writer.write_record(fields)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(SinkError::Flush)
    }
}

/// Creates (or truncates) `path` and wraps it in a CSV sink.
pub fn open_csv_sink(path: &Path) -> Result<CsvSink<File>, SinkError> {
    let file = File::create(path).map_err(|source| SinkError::Open {
        path: path.display().to_string(),
        source,
    })?;
    info!("Writing report to {}", path.display());
    Ok(CsvSink::new(file))
}
