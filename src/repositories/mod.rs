mod csv_sink;
mod report_repository;

pub use csv_sink::{open_csv_sink, CsvSink, TabularSink};
pub use report_repository::{save_report, ReportRow};
