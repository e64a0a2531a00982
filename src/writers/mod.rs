mod report;

pub use report::ReportWriter;
