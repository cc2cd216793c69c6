//! File formats exchanged with users: element CSV and the text report.

pub mod csv;
pub mod report;
