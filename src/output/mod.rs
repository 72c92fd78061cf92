// src/output/mod.rs
// Where results end up. Only CSV for now.

mod csv;

pub use self::csv::CsvSink;
