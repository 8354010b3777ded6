//! Release report sinks

mod clipboard;

pub use clipboard::CommandReportSink;
