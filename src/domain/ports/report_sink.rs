//! Report Sink Port
//!
//! Destination for the aggregated release report (clipboard, chat relay).

use crate::error::RolloutResult;

pub trait ReportSink: Send + Sync {
    fn publish(&self, text: &str) -> RolloutResult<()>;
}

/// Sink used when no destination is configured
pub struct NoopReportSink;

impl ReportSink for NoopReportSink {
    fn publish(&self, _text: &str) -> RolloutResult<()> {
        Ok(())
    }
}
