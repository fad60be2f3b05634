//! 操作日志：只追加，会话期间不清理

use alloc::string::String;
use alloc::vec::Vec;

use vfs::{LogEntry, LogFilter, Operation, Outcome};

#[derive(Debug, Default)]
pub struct OpLog {
    entries: Vec<LogEntry>,
}

impl OpLog {
    pub fn record(
        &mut self,
        timestamp: u64,
        operation: Operation,
        path: &str,
        outcome: Outcome,
        detail: String,
    ) {
        match outcome {
            Outcome::Success => log::info!("{operation} {path}: {detail}"),
            Outcome::Failure => log::warn!("{operation} {path} failed: {detail}"),
        }

        self.entries.push(LogEntry {
            timestamp,
            operation,
            path: path.into(),
            outcome,
            detail,
        });
    }

    #[inline]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn query(&self, filter: &LogFilter) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
