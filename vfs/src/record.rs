//! 操作日志的记录

use alloc::string::String;

use derive_more::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: u64,
    pub operation: Operation,
    pub path: String,
    pub outcome: Outcome,
    pub detail: String,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    #[display(fmt = "FORMAT")]
    Format,
    #[display(fmt = "CREATE_DIR")]
    CreateDirectory,
    #[display(fmt = "CREATE_FILE")]
    CreateFile,
    #[display(fmt = "DELETE_FILE")]
    DeleteFile,
    #[display(fmt = "DELETE_DIR")]
    DeleteDirectory,
    #[display(fmt = "SET_STRATEGY")]
    SetStrategy,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    #[display(fmt = "SUCCESS")]
    Success,
    #[display(fmt = "FAILURE")]
    Failure,
}

/// 日志查询条件，`None`表示不限
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// 起始时间（含）
    pub since: Option<u64>,
    /// 截止时间（含）
    pub until: Option<u64>,
    pub operation: Option<Operation>,
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.since.is_none_or(|since| entry.timestamp >= since)
            && self.until.is_none_or(|until| entry.timestamp <= until)
            && self.operation.is_none_or(|op| entry.operation == op)
    }
}
