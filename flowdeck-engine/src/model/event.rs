//! Event-log lines from the capture backend.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::filter::Predicate;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    /// Messages emitted by the web layer itself.
    Web,
    Debug,
}

/// One log line. Entries are immutable once emitted; the stream only ever
/// adds or resets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub id: String,
    pub level: LogLevel,
    pub message: String,
}

impl Entity for LogEvent {
    fn id(&self) -> String {
        self.id.clone()
    }
}

/// Predicate accepting only the given levels.
pub fn level_filter(levels: &[LogLevel]) -> Predicate<LogEvent> {
    let enabled: HashSet<LogLevel> = levels.iter().copied().collect();
    Arc::new(move |event: &LogEvent| enabled.contains(&event.level))
}
