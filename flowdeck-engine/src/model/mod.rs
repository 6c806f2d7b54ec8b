//! Concrete entity types carried by a capture session.

mod columns;
mod event;
mod flow;

pub use columns::flow_columns;
pub use event::{LogEvent, LogLevel, level_filter};
pub use flow::{Address, Connection, Flow, FlowError, Request, Response};
