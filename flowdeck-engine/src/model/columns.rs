//! Comparators for the flow table columns.
//!
//! Each comparator returns the ascending ordering and places flows lacking
//! the relevant field deterministically: no response sorts below any
//! status, an unfinished flow's duration counts as infinite (the "..."
//! placeholder keeps counting up, so it sinks below every completed flow),
//! and an absent response contributes zero bytes to the size total.

use std::cmp::Ordering;

use crate::model::flow::Flow;
use crate::sort::SortRegistry;

/// The sortable columns of the flow table, registered under their column
/// names: `tls`, `path`, `method`, `status`, `size`, `time`.
pub fn flow_columns() -> SortRegistry<Flow> {
    let mut registry = SortRegistry::new();
    registry.register("tls", by_scheme);
    registry.register("path", by_path);
    registry.register("method", by_method);
    registry.register("status", by_status);
    registry.register("size", by_size);
    registry.register("time", by_duration);
    registry
}

/// `"http"` before `"https"`.
fn by_scheme(a: &Flow, b: &Flow) -> Ordering {
    a.request.scheme.cmp(&b.request.scheme)
}

/// Lexicographic on the display URL.
fn by_path(a: &Flow, b: &Flow) -> Ordering {
    a.request.pretty_url().cmp(&b.request.pretty_url())
}

fn by_method(a: &Flow, b: &Flow) -> Ordering {
    a.request.method.cmp(&b.request.method)
}

/// Numeric on the status code; a flow with no response sorts below any
/// flow with one.
fn by_status(a: &Flow, b: &Flow) -> Ordering {
    let status = |flow: &Flow| flow.response.as_ref().map(|r| r.status_code);
    status(a).cmp(&status(b))
}

fn by_size(a: &Flow, b: &Flow) -> Ordering {
    a.total_size().cmp(&b.total_size())
}

/// Numeric on response-end minus request-start; unfinished flows count as
/// infinite.
fn by_duration(a: &Flow, b: &Flow) -> Ordering {
    let duration = |flow: &Flow| flow.duration().unwrap_or(f64::INFINITY);
    duration(a).total_cmp(&duration(b))
}
