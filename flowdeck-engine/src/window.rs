//! Virtual window computation for the row renderer.
//!
//! Pure functions of `(view length, row heights, scroll offset, viewport
//! height)`. The renderer draws only the rows inside the returned range and
//! substitutes placeholder blocks for everything above and below; the
//! placeholder sizes always satisfy `top + visible + bottom == total`.
//! Recomputed by the consumer on every scroll/resize and whenever the view
//! length changes — never mutates the view.

use std::ops::Range;

/// Computed window over an ordered row list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowSlice {
    /// Indices of the rows intersecting the viewport.
    pub range: Range<usize>,
    /// Total height of the rows above the range.
    pub top: u32,
    /// Total height of the rows below the range.
    pub bottom: u32,
}

/// Compute the visible slice for fixed-height rows.
///
/// The scroll offset is clamped to the scrollable range first, so a stale
/// offset after rows were removed still yields a valid slice.
pub fn fixed(len: usize, row_height: u32, scroll_offset: u32, viewport_height: u32) -> WindowSlice {
    let total = (len as u32).saturating_mul(row_height);
    if len == 0 || row_height == 0 || viewport_height == 0 {
        return WindowSlice {
            range: 0..0,
            top: 0,
            bottom: total,
        };
    }
    let scroll = scroll_offset.min(total.saturating_sub(viewport_height));
    let first = (scroll / row_height) as usize;
    let last = ((scroll + viewport_height).div_ceil(row_height) as usize).min(len);
    WindowSlice {
        range: first..last,
        top: first as u32 * row_height,
        bottom: (len - last) as u32 * row_height,
    }
}

/// Compute the visible slice for per-row heights.
///
/// Linear in the row count; callers with large collections and uniform
/// rows should prefer [`fixed`].
pub fn variable<F>(len: usize, height_of: F, scroll_offset: u32, viewport_height: u32) -> WindowSlice
where
    F: Fn(usize) -> u32,
{
    let mut total: u32 = 0;
    for row in 0..len {
        total = total.saturating_add(height_of(row));
    }
    if len == 0 || viewport_height == 0 || total == 0 {
        return WindowSlice {
            range: 0..0,
            top: 0,
            bottom: total,
        };
    }
    let scroll = scroll_offset.min(total.saturating_sub(viewport_height));

    let mut top: u32 = 0;
    let mut first = len;
    let mut y: u32 = 0;
    for row in 0..len {
        let height = height_of(row);
        if y.saturating_add(height) > scroll {
            first = row;
            break;
        }
        top = top.saturating_add(height);
        y = y.saturating_add(height);
    }

    let mut last = first;
    let mut visible: u32 = 0;
    while last < len && y < scroll.saturating_add(viewport_height) {
        let height = height_of(last);
        visible = visible.saturating_add(height);
        y = y.saturating_add(height);
        last += 1;
    }

    WindowSlice {
        range: first..last,
        top,
        bottom: total.saturating_sub(top).saturating_sub(visible),
    }
}
