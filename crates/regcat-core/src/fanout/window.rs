//! Window partitioning and per-window progress snapshots.

use std::ops::Range;

/// A contiguous slice of the input processed as one fan-out batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Zero-based position of this window.
    pub index: usize,
    /// Offset of the first item in the input list.
    pub offset: usize,
    /// Number of items in this window (only the last one may be short).
    pub len: usize,
}

impl Window {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Number of windows needed to cover `total` items.
pub fn window_count(total: usize, window_size: usize) -> usize {
    total.div_ceil(window_size.max(1))
}

/// Splits `0..total` into consecutive windows of at most `window_size` items.
/// A window size of zero is treated as one.
pub fn partition(total: usize, window_size: usize) -> impl Iterator<Item = Window> {
    let size = window_size.max(1);
    (0..window_count(total, size)).map(move |index| {
        let offset = index * size;
        Window {
            index,
            offset,
            len: size.min(total - offset),
        }
    })
}

/// Snapshot reported just before a window is submitted.
///
/// Consumers can compute a rate as `items_done / elapsed_secs` and an ETA
/// from the remaining item count.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowProgress {
    /// Offset of the window about to start.
    pub offset: usize,
    /// Items in the window about to start.
    pub window_len: usize,
    pub window_index: usize,
    pub window_count: usize,
    /// Items in the whole run.
    pub total_items: usize,
    /// Items already drained (successes and failures) in earlier windows.
    pub items_done: usize,
    /// Seconds since the run started.
    pub elapsed_secs: f64,
}

impl WindowProgress {
    pub(crate) fn new(window: Window, window_count: usize, total_items: usize, elapsed_secs: f64) -> Self {
        Self {
            offset: window.offset,
            window_len: window.len,
            window_index: window.index,
            window_count,
            total_items,
            items_done: window.offset,
            elapsed_secs,
        }
    }

    /// Items processed per second so far (0 if nothing measurable yet).
    pub fn items_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.items_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None while no rate is known).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_items.saturating_sub(self.items_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.items_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_items == 0 {
            return 1.0;
        }
        (self.items_done as f64 / self.total_items as f64).min(1.0)
    }
}
