//! Pixel range partitioning for the worker pool.
//!
//! The image is flattened to row-major pixel indices and divided into one
//! contiguous span per worker, computed once before rendering starts.

use std::ops::Range;

/// A contiguous run of row-major pixel indices rendered by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSpan {
    /// First pixel index (inclusive)
    pub start: usize,
    /// One past the last pixel index
    pub end: usize,
    /// Index of this span; also selects the worker's random stream
    pub index: usize,
}

impl PixelSpan {
    /// Create a new span.
    pub fn new(start: usize, end: usize, index: usize) -> Self {
        Self { start, end, index }
    }

    /// Get the number of pixels in this span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `total` pixels into equal contiguous spans for `workers` workers.
///
/// When `total` is not divisible, the first `total % workers` spans take one
/// extra pixel each. The worker count is clamped to `1..=total`, so no span
/// is empty unless the image itself is.
pub fn partition_pixels(total: usize, workers: usize) -> Vec<PixelSpan> {
    let workers = workers.clamp(1, total.max(1));
    let base = total / workers;
    let remainder = total % workers;

    let mut spans = Vec::with_capacity(workers);
    let mut start = 0;
    for index in 0..workers {
        let len = base + usize::from(index < remainder);
        spans.push(PixelSpan::new(start, start + len, index));
        start += len;
    }

    spans
}
