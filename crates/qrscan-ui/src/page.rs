use std::ops::Range;

/// Which slice of the history list is on screen. Rows keep their global numbers across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPager {
    size: usize,
    index: usize,
}

impl HistoryPager {
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            index: 0,
        }
    }

    /// Zero-based page on screen
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pages(&self, total: usize) -> usize {
        total.div_ceil(self.size).max(1)
    }

    /// Indices of the history entries shown on the current page
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.index * self.size).min(total);
        start..(start + self.size).min(total)
    }

    pub fn next(&mut self, total: usize) -> bool {
        if self.index + 1 < self.pages(total) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Keep the page valid after the list shrank
    pub fn clamp(&mut self, total: usize) {
        self.index = self.index.min(self.pages(total) - 1);
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
