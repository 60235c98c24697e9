// In-memory page source.

use crate::error::Result;

use super::{Page, PageSource};

/// Ordered in-memory store that remembers every `(limit, offset)` it served.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<T> {
    items: Vec<T>,
    requests: Vec<(usize, usize)>,
}

impl<T> MemoryStore<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            requests: Vec::new(),
        }
    }

    /// Fetch requests served so far, oldest first.
    pub fn requests(&self) -> &[(usize, usize)] {
        &self.requests
    }
}

impl<T: Clone> PageSource for MemoryStore<T> {
    type Item = T;

    fn fetch(&mut self, limit: usize, offset: usize) -> Result<Page<T>> {
        self.requests.push((limit, offset));
        Ok(self.items.iter().skip(offset).take(limit).cloned().collect())
    }
}
