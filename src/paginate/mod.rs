// Lazy offset-based pagination.
// Pulls fixed-size pages from a backing store until the first empty page.

pub mod memory;

use std::iter::FusedIterator;

use tracing::debug;

use crate::error::{ProdevError, Result};

pub use memory::MemoryStore;

/// An ordered run of items; empty marks the end of the stream.
pub type Page<T> = Vec<T>;

/// Offset-addressable backing store with a stable total ordering.
pub trait PageSource {
    type Item;

    /// Fetch at most `limit` items starting at `offset`.
    fn fetch(&mut self, limit: usize, offset: usize) -> Result<Page<Self::Item>>;
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    type Item = S::Item;

    fn fetch(&mut self, limit: usize, offset: usize) -> Result<Page<Self::Item>> {
        (**self).fetch(limit, offset)
    }
}

/// Page source backed by a closure, see [`from_fn`].
pub struct FetchFn<F>(F);

/// Adapt a `fetch(limit, offset)` closure into a [`PageSource`].
pub fn from_fn<T, F>(fetch: F) -> FetchFn<F>
where
    F: FnMut(usize, usize) -> Result<Page<T>>,
{
    FetchFn(fetch)
}

impl<T, F> PageSource for FetchFn<F>
where
    F: FnMut(usize, usize) -> Result<Page<T>>,
{
    type Item = T;

    fn fetch(&mut self, limit: usize, offset: usize) -> Result<Page<T>> {
        (self.0)(limit, offset)
    }
}

/// Lazy sequence of pages.
///
/// Starts at offset 0 and advances by exactly `page_size` after every
/// non-empty page. Ends at the first empty page or after yielding the first
/// fetch error. A new session always needs a new `Paginator`.
#[derive(Debug)]
pub struct Paginator<S> {
    source: S,
    page_size: usize,
    offset: usize,
    finished: bool,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(ProdevError::InvalidPageSize(page_size));
        }
        Ok(Self {
            source,
            page_size,
            offset: 0,
            finished: false,
        })
    }

    /// Offset of the next fetch.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<S: PageSource> Iterator for Paginator<S> {
    type Item = Result<Page<S::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.source.fetch(self.page_size, self.offset) {
            Ok(page) if page.is_empty() => {
                debug!(offset = self.offset, "pagination finished");
                self.finished = true;
                None
            }
            Ok(page) => {
                debug!(offset = self.offset, len = page.len(), "fetched page");
                match self.offset.checked_add(self.page_size) {
                    Some(next) => self.offset = next,
                    // No further offset is addressable.
                    None => self.finished = true,
                }
                Some(Ok(page))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: PageSource> FusedIterator for Paginator<S> {}

/// Start a fresh pagination session at offset 0.
pub fn lazy_pagination<S: PageSource>(source: S, page_size: usize) -> Result<Paginator<S>> {
    Paginator::new(source, page_size)
}

/// Flatten pages into a stream of single items.
pub fn stream_items<S: PageSource>(
    source: S,
    page_size: usize,
) -> Result<impl Iterator<Item = Result<S::Item>>> {
    Ok(flatten_pages(Paginator::new(source, page_size)?))
}

/// Turn a stream of pages into a stream of items, keeping fetch errors in place.
pub fn flatten_pages<T, I>(pages: I) -> impl Iterator<Item = Result<T>>
where
    I: Iterator<Item = Result<Page<T>>>,
{
    pages.flat_map(|page| match page {
        Ok(items) => items.into_iter().map(Ok).collect::<Vec<_>>(),
        Err(e) => vec![Err(e)],
    })
}
