//! Page requests and result slices
//!
//! ```rust
//! use verein_service::repository::Pageable;
//!
//! let page = Pageable::new(2, 5);
//! assert_eq!(page.skip(), 10);
//! assert_eq!(page.take(), 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// A requested page: 0-based `number` and `size` > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pageable {
    pub number: u32,
    pub size: u32,
}

impl Pageable {
    #[must_use]
    pub const fn new(number: u32, size: u32) -> Self {
        Self { number, size }
    }

    /// First page with the configured default size
    #[must_use]
    pub fn first(config: &PaginationConfig) -> Self {
        Self::new(0, config.default_size)
    }

    /// Build from raw query values
    ///
    /// Values that do not parse, a zero size, or a missing value fall back to
    /// the defaults; oversized pages are clamped to `max_size`.
    #[must_use]
    pub fn from_query(number: Option<&str>, size: Option<&str>, config: &PaginationConfig) -> Self {
        let number = number
            .and_then(|n| n.trim().parse::<u32>().ok())
            .unwrap_or(0);
        let size = size
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(config.default_size)
            .min(config.max_size);
        Self::new(number, size)
    }

    /// Same as [`from_query`](Self::from_query) for already numeric input
    #[must_use]
    pub fn from_numbers(number: Option<i64>, size: Option<i64>, config: &PaginationConfig) -> Self {
        let number = number.and_then(|n| u32::try_from(n).ok()).unwrap_or(0);
        let size = size
            .and_then(|s| u32::try_from(s).ok())
            .filter(|s| *s > 0)
            .unwrap_or(config.default_size)
            .min(config.max_size);
        Self::new(number, size)
    }

    /// Rows to skip: `number * size`
    pub const fn skip(&self) -> u64 {
        self.number as u64 * self.size as u64
    }

    /// Rows to take
    pub const fn take(&self) -> u64 {
        self.size as u64
    }
}

/// One page of results plus the total number of matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub pageable: Pageable,
}

impl<T> Slice<T> {
    pub fn new(content: Vec<T>, total_elements: u64, pageable: Pageable) -> Self {
        Self {
            content,
            total_elements,
            pageable,
        }
    }

    /// Number of pages for the total; 0 when nothing matched
    pub fn total_pages(&self) -> u64 {
        if self.pageable.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.pageable.size))
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
