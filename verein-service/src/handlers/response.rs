//! Response envelopes for REST handlers
//!
//! ```rust
//! use verein_service::handlers::PageResponse;
//! use verein_service::repository::{Pageable, Slice};
//!
//! let page = PageResponse::from(Slice::new(vec!["a", "b"], 7, Pageable::new(1, 2)));
//! assert_eq!(page.page.total_pages, 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::repository::Slice;

/// Page metadata of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// `{ "content": [...], "page": { ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: PageMeta,
}

impl<T> From<Slice<T>> for PageResponse<T> {
    fn from(slice: Slice<T>) -> Self {
        let page = PageMeta {
            size: slice.pageable.size,
            number: slice.pageable.number,
            total_elements: slice.total_elements,
            total_pages: slice.total_pages(),
        };
        Self {
            content: slice.content,
            page,
        }
    }
}
