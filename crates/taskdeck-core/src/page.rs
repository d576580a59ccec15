use serde::{Deserialize, Serialize};

/// One page of an ordered result set plus the metadata needed to draw
/// pagination controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub last: bool,
}

impl<T> PagedResponse<T> {
    pub fn empty(size: u32) -> Self {
        Self {
            content: Vec::new(),
            page: 0,
            size,
            total_elements: 0,
            total_pages: 0,
            last: true,
        }
    }

    /// Cut page `page` out of an already ordered sequence.
    ///
    /// A page index past the end yields empty content with `last` set,
    /// which is what the service answers for out-of-range requests.
    pub fn from_sorted(items: Vec<T>, page: u32, size: u32) -> Self {
        let size = size.max(1);
        let total_elements = items.len() as u64;
        let total_pages = total_elements.div_ceil(u64::from(size)) as u32;
        let start = u64::from(page) * u64::from(size);
        let content = if start >= total_elements {
            Vec::new()
        } else {
            items
                .into_iter()
                .skip(start as usize)
                .take(size as usize)
                .collect()
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
            last: page.saturating_add(1) >= total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when the server answered for a page index that no longer exists.
    pub fn is_past_end(&self) -> bool {
        self.content.is_empty() && self.page > 0 && self.page >= self.total_pages
    }

    /// Index of the final page, if there is any page at all.
    pub fn last_page(&self) -> Option<u32> {
        self.total_pages.checked_sub(1)
    }
}
