//! Sparse fixed-size memory pages.

use log::trace;

/// Page size used when a pager is created with a size of 0.
pub const DEFAULT_PAGE_SIZE: usize = 1024;

/// A fixed-size chunk of memory owned by a [`Pager`].
///
/// The buffer length always equals the pager's page size; it is never
/// resized after allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    offset: usize,
    buffer: Box<[u8]>,
}

impl Page {
    fn zeroed(offset: usize, page_size: usize) -> Self {
        Page {
            offset,
            buffer: vec![0u8; page_size].into_boxed_slice(),
        }
    }

    /// Byte offset of this page within the pager's logical byte space.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The page contents.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable access to the page contents.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }
}

/// A growable sequence of lazily allocated pages addressed by page number.
///
/// Slots between allocated pages stay empty; an empty slot reads as absent
/// and costs no page memory.
#[derive(Debug, Clone)]
pub struct Pager {
    page_size: usize,
    pages: Vec<Option<Page>>,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    /// Create an empty pager. A `page_size` of 0 selects
    /// [`DEFAULT_PAGE_SIZE`].
    pub fn new(page_size: usize) -> Self {
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Pager {
            page_size,
            pages: Vec::new(),
        }
    }

    /// Size in bytes of every page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of page slots, including empty slots below the highest
    /// allocated page.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns `true` if no page slot has ever been grown.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The page at `page_num`, if allocated. Never allocates.
    pub fn get(&self, page_num: usize) -> Option<&Page> {
        self.pages.get(page_num).and_then(Option::as_ref)
    }

    /// Mutable access to the page at `page_num`, if allocated.
    pub fn get_mut(&mut self, page_num: usize) -> Option<&mut Page> {
        self.pages.get_mut(page_num).and_then(Option::as_mut)
    }

    /// The page at `page_num`, allocating a zero-filled page first if the
    /// slot is empty.
    pub fn get_or_alloc(&mut self, page_num: usize) -> &mut Page {
        self.grow(page_num);
        let page_size = self.page_size;
        self.pages[page_num].get_or_insert_with(|| {
            trace!("allocating page {}", page_num);
            Page::zeroed(page_num * page_size, page_size)
        })
    }

    /// Replace the contents of the page at `page_num` with `data`,
    /// allocating the page if needed.
    ///
    /// `data` longer than the page size is truncated. Bytes of the page past
    /// `data.len()` are zeroed.
    pub fn set(&mut self, page_num: usize, data: &[u8]) {
        let page_size = self.page_size;
        let len = data.len().min(page_size);
        let buffer = self.get_or_alloc(page_num).buffer_mut();
        buffer[..len].copy_from_slice(&data[..len]);
        buffer[len..].fill(0);
    }

    fn grow(&mut self, page_num: usize) {
        if self.pages.len() <= page_num {
            self.pages.resize_with(page_num + 1, || None);
        }
    }
}
