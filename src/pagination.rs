//! Pagination state, local page slicing and the pagination status line.
//!
//! Pages are 1-indexed. The state never stores the page count; it is derived
//! from whatever total the caller currently has, which is what lets the
//! state self-correct when the total shrinks underneath it (see
//! [`PaginationState::correct_page`]).

use crate::error::{Result, TableError};

/// Default number of rows per page.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// How the pagination status line is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Type {
    /// Page numbers, e.g. "2/5".
    #[default]
    Arabic,
    /// One dot per page, e.g. "○ • ○ ○ ○".
    Dots,
    /// Visible range, e.g. "11 - 20 of 42".
    Range,
}

/// Current page and page size of one table.
///
/// # Examples
///
/// ```rust
/// use table_controls::pagination::PaginationState;
///
/// let mut pagination = PaginationState::new().with_items_per_page(10).unwrap();
/// assert_eq!(pagination.page_count(95), 10);
///
/// pagination.set_page_number(10);
/// assert!(pagination.on_last_page(95));
///
/// // The data shrinks: page 10 no longer exists.
/// assert!(pagination.correct_page(42, false));
/// assert_eq!(pagination.page_number(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page_number: usize,
    items_per_page: usize,
}

impl Default for PaginationState {
    /// First page, [`DEFAULT_ITEMS_PER_PAGE`] rows per page.
    fn default() -> Self {
        Self {
            page_number: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl PaginationState {
    /// Creates a state on page 1 with the default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size (builder pattern). Zero is rejected.
    pub fn with_items_per_page(mut self, items_per_page: usize) -> Result<Self> {
        self.set_items_per_page(items_per_page)?;
        Ok(self)
    }

    /// Sets the page number (builder pattern).
    pub fn with_page_number(mut self, page_number: usize) -> Self {
        self.set_page_number(page_number);
        self
    }

    /// The current 1-indexed page number.
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Rows per page.
    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Moves to `page_number`; values below 1 are clamped to 1.
    ///
    /// The upper bound is not checked here because the total may not be
    /// known yet; [`correct_page`](Self::correct_page) enforces it once it is.
    pub fn set_page_number(&mut self, page_number: usize) {
        self.page_number = page_number.max(1);
    }

    /// Changes the page size and returns to page 1.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<()> {
        if items_per_page == 0 {
            return Err(TableError::InvalidItemsPerPage);
        }
        self.items_per_page = items_per_page;
        self.page_number = 1;
        Ok(())
    }

    /// Number of pages needed for `total_items` (zero for no items).
    pub fn page_count(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.items_per_page)
    }

    /// The last page that may be shown for `total_items`, never below 1.
    pub fn last_page_number(&self, total_items: usize) -> usize {
        self.page_count(total_items).max(1)
    }

    /// Index of the first row of the current page, saturating at
    /// `usize::MAX` for page numbers past any addressable row.
    pub fn page_start_index(&self) -> usize {
        (self.page_number - 1).saturating_mul(self.items_per_page)
    }

    /// Returns `(start, end)` slice bounds of the current page for a list of
    /// `length` rows. Both bounds saturate at `length`.
    pub fn slice_bounds(&self, length: usize) -> (usize, usize) {
        let start = self.page_start_index().min(length);
        let end = start.saturating_add(self.items_per_page).min(length);
        (start, end)
    }

    /// Returns true on page 1.
    pub fn on_first_page(&self) -> bool {
        self.page_number == 1
    }

    /// Returns true on (or past) the last page for `total_items`.
    pub fn on_last_page(&self, total_items: usize) -> bool {
        self.page_number >= self.last_page_number(total_items)
    }

    /// Moves one page back; no effect on page 1.
    pub fn prev_page(&mut self) -> bool {
        if self.on_first_page() {
            return false;
        }
        self.page_number -= 1;
        true
    }

    /// Moves one page forward; no effect on the last page.
    pub fn next_page(&mut self, total_items: usize) -> bool {
        if self.on_last_page(total_items) {
            return false;
        }
        self.page_number += 1;
        true
    }

    /// Clamps the page number back to the last page that exists.
    ///
    /// Call after every change of the total item count (deletion, a
    /// narrowing filter, a new remote result). While a remote fetch is in
    /// flight the total is stale, so nothing is corrected when `is_loading`
    /// is set. Returns true if the page number changed.
    pub fn correct_page(&mut self, total_items: usize, is_loading: bool) -> bool {
        if is_loading {
            return false;
        }
        let last_page = self.last_page_number(total_items);
        if self.page_number > last_page {
            log::debug!(
                "page {} no longer exists for {} items, moving to page {}",
                self.page_number,
                total_items,
                last_page
            );
            self.page_number = last_page;
            return true;
        }
        false
    }
}

/// Returns the rows of the current page.
///
/// # Examples
///
/// ```rust
/// use table_controls::pagination::{paginate_items, PaginationState};
///
/// let items: Vec<u32> = (0..11).collect();
/// let state = PaginationState::new().with_page_number(2);
/// assert_eq!(paginate_items(&items, &state), [10u32]);
/// ```
pub fn paginate_items<'a, T>(items: &'a [T], state: &PaginationState) -> &'a [T] {
    let (start, end) = state.slice_bounds(items.len());
    &items[start..end]
}

/// Renders the pagination status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    /// Rendering style.
    pub view_type: Type,
    /// Active page marker in [`Type::Dots`] mode.
    pub active_dot: String,
    /// Inactive page marker in [`Type::Dots`] mode.
    pub inactive_dot: String,
    /// Format of [`Type::Arabic`] mode; the two `%d` are page and page count.
    pub arabic_format: String,
}

impl Default for PaginationView {
    fn default() -> Self {
        Self {
            view_type: Type::default(),
            active_dot: "•".to_string(),
            inactive_dot: "○".to_string(),
            arabic_format: "%d/%d".to_string(),
        }
    }
}

impl PaginationView {
    /// Creates an Arabic-style view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rendering style (builder pattern).
    pub fn with_type(mut self, view_type: Type) -> Self {
        self.view_type = view_type;
        self
    }

    /// Renders `state` for a list of `total_items` rows.
    ///
    /// ```rust
    /// use table_controls::pagination::{PaginationState, PaginationView, Type};
    ///
    /// let state = PaginationState::new().with_page_number(2);
    /// assert_eq!(PaginationView::new().render(&state, 42), "2/5");
    /// assert_eq!(PaginationView::new().with_type(Type::Dots).render(&state, 42), "○ • ○ ○ ○");
    /// assert_eq!(PaginationView::new().with_type(Type::Range).render(&state, 42), "11 - 20 of 42");
    /// ```
    pub fn render(&self, state: &PaginationState, total_items: usize) -> String {
        match self.view_type {
            Type::Arabic => self.arabic_view(state, total_items),
            Type::Dots => self.dots_view(state, total_items),
            Type::Range => Self::range_view(state, total_items),
        }
    }

    fn arabic_view(&self, state: &PaginationState, total_items: usize) -> String {
        self.arabic_format
            .replacen("%d", &state.page_number().to_string(), 1)
            .replacen("%d", &state.last_page_number(total_items).to_string(), 1)
    }

    fn dots_view(&self, state: &PaginationState, total_items: usize) -> String {
        let pages = state.last_page_number(total_items);
        (1..=pages)
            .map(|page| {
                if page == state.page_number() {
                    self.active_dot.as_str()
                } else {
                    self.inactive_dot.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn range_view(state: &PaginationState, total_items: usize) -> String {
        let (start, end) = state.slice_bounds(total_items);
        if start == end {
            return format!("0 - 0 of {total_items}");
        }
        format!("{} - {} of {}", start + 1, end, total_items)
    }
}
