//! Page arithmetic for the paging control.

/// Number of page links shown around the current page.
pub const DEFAULT_PAGE_WINDOW: u32 = 5;

/// `ceil(total_items / page_size)`, at least 1. Page size 0 means a single page.
pub fn total_pages(total_items: usize, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_items.div_ceil(page_size as usize);
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Clamps a requested page (possibly zero or negative) into `[1, total_pages]`.
pub fn clamp_page(target: i64, total_pages: u32) -> u32 {
    let last = i64::from(total_pages.max(1));
    target.clamp(1, last) as u32
}

/// A window of at most `range` consecutive page numbers centered on `current`, shifted to
/// stay inside `[1, total_pages]`.
pub fn pages_to_show(current: u32, total_pages: u32, range: u32) -> Vec<u32> {
    if range == 0 {
        return Vec::new();
    }
    let total = i64::from(total_pages.max(1));
    let range = i64::from(range);
    let mut start = (i64::from(current) - range / 2).max(1);
    let end = (start + range - 1).min(total);
    if end - start < range - 1 {
        start = (end - range + 1).max(1);
    }
    (start..=end).map(|p| p as u32).collect()
}
