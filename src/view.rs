//! Shared view state: the single reactive record every view renders from.
//!
//! Only the fetch path replaces `files` as a whole; views mutate single entries through
//! [`ViewStore::update_file`]. Totals are caches written by [`ViewStore::render`] and cannot
//! be set directly.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};

use lru::LruCache;
use tokio::sync::watch;

use crate::pipeline::{self, FilterCriteria, Resolution, SortSpec};
use crate::types::{FileEntry, ViewKind};

/// Download job id -> percent, bounded with least-recently-updated eviction.
#[derive(Debug)]
pub struct ProgressMap {
    entries: LruCache<String, f64>,
}

impl ProgressMap {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: LruCache::new(cap) }
    }

    /// Percent for `id`, 0 when unknown.
    pub fn get(&self, id: &str) -> f64 {
        self.entries.peek(id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    pub fn set(&mut self, id: &str, percent: f64) {
        let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
        if let Some((evicted, _)) = self.entries.push(id.to_string(), percent) {
            if evicted != id {
                tracing::debug!(job = %evicted, "progress entry evicted");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

#[derive(Debug)]
pub struct ViewState {
    files: Vec<FileEntry>,
    criteria: FilterCriteria,
    sort: SortSpec,
    current_page: u32,
    total_items: usize,
    total_size: u64,
    loading: bool,
    download_progress: ProgressMap,
    current_view: ViewKind,
}

impl ViewState {
    fn new(view: ViewKind, progress_capacity: usize) -> Self {
        Self {
            files: Vec::new(),
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            current_page: 1,
            total_items: 0,
            total_size: 0,
            loading: false,
            download_progress: ProgressMap::new(progress_capacity),
            current_view: view,
        }
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn download_progress(&self) -> &ProgressMap {
        &self.download_progress
    }

    pub fn current_view(&self) -> ViewKind {
        self.current_view
    }

    pub fn file(&self, filename: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.filename == filename)
    }

    /// Page count of the filtered collection, computed fresh rather than from the cached
    /// totals that only [`ViewStore::render`] refreshes.
    pub fn filtered_pages(&self, page_size: u32) -> u32 {
        let total_items = self.files.iter().filter(|f| self.criteria.matches(f)).count();
        pipeline::total_pages(total_items, page_size)
    }
}

/// One rendered page plus the values the paging control shows.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub items: Vec<FileEntry>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: usize,
    pub total_size: u64,
}

pub struct ViewStore {
    tx: watch::Sender<ViewState>,
    closed: AtomicBool,
}

impl ViewStore {
    pub fn new(view: ViewKind, progress_capacity: usize) -> Self {
        let (tx, _rx) = watch::channel(ViewState::new(view, progress_capacity));
        Self { tx, closed: AtomicBool::new(false) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// Reads the current state.
    pub fn with<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// After teardown every write is inert; late network results land nowhere.
    pub fn teardown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn modify(&self, f: impl FnOnce(&mut ViewState) -> bool) -> bool {
        if self.is_closed() {
            tracing::debug!("write to torn-down view state ignored");
            return false;
        }
        self.tx.send_if_modified(f)
    }

    // --- filter cursors: every change starts over at page 1 ---

    pub fn set_filter_text(&self, text: &str) {
        self.modify(|s| {
            if s.criteria.text == text {
                return false;
            }
            s.criteria.text = text.to_string();
            s.current_page = 1;
            true
        });
    }

    pub fn set_folder(&self, folder: &str) {
        self.modify(|s| {
            if s.criteria.folder == folder {
                return false;
            }
            s.criteria.folder = folder.to_string();
            s.current_page = 1;
            true
        });
    }

    pub fn set_resolution(&self, resolution: Resolution) {
        self.modify(|s| {
            if s.criteria.resolution == resolution {
                return false;
            }
            s.criteria.resolution = resolution;
            s.current_page = 1;
            true
        });
    }

    pub fn set_min_duration(&self, minutes: u32) {
        self.modify(|s| {
            if s.criteria.min_duration_minutes == minutes {
                return false;
            }
            s.criteria.min_duration_minutes = minutes;
            s.current_page = 1;
            true
        });
    }

    /// Sorting keeps the page; the item count does not change.
    pub fn set_sort(&self, sort: SortSpec) {
        self.modify(|s| {
            if s.sort == sort {
                return false;
            }
            s.sort = sort;
            true
        });
    }

    /// Used when the page size setting changes.
    pub fn reset_page(&self) {
        self.modify(|s| {
            let changed = s.current_page != 1;
            s.current_page = 1;
            changed
        });
    }

    pub fn set_current_view(&self, view: ViewKind) {
        self.modify(|s| {
            if s.current_view == view {
                return false;
            }
            s.current_view = view;
            s.current_page = 1;
            true
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.modify(|s| {
            let changed = s.loading != loading;
            s.loading = loading;
            changed
        });
    }

    /// Clamps `target` into `[1, total_pages]` against the current collection and writes it.
    /// Returns the page actually selected.
    pub fn change_page(&self, target: i64, page_size: u32) -> u32 {
        let mut selected = self.with(|s| s.current_page);
        self.modify(|s| {
            selected = pipeline::clamp_page(target, s.filtered_pages(page_size));
            let changed = s.current_page != selected;
            s.current_page = selected;
            changed
        });
        selected
    }

    /// Page links around the current page.
    pub fn pages_to_show(&self, page_size: u32, range: u32) -> Vec<u32> {
        self.with(|s| {
            pipeline::pages_to_show(s.current_page, s.filtered_pages(page_size), range)
        })
    }

    /// Runs the pipeline over the current state, refreshes the cached totals and returns the
    /// page to display.
    pub fn render(&self, page_size: u32) -> RenderedPage {
        let page = self.with(|s| {
            let derived = pipeline::derive_page(&s.files, &s.criteria, &s.sort, s.current_page, page_size);
            RenderedPage {
                items: derived.items.into_iter().cloned().collect(),
                current_page: s.current_page,
                total_pages: derived.total_pages,
                total_items: derived.total_items,
                total_size: derived.total_size,
            }
        });
        self.modify(|s| {
            let changed = s.total_items != page.total_items || s.total_size != page.total_size;
            s.total_items = page.total_items;
            s.total_size = page.total_size;
            changed
        });
        page
    }

    // --- collection ---

    /// Replaces the whole collection with a fetch result. Last write wins: a local change made
    /// while the fetch was in flight is overwritten. Returns false once torn down.
    pub fn replace_files(&self, mut files: Vec<FileEntry>, page_size: u32) -> bool {
        for f in &mut files {
            f.show_preview = false;
        }
        self.modify(move |s| {
            s.files = files;
            s.current_page = pipeline::clamp_page(i64::from(s.current_page), s.filtered_pages(page_size));
            true
        })
    }

    /// Mutates one entry in place. Returns whether the entry exists.
    pub fn update_file(&self, filename: &str, f: impl FnOnce(&mut FileEntry)) -> bool {
        self.modify(|s| match s.files.iter_mut().find(|e| e.filename == filename) {
            Some(entry) => {
                f(entry);
                true
            }
            None => false,
        })
    }

    pub fn unique_folders(&self) -> Vec<String> {
        self.with(|s| pipeline::unique_folders(&s.files))
    }

    // --- download progress ---

    pub fn set_progress(&self, job_id: &str, percent: f64) {
        self.modify(|s| {
            s.download_progress.set(job_id, percent);
            true
        });
    }

    pub fn progress(&self, job_id: &str) -> f64 {
        self.with(|s| s.download_progress.get(job_id))
    }
}
