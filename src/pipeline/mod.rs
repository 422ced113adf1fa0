//! Derived list pipeline: filter -> sort -> totals -> page slice.
//!
//! Pure functions over a borrowed file collection. The view store calls [`derive_page`] with
//! whatever its state holds at render time, never with a snapshot taken earlier.

pub mod filter;
pub mod paging;

use std::cmp::Ordering;

use crate::types::FileEntry;

pub use filter::{FilterCriteria, Resolution, ROOT_FOLDER};
pub use paging::{clamp_page, pages_to_show, total_pages, DEFAULT_PAGE_WINDOW};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortDir::Asc
        } else {
            SortDir::Desc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Created,
    DownloadDate,
    Folder,
    Title,
    Filename,
    Filesize,
    Duration,
    Width,
    Height,
    Favorite,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "created" => SortField::Created,
            "download_date" => SortField::DownloadDate,
            "folder" => SortField::Folder,
            "title" => SortField::Title,
            "filename" => SortField::Filename,
            "filesize" => SortField::Filesize,
            "duration" => SortField::Duration,
            "width" => SortField::Width,
            "height" => SortField::Height,
            "favorite" => SortField::Favorite,
            _ => return None,
        })
    }

    /// Plain ordering of one field. A missing value on either side compares equal, so the
    /// next criterion (or the input order) decides.
    fn compare(self, a: &FileEntry, b: &FileEntry) -> Ordering {
        fn num<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
            match (a, b) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        }
        match self {
            SortField::Created => num(a.created, b.created),
            SortField::DownloadDate => num(a.download_date, b.download_date),
            SortField::Folder => a.folder.cmp(&b.folder),
            SortField::Title => num(a.title.as_deref(), b.title.as_deref()),
            SortField::Filename => a.filename.cmp(&b.filename),
            SortField::Filesize => num(a.filesize, b.filesize),
            SortField::Duration => num(a.duration, b.duration),
            SortField::Width => num(a.width, b.width),
            SortField::Height => num(a.height, b.height),
            SortField::Favorite => a.favorite.cmp(&b.favorite),
        }
    }
}

/// One or more criteria (`"folder created"`) sharing one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub fields: Vec<SortField>,
    pub dir: SortDir,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self { fields: vec![SortField::Created], dir: SortDir::Desc }
    }
}

impl SortSpec {
    /// Unknown criterion names are skipped, like comparing an absent property.
    pub fn parse(criteria: &str, dir: &str) -> Self {
        let fields = criteria
            .split_whitespace()
            .filter_map(|name| {
                let field = SortField::parse(name);
                if field.is_none() {
                    tracing::debug!(criterion = name, "unknown sort criterion ignored");
                }
                field
            })
            .collect();
        Self { fields, dir: SortDir::parse(dir) }
    }

    pub fn compare(&self, a: &FileEntry, b: &FileEntry) -> Ordering {
        for field in &self.fields {
            let ord = field.compare(a, b);
            if ord != Ordering::Equal {
                return match self.dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                };
            }
        }
        Ordering::Equal
    }
}

/// Result of one pipeline pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPage<'a> {
    /// The entries the view renders for the requested page.
    pub items: Vec<&'a FileEntry>,
    /// Number of entries surviving the filter.
    pub total_items: usize,
    /// Sum of `filesize` over the filtered entries.
    pub total_size: u64,
    pub total_pages: u32,
}

/// Filters and sorts `files`; the sort is stable, so full ties keep their input order.
pub fn filter_and_sort<'a>(files: &'a [FileEntry], criteria: &FilterCriteria, sort: &SortSpec) -> Vec<&'a FileEntry> {
    let mut filtered: Vec<&FileEntry> = files.iter().filter(|f| criteria.matches(f)).collect();
    filtered.sort_by(|a, b| sort.compare(a, b));
    filtered
}

/// Runs the full pipeline. `current_page` is 1-based; `page_size == 0` disables paging.
pub fn derive_page<'a>(
    files: &'a [FileEntry],
    criteria: &FilterCriteria,
    sort: &SortSpec,
    current_page: u32,
    page_size: u32,
) -> DerivedPage<'a> {
    let filtered = filter_and_sort(files, criteria, sort);
    let total_items = filtered.len();
    let total_size = filtered.iter().map(|f| f.filesize.unwrap_or(0)).sum();
    let pages = total_pages(total_items, page_size);

    let items = if page_size == 0 {
        filtered
    } else {
        let size = page_size as usize;
        let start = (current_page.max(1) as usize - 1).saturating_mul(size);
        filtered.into_iter().skip(start).take(size).collect()
    };

    DerivedPage { items, total_items, total_size, total_pages: pages }
}

/// Distinct non-empty folders, sorted, for the folder selector.
pub fn unique_folders(files: &[FileEntry]) -> Vec<String> {
    let mut folders: Vec<String> = files.iter().filter(|f| !f.folder.is_empty()).map(|f| f.folder.clone()).collect();
    folders.sort();
    folders.dedup();
    folders
}
