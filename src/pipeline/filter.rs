use crate::types::FileEntry;

/// Folder selector value meaning "files directly in the root" (empty folder).
pub const ROOT_FOLDER: &str = "~root~";

/// Minimum resolution bucket. A file qualifies when its width or its height reaches the
/// floor of the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    #[default]
    Any,
    /// Either side above 1900 px.
    Hd,
    /// Either side at least 3800 px.
    Uhd4k,
    /// Either side at least 8000 px.
    Uhd8k,
}

impl Resolution {
    /// Selector values: `""`, `"HD"`, `"4K"`, `"8K"`. Anything else means no constraint.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "HD" => Resolution::Hd,
            "4K" => Resolution::Uhd4k,
            "8K" => Resolution::Uhd8k,
            _ => Resolution::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Any => "",
            Resolution::Hd => "HD",
            Resolution::Uhd4k => "4K",
            Resolution::Uhd8k => "8K",
        }
    }

    pub fn matches(self, file: &FileEntry) -> bool {
        let w = file.width.unwrap_or(0);
        let h = file.height.unwrap_or(0);
        match self {
            Resolution::Any => true,
            Resolution::Hd => w > 1900 || h > 1900,
            Resolution::Uhd4k => w >= 3800 || h >= 3800,
            Resolution::Uhd8k => w >= 8000 || h >= 8000,
        }
    }
}

/// The AND-combined filter inputs of the shared view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the display title; empty matches everything.
    pub text: String,
    /// Exact folder, [`ROOT_FOLDER`], or empty for all folders.
    pub folder: String,
    pub resolution: Resolution,
    /// 0 disables the duration constraint.
    pub min_duration_minutes: u32,
}

impl FilterCriteria {
    pub fn matches(&self, file: &FileEntry) -> bool {
        self.matches_folder(file) && self.matches_text(file) && self.resolution.matches(file) && self.matches_duration(file)
    }

    fn matches_folder(&self, file: &FileEntry) -> bool {
        if self.folder.is_empty() {
            return true;
        }
        file.folder == self.folder || (file.folder.is_empty() && self.folder == ROOT_FOLDER)
    }

    fn matches_text(&self, file: &FileEntry) -> bool {
        if self.text.is_empty() {
            return true;
        }
        file.display_title().to_lowercase().contains(&self.text.to_lowercase())
    }

    fn matches_duration(&self, file: &FileEntry) -> bool {
        if self.min_duration_minutes == 0 {
            return true;
        }
        // Unknown duration never satisfies a minimum.
        match file.duration {
            Some(secs) => secs / 60.0 >= f64::from(self.min_duration_minutes),
            None => false,
        }
    }
}
