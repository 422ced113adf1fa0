#[cfg(test)]
mod tests {
    use crate::format::{format_date, format_duration, format_file_size};
    use crate::types::{basename_stem, FileEntry, ViewKind};

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Byte");
        assert_eq!(format_file_size(512), "512.00 Bytes");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_file_size(2048 * 1024_u64.pow(4)), "2048.00 TB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(59.9), "59s");
        assert_eq!(format_duration(61.0), "1m 1s");
        assert_eq!(format_duration(3725.4), "1h 2m 5s");
        assert_eq!(format_duration(3600.0), "1h 0m 0s");
        assert_eq!(format_duration(-5.0), "0s");
        assert_eq!(format_duration(f64::NAN), "0s");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(0.0), "");
        assert_eq!(format_date(0.5), "");
        assert_eq!(format_date(f64::NAN), "");
        let rendered = format_date(1_700_000_000.0);
        assert!(rendered.contains("2023"), "unexpected date: {}", rendered);
        assert_eq!(rendered.matches(':').count(), 2);
    }

    #[test]
    fn test_display_title() {
        let with_title = FileEntry { title: Some("Nice Title".into()), filename: "/v/x.mp4".into(), ..FileEntry::default() };
        assert_eq!(with_title.display_title(), "Nice Title");

        let empty_title = FileEntry { title: Some(String::new()), filename: "/v/x.mp4".into(), ..FileEntry::default() };
        assert_eq!(empty_title.display_title(), "x");

        assert_eq!(basename_stem("/videos/sub/clip.final.mp4"), "clip.final");
        assert_eq!(basename_stem("/videos/README"), "README");
        assert_eq!(basename_stem("plain.mkv"), "plain");
    }

    #[test]
    fn test_view_routes() {
        assert_eq!(ViewKind::from_path(""), ViewKind::Downloads);
        assert_eq!(ViewKind::from_path("/library/"), ViewKind::Library);
        assert_eq!(ViewKind::from_path("bookmarks"), ViewKind::Bookmarks);
        assert_eq!(ViewKind::from_path("online"), ViewKind::Online);
        assert_eq!(ViewKind::Online.list_path(), None);
        assert_eq!(ViewKind::Library.list_path(), Some("/api/library/list"));
    }
}
