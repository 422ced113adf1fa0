use super::Actions;
use crate::api::{with_identifier_query, CallOptions};
use crate::types::Bookmark;

const BOOKMARKS_PATH: &str = "/api/bookmarks";

/// Bare host names get a scheme so they can be opened.
pub fn normalize_bookmark_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

impl Actions {
    pub async fn list_bookmarks(&self) -> Option<Vec<Bookmark>> {
        self.api
            .call_as::<Vec<Bookmark>>(BOOKMARKS_PATH, CallOptions::get("Error fetching bookmarks").quiet())
            .await
    }

    /// Stores a bookmark; returns the stored one.
    pub async fn save_bookmark(&self, title: &str, url: &str) -> Option<Bookmark> {
        if url.trim().is_empty() {
            self.toast("Bookmark URL is required.");
            return None;
        }
        let title = title.trim();
        let bookmark = Bookmark {
            title: (!title.is_empty()).then(|| title.to_string()),
            url: normalize_bookmark_url(url),
        };
        let opts = CallOptions::post_json(&bookmark, "Error adding bookmark").quiet();
        self.api.call(BOOKMARKS_PATH, opts).await.map(|_| bookmark)
    }

    pub async fn delete_bookmark(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            self.toast("URL is required.");
            return false;
        }
        let path = with_identifier_query(BOOKMARKS_PATH, url);
        self.api.call(&path, CallOptions::delete("Error deleting bookmark").quiet()).await.is_some()
    }
}
