use tracing::{info, warn};

use super::{Actions, ConfirmDialog, VIDEOS_FOLDER};
use crate::api::{with_identifier_query, CallOptions};
use crate::bus::BusEvent;
use crate::error::validation;
use crate::toast::{Toast, ToastMessage, ToastOptions};
use crate::types::{FileEntry, MoveFileRequest, RenameRequest, SimilarRequest, SimilarVideo, VideoPathRequest};

impl Actions {
    pub fn confirm_delete(&self, filename: &str) {
        self.open_dialog(ConfirmDialog::delete_file(filename));
    }

    pub fn confirm_rename(&self, entry: &FileEntry) {
        self.open_dialog(ConfirmDialog::rename_file(entry));
    }

    pub fn confirm_move(&self, entry: &FileEntry) {
        let last = self.settings.get().last_move_subfolder;
        self.open_dialog(ConfirmDialog::move_file(entry, self.view.unique_folders(), &last));
    }

    pub async fn delete_file(&self, filename: &str) -> bool {
        let path = with_identifier_query("/api/files", filename);
        let ok = self.api.call(&path, CallOptions::delete("Error deleting file")).await.is_some();
        if ok {
            info!(filename, "file deleted");
            self.refetch();
        }
        ok
    }

    /// Sets a new display title. Refused locally when it is empty or unchanged.
    pub async fn rename_file(&self, entry: &FileEntry, new_name: &str) -> bool {
        self.rename(&entry.filename, &entry.display_title(), new_name).await
    }

    pub(super) async fn rename(&self, filename: &str, current_name: &str, new_name: &str) -> bool {
        if let Err(e) = validation::require_non_empty(new_name, "newName", "New name must not be empty")
            .and_then(|_| validation::reject_nul(new_name, "newName"))
        {
            warn!(filename, "rename rejected: {}", e);
            self.toast("New name must not be empty or contain null characters");
            return false;
        }
        if new_name == current_name {
            self.toast("New name is the same as the current name");
            return false;
        }
        let body = RenameRequest { video_path: filename, new_name };
        let ok = self.api.call("/api/rename", CallOptions::post_json(&body, "Error renaming file")).await.is_some();
        if ok {
            self.refetch();
        }
        ok
    }

    /// Moves a file into a library subfolder (`""` for the library root, [`VIDEOS_FOLDER`]
    /// for the download folder). The target is remembered for the next move dialog.
    pub async fn move_file(&self, entry: &FileEntry, subfolder: &str) -> bool {
        self.move_to(&entry.filename, &entry.folder, subfolder).await
    }

    pub(super) async fn move_to(&self, filename: &str, current_folder: &str, subfolder: &str) -> bool {
        if current_folder == subfolder {
            self.toast("Cannot move file inside its own folder");
            return false;
        }
        if let Err(e) = self.settings.update(|s| s.last_move_subfolder = subfolder.to_string()) {
            warn!("failed to persist last move target: {}", e);
        }
        let body = MoveFileRequest { video_path: filename, subfolder };
        let ok = self.api.call("/api/move_file", CallOptions::post_json(&body, "Error moving file")).await.is_some();
        if ok {
            info!(filename, target = if subfolder == VIDEOS_FOLDER { "videos" } else { subfolder }, "file moved");
            self.refetch();
        }
        ok
    }

    /// Flips the favorite flag on the server, then locally. A refetch landing later wins.
    pub async fn toggle_favorite(&self, entry: &FileEntry) -> bool {
        let body = VideoPathRequest { video_path: &entry.filename };
        let ok = self
            .api
            .call("/api/toggle_favorite", CallOptions::post_json(&body, "Error favorite toggle"))
            .await
            .is_some();
        if ok {
            self.view.update_file(&entry.filename, |f| f.favorite = !f.favorite);
        }
        ok
    }

    pub async fn generate_thumbnail(&self, filename: &str) -> bool {
        let body = VideoPathRequest { video_path: filename };
        let opts = CallOptions::post_json(&body, "Error generating thumbnail").quiet();
        let data = self.api.call("/api/generate_thumbnail", opts).await;
        self.report_success(data, "Failed to generate thumbnail")
    }

    /// Bulk thumbnail generation for the download folder or the library.
    pub async fn generate_thumbnails(&self, library: bool) -> bool {
        let path = if library { "/api/library/generate_thumbnails" } else { "/api/generate_thumbnails" };
        let opts = CallOptions::post_empty("Error generating thumbnails").quiet();
        let data = self.api.call(path, opts).await;
        self.report_success(data, "Failed to generate thumbnails")
    }

    /// Shows the response when it carries `success`, the fallback text otherwise.
    fn report_success(&self, data: Option<serde_json::Value>, fallback: &str) -> bool {
        let Some(data) = data else {
            return false;
        };
        let success = data.get("success").map(is_truthy).unwrap_or(false);
        let message = if success { ToastMessage::from_response(&data) } else { ToastMessage::from(fallback) };
        self.api.toast(Toast::new(message));
        success
    }

    /// Files whose content resembles `entry`, best matches first as delivered by the server.
    pub async fn find_similar(&self, entry: &FileEntry, threshold: u8) -> Option<Vec<SimilarVideo>> {
        let body = SimilarRequest { video_path: &entry.filename, threshold: threshold.min(100) };
        let opts = CallOptions::post_json(&body, "Error loading similar videos").quiet();
        self.api.call_as::<Vec<SimilarVideo>>("/api/similar", opts).await
    }

    /// Shows the server's duplicate hints as a sticky, wide HTML toast. Entries without
    /// hints are ignored.
    pub fn show_duplicate_info(&self, entry: &FileEntry) -> bool {
        let Some(may_exist) = entry.may_exist.as_deref().filter(|m| !m.is_empty()) else {
            return false;
        };
        let options = ToastOptions { title: "Duplicates".into(), stay_open: true, wide: true };
        let message = ToastMessage::Structured { message: duplicate_markup(may_exist), title: None, html: true };
        self.api.toast(Toast::with_options(message, options));
        true
    }

    pub fn show_video_details(&self, entry: &FileEntry) {
        self.bus().publish(BusEvent::VideoDetails(entry.clone()));
    }
}

/// Lines naming a download id become headings, the rest paragraphs.
pub fn duplicate_markup(may_exist: &str) -> String {
    may_exist
        .split('\n')
        .map(|line| if line.contains("id[") { format!("<h5>{}</h5>", line) } else { format!("<p>{}</p>", line) })
        .collect::<Vec<_>>()
        .join("<br>")
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Null => false,
        serde_json::Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
