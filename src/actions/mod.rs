//! User-triggered operations on files, bookmarks and submitted URLs.
//!
//! Every action goes through the [`ApiGateway`], so failures end up as toasts and never as
//! errors. Actions that change the server-side file list request a refetch on the bus once
//! they succeed.

pub mod bookmarks;
pub mod files;
pub mod onlines;
pub mod videos;

use std::sync::Arc;

use tracing::debug;

use crate::api::{ApiGateway, CallOptions};
use crate::bus::{BusEvent, EventBus};
use crate::settings::SettingsStore;
use crate::toast::{OneShotWarning, Toast};
use crate::types::{FileEntry, OnlineEntry};
use crate::view::ViewStore;

/// Move target that puts a file back into the download folder.
pub const VIDEOS_FOLDER: &str = "~videos~";

/// What happens when a confirm dialog is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteFile,
    RenameFile,
    MoveFile,
    Cleanup,
    DeleteOnline,
    ServerUpdate,
}

/// Input controls rendered below the dialog message.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogExtras {
    #[default]
    None,
    /// Text field prefilled with the current title.
    RenameInput { current_name: String },
    /// Folder picker; `""` is the library root and [`VIDEOS_FOLDER`] the download folder.
    MoveTarget { folders: Vec<String>, selected: String },
}

/// A confirmation request, published on the bus and answered through [`Actions::confirm`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    /// The file the action applies to, if any.
    pub file: Option<String>,
    /// Label of the submit button.
    pub submit: String,
    pub action: ConfirmAction,
    pub extras: DialogExtras,
    /// Folder the file currently lives in; move requests to the same folder are refused.
    pub current_folder: Option<String>,
}

impl ConfirmDialog {
    pub fn delete_file(filename: &str) -> Self {
        Self {
            title: "Delete file".into(),
            message: "Are you sure you want to delete the following file?".into(),
            file: Some(filename.to_string()),
            submit: "Delete".into(),
            action: ConfirmAction::DeleteFile,
            extras: DialogExtras::None,
            current_folder: None,
        }
    }

    pub fn rename_file(entry: &FileEntry) -> Self {
        Self {
            title: "Rename file".into(),
            message: "Rename the title for the following file:".into(),
            file: Some(entry.filename.clone()),
            submit: "Rename".into(),
            action: ConfirmAction::RenameFile,
            extras: DialogExtras::RenameInput { current_name: entry.display_title() },
            current_folder: None,
        }
    }

    /// `last_used` preselects the folder picked the last time, if it is still offered.
    pub fn move_file(entry: &FileEntry, folders: Vec<String>, last_used: &str) -> Self {
        let selected = if last_used.is_empty() || last_used == VIDEOS_FOLDER || folders.iter().any(|f| f == last_used) {
            last_used.to_string()
        } else {
            String::new()
        };
        Self {
            title: "Move file".into(),
            message: "Are you sure you want to move the following file inside library?".into(),
            file: Some(entry.filename.clone()),
            submit: "Move".into(),
            action: ConfirmAction::MoveFile,
            extras: DialogExtras::MoveTarget { folders, selected },
            current_folder: Some(entry.folder.clone()),
        }
    }

    pub fn cleanup() -> Self {
        Self {
            title: "Cleanup files".into(),
            message: "This will clean the download tracked files and find orphan thumbnails and delete them, \
                      Are you sure you want to proceed?"
                .into(),
            file: None,
            submit: "Cleanup".into(),
            action: ConfirmAction::Cleanup,
            extras: DialogExtras::None,
            current_folder: None,
        }
    }

    /// The tracked URL travels in `file`; it is the key the server deletes by.
    pub fn delete_online(entry: &OnlineEntry) -> Self {
        Self {
            title: "Delete Online tracked entry".into(),
            message: format!(
                "Are you sure you want to delete the tracked online entry \"{}\" from DB?",
                entry.display_title()
            ),
            file: Some(entry.url.clone()),
            submit: "Delete".into(),
            action: ConfirmAction::DeleteOnline,
            extras: DialogExtras::None,
            current_folder: None,
        }
    }

    pub fn server_update() -> Self {
        Self {
            title: "Server Update".into(),
            message: "This will call a Server Update. The process might be killed and connection can get lost, \
                      Are you sure you want to proceed?"
                .into(),
            file: None,
            submit: "Update".into(),
            action: ConfirmAction::ServerUpdate,
            extras: DialogExtras::None,
            current_folder: None,
        }
    }
}

/// Entry point for all user actions of one context.
#[derive(Clone)]
pub struct Actions {
    api: ApiGateway,
    view: Arc<ViewStore>,
    settings: Arc<SettingsStore>,
    preview_warning: Arc<OneShotWarning>,
}

impl Actions {
    pub fn new(api: ApiGateway, view: Arc<ViewStore>, settings: Arc<SettingsStore>) -> Self {
        Self { api, view, settings, preview_warning: Arc::new(OneShotWarning::new()) }
    }

    fn bus(&self) -> &EventBus {
        self.api.bus()
    }

    fn refetch(&self) {
        self.bus().publish(BusEvent::RefetchFiles);
    }

    fn toast(&self, message: &str) {
        self.api.toast(Toast::new(message));
    }

    /// Publishes the dialog; whoever renders it answers with [`confirm`](Self::confirm).
    pub fn open_dialog(&self, dialog: ConfirmDialog) {
        debug!(action = ?dialog.action, "confirm dialog requested");
        self.bus().publish(BusEvent::ConfirmDialog(dialog));
    }

    /// Runs the dialog's action. `input` is the value of the extra control (new title, move
    /// target); without it the prefilled value is used. Returns whether the action succeeded.
    pub async fn confirm(&self, dialog: &ConfirmDialog, input: Option<&str>) -> bool {
        match dialog.action {
            ConfirmAction::Cleanup => return self.cleanup().await,
            ConfirmAction::ServerUpdate => return self.update_server().await,
            _ => {}
        }
        let Some(file) = dialog.file.as_deref() else {
            self.toast("Wrong number of parameters for this action");
            return false;
        };
        match (dialog.action, &dialog.extras) {
            (ConfirmAction::DeleteFile, _) => self.delete_file(file).await,
            (ConfirmAction::DeleteOnline, _) => self.delete_online(file).await,
            (ConfirmAction::RenameFile, DialogExtras::RenameInput { current_name }) => {
                let new_name = input.unwrap_or(current_name);
                self.rename(file, current_name, new_name).await
            }
            (ConfirmAction::MoveFile, DialogExtras::MoveTarget { selected, .. }) => {
                let target = input.unwrap_or(selected);
                let current = dialog.current_folder.as_deref().unwrap_or_default();
                self.move_to(file, current, target).await
            }
            _ => {
                self.toast("Wrong number of parameters for this action");
                false
            }
        }
    }

    /// Server-side housekeeping: drops stale download records and orphaned thumbnails.
    pub async fn cleanup(&self) -> bool {
        let ok = self.api.call("/cleanup", CallOptions::get("Error occurred during cleanup")).await.is_some();
        if ok {
            self.refetch();
        }
        ok
    }

    pub async fn clear_cache(&self) -> bool {
        let ok = self.api.call("/cache/clear", CallOptions::get("Error clearing cache")).await.is_some();
        if ok {
            self.refetch();
        }
        ok
    }

    /// Asks the server to rescan its video folders. The scan reports through the push
    /// stream, so nothing is refetched here.
    pub async fn scan_videos(&self) -> bool {
        self.api.call("/scan", CallOptions::get("Error scanning files")).await.is_some()
    }

    pub fn confirm_update(&self) {
        self.open_dialog(ConfirmDialog::server_update());
    }

    /// Triggers a server self-update. The server may restart, so a failure here is expected
    /// and gets its own explanation.
    pub async fn update_server(&self) -> bool {
        let opts = CallOptions::get("Server may lost connection after update see Info box or reload page");
        self.api.call("/update", opts).await.is_some()
    }

    /// Called when preview playback is refused by the platform; the hint is shown once.
    pub fn preview_blocked(&self) -> bool {
        if !self.preview_warning.claim() {
            return false;
        }
        self.toast("Please interact with the document (e.g., click or press a key) before video preview playing is allowed.");
        true
    }
}
