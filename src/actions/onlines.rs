use super::{Actions, ConfirmDialog};
use crate::api::{with_identifier_query, CallOptions};
use crate::types::OnlineEntry;

const ONLINES_PATH: &str = "/api/onlines";

impl Actions {
    /// Streamed URLs the server remembers, most recent first as the server sorts them.
    pub async fn list_onlines(&self) -> Option<Vec<OnlineEntry>> {
        self.view.set_loading(true);
        let onlines = self
            .api
            .call_as::<Vec<OnlineEntry>>(ONLINES_PATH, CallOptions::get("Error fetching onlines").quiet())
            .await;
        self.view.set_loading(false);
        onlines
    }

    pub fn confirm_delete_online(&self, entry: &OnlineEntry) {
        self.open_dialog(ConfirmDialog::delete_online(entry));
    }

    /// Forgets one tracked URL. The caller lists again on success.
    pub async fn delete_online(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            self.toast("Wrong number of parameters for OnlineEntry");
            return false;
        }
        let path = with_identifier_query(ONLINES_PATH, url);
        self.api.call(&path, CallOptions::delete("Error deleting entry")).await.is_some()
    }
}
