use tracing::info;

use super::Actions;
use crate::api::CallOptions;
use crate::bus::BusEvent;
use crate::types::{StreamInfo, StreamResponse, VideoUrlRequest};

/// Outcome of a submitted video URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The server queued a download; its answer was shown as a toast.
    Queued,
    /// The server resolved a playable stream.
    Stream(StreamInfo),
}

impl Actions {
    /// Hands a page or media URL to the server, either to download it or to resolve a
    /// directly playable stream.
    pub async fn submit_video_url(&self, url: &str, stream: bool) -> Option<Submission> {
        let url = url.trim();
        if url.is_empty() {
            self.toast("Please enter a video URL");
            return None;
        }
        self.bus().publish(BusEvent::VideoUrl { url: url.to_string(), stream });

        let body = VideoUrlRequest { source_url: url, url };
        let path = if stream { "/stream" } else { "/download" };
        let error_message = if stream { "Error streaming file" } else { "Error downloading file" };

        if !stream {
            self.api.call(path, CallOptions::post_json(&body, error_message)).await?;
            info!(url, "download queued");
            return Some(Submission::Queued);
        }

        let resp = self.api.call_as::<StreamResponse>(path, CallOptions::post_json(&body, error_message).quiet()).await?;
        match resp.into_stream_info() {
            Some(info) => Some(Submission::Stream(info)),
            None => {
                self.toast("Error: No video URL found to be played");
                None
            }
        }
    }
}
