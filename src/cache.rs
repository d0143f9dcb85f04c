use std::collections::HashMap;

use iced::widget::image::Handle;

#[derive(Debug, Clone)]
pub enum Thumbnail {
    Pending,
    Ready(Handle),
    Failed,
}

/// In-memory thumbnail cache keyed by thumbnail URL.
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    entries: HashMap<String, Thumbnail>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `url`. Returns true if the caller should fetch it.
    pub fn request(&mut self, url: &str) -> bool {
        if self.entries.contains_key(url) {
            return false;
        }
        self.entries.insert(url.to_string(), Thumbnail::Pending);
        true
    }

    pub fn complete(&mut self, url: &str, result: Result<Handle, String>) {
        let entry = match result {
            Ok(handle) => Thumbnail::Ready(handle),
            Err(e) => {
                log::warn!("Thumbnail fetch failed for {}: {}", url, e);
                Thumbnail::Failed
            }
        };
        self.entries.insert(url.to_string(), entry);
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        match self.entries.get(url) {
            Some(Thumbnail::Ready(handle)) => Some(handle),
            _ => None,
        }
    }
}

/// Download a thumbnail image.
pub async fn fetch_thumbnail(url: String) -> Result<Handle, String> {
    let response = reqwest::get(&url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    log::debug!("Fetched thumbnail {} ({} bytes)", url, bytes.len());
    Ok(Handle::from_bytes(bytes))
}
