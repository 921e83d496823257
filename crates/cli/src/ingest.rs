//! File ingestion: project files become user messages.

use std::path::{Path, PathBuf};

use dmf_domain::Message;

/// Read every file concurrently and build one user message per
/// readable file, preserving the order of `paths`.
///
/// The contents are JSON-quoted so the model sees an unambiguous,
/// escaped string. Files that cannot be read (or are not valid UTF-8)
/// are logged and skipped; they contribute no message.
pub async fn ingest(paths: &[PathBuf]) -> Vec<Message> {
    let reads = paths.iter().map(|path| async move {
        match tokio::fs::read_to_string(path).await {
            Ok(data) => Some(file_message(path, &data)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                None
            }
        }
    });

    futures_util::future::join_all(reads)
        .await
        .into_iter()
        .flatten()
        .collect()
}

fn file_message(path: &Path, data: &str) -> Message {
    // serde_json::to_string on a &str cannot fail.
    let quoted = serde_json::to_string(data).unwrap_or_default();
    Message::user(format!("Here is my {} file : {}", path.display(), quoted))
}
