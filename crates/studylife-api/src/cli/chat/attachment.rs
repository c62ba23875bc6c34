//! Load a local file as a chat attachment.
//!
//! Images and PDFs become base64 data URLs; text files are sent as-is.
//! Other files are sent by name only.

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;

use studylife_types::chat::{Attachment, AttachmentCategory};

/// Largest file accepted as an attachment.
const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

pub async fn load_attachment(path: &Path) -> Result<Attachment> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();
    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?
        .len();
    if size > MAX_ATTACHMENT_BYTES {
        anyhow::bail!("{name} is too large to attach ({size} bytes)");
    }

    let mime_type = guess_mime(&name).to_string();
    let category = AttachmentCategory::classify(&name, &mime_type);
    let data = match category {
        AttachmentCategory::Image | AttachmentCategory::Pdf => {
            let bytes = tokio::fs::read(path).await?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            format!("data:{mime_type};base64,{encoded}")
        }
        AttachmentCategory::Text => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("{name} is not valid UTF-8 text"))?,
        AttachmentCategory::Other => String::new(),
    };

    Ok(Attachment {
        name,
        mime_type,
        data,
        category,
    })
}
