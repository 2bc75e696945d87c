use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::Value;

use super::view::ExportedFile;
use crate::document::DocumentSummary;

pub const PLACEHOLDER_HTML: &str = "<p>Start typing...</p>";
pub const LOAD_ERROR_HTML: &str = "<p>Error loading document</p>";

/// Picks the HTML to show for a stored `content` value: the `html` field of a
/// wrapped record, else a bare string, else the placeholder.
pub fn resolve_content(content: &Value) -> String {
    match content {
        Value::Object(fields) => match fields.get("html") {
            Some(Value::String(html)) if !html.is_empty() => html.clone(),
            _ => PLACEHOLDER_HTML.to_string(),
        },
        Value::String(html) if !html.is_empty() => html.clone(),
        _ => PLACEHOLDER_HTML.to_string(),
    }
}

/// Newest first. Entries without a timestamp (corrupted records) go last.
pub fn sort_newest_first(documents: &mut [DocumentSummary]) {
    documents.sort_by(|a, b| match (a.updated_at, b.updated_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

pub fn letter_template(date: NaiveDate) -> String {
    format!(
        r#"
<div class="template-block">
    <p><strong>From:</strong> [Sender Name]</p>
    <p><strong>To:</strong> [Receiver Name]</p>
    <p><strong>Date:</strong> {}</p>
</div>
<h2>Subject: [Type Subject Here]</h2>
<p>Dear [Name],</p>
<p>Start typing content here...</p>
"#,
        date.format("%-m/%-d/%Y")
    )
}

/// Wraps the surface HTML in an Office-namespaced page that word processors
/// open as a `.doc`.
pub fn word_export(title: &str, html: &str) -> ExportedFile {
    let header = "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
        xmlns:w='urn:schemas-microsoft-com:office:word' \
        xmlns='http://www.w3.org/TR/REC-html40'> \
        <head><meta charset='utf-8'><title>Export HTML to Word Document</title></head><body>";
    let footer = "</body></html>";

    let stem = if title.is_empty() { "document" } else { title };
    ExportedFile {
        file_name: format!("{stem}.doc"),
        mime_type: "application/vnd.ms-word",
        contents: format!("{header}{html}{footer}"),
    }
}
