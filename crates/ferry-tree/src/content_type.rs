use std::path::Path;

/// Content type for a path, derived from its extension alone.
///
/// Known extensions map to a MIME type, unknown ones to
/// `application/octet-stream`. A path without an extension yields `""`.
pub fn content_type_for(path: &str) -> &'static str {
    let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) else {
        return "";
    };
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "mjs" | "cjs" => "text/javascript",
        "ts" | "tsx" => "text/typescript",
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "rs" => "text/x-rust",
        "py" => "text/x-python",
        "sh" => "application/x-sh",
        "c" | "h" => "text/x-c",
        "go" => "text/x-go",
        _ => "application/octet-stream",
    }
}
