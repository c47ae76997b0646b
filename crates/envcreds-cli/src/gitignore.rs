//! `.gitignore` bookkeeping for key files.

use std::io;
use std::path::Path;

/// Ignore file in the working directory.
pub const FILE_NAME: &str = ".gitignore";

/// Append `entry` as its own line unless an identical line is present.
///
/// Creates the file when missing. Returns whether the file changed.
pub async fn ensure_entry(path: &Path, entry: &str) -> io::Result<bool> {
    let mut content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    if content.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(entry);
    content.push('\n');

    tokio::fs::write(path, content).await?;
    Ok(true)
}
