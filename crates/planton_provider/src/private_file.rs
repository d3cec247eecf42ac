//! Owner-only file writes for credential-bearing artifacts.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Create (or truncate) `path` with mode 0600 and write `contents` to it.
///
/// Parent directories are created as needed. The file is flushed and closed
/// before returning.
pub fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}
