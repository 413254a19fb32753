//! Disk I/O for the download sink.
//!
//! A destination is claimed by creating it empty with `create_new`, so two
//! tasks aimed at the same name end up with distinct files. The content is
//! written to a `.part` temp next to the claimed name and renamed over it once
//! complete.

mod writer;

pub use writer::StorageWriter;

use anyhow::{Context, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.jpg` → `a.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// `path` itself for `n == 0`, otherwise `name_n.ext`.
fn numbered(path: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };
    path.with_file_name(name)
}

/// Claim the first free variant of `path` (`path`, `name_1.ext`, `name_2.ext`, ...)
/// by creating it empty. The caller owns the returned name and must
/// [`release`] it if nothing ends up written there.
pub fn reserve_unique(path: &Path) -> Result<PathBuf> {
    let mut n = 0u32;
    loop {
        let candidate = numbered(path, n);
        match File::options().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e).with_context(|| format!("failed to reserve {}", candidate.display())),
        }
    }
}

/// Give back a name claimed by [`reserve_unique`].
pub fn release(reserved: &Path) {
    if let Err(e) = std::fs::remove_file(reserved) {
        tracing::debug!(path = %reserved.display(), "could not release reserved name: {}", e);
    }
}
