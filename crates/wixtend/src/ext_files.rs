//! Auxiliary content referenced by the vendor content directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::vendor::fragments::{EXT_DIR_NAME, EXT_FILES};

/// Result of [`write_ext_files`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtFilesOutcome {
    /// Directory was created and populated
    Created(PathBuf),
    /// Directory already existed and was left alone
    Skipped(PathBuf),
}

impl ExtFilesOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Skipped(path) => path,
        }
    }
}

/// Create `<base>/vendor_ext1` with its two text files.
///
/// An existing entry at that path, whatever it contains, is never inspected
/// or overwritten.
pub fn write_ext_files(base: &Path) -> io::Result<ExtFilesOutcome> {
    let dir = base.join(EXT_DIR_NAME);
    if fs::symlink_metadata(&dir).is_ok() {
        debug!(path = %dir.display(), "ext directory exists, skipping");
        return Ok(ExtFilesOutcome::Skipped(dir));
    }

    fs::create_dir(&dir)?;
    for (name, contents) in EXT_FILES {
        fs::write(dir.join(name), contents)?;
    }
    info!(path = %dir.display(), "ext files written");
    Ok(ExtFilesOutcome::Created(dir))
}
