use std::io::Error;
use std::path::{Path, PathBuf};

use crate::core::jobs::JobError;

pub fn map_err_adding_description(error: Error, description: &str) -> JobError {
  JobError::IoError(std::io::Error::new(
    error.kind(),
    format!("{}: {}", description, error),
  ))
}

/// Absolute form of `path` relative to the current directory, without resolving symlinks.
pub fn absolute_path(path: &Path) -> Result<PathBuf, JobError> {
  std::path::absolute(path)
    .map_err(|e| map_err_adding_description(e, &format!("Cannot resolve '{}'", path.display())))
}

/// (Re)creates `link` pointing at `target`, replacing whatever entry was there, dangling links included.
#[cfg(unix)]
pub fn replace_symlink(target: &Path, link: &Path) -> Result<(), JobError> {
  if link.symlink_metadata().is_ok() {
    std::fs::remove_file(link)
      .map_err(|e| map_err_adding_description(e, "Failed to remove previous job script link"))?;
  }
  std::os::unix::fs::symlink(target, link)
    .map_err(|e| map_err_adding_description(e, "Failed to link job script"))?;
  Ok(())
}

#[cfg(not(unix))]
pub fn replace_symlink(target: &Path, link: &Path) -> Result<(), JobError> {
  if link.symlink_metadata().is_ok() {
    std::fs::remove_file(link)?;
  }
  std::fs::copy(target, link)?;
  Ok(())
}
