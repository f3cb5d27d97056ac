/// Helpers for checking input files and normalizing paths.
use std::env;
use std::fs::{self, File};
use std::path::Path;

use super::errors::*;

/// Whether `path` points to a regular file that can be opened for reading.
pub fn file_is_readable(path: &str) -> bool {
    Path::new(path).is_file() && File::open(path).is_ok()
}

/// Absolute form of `path`; the file does not have to exist.
pub fn abs_path(path: &str) -> Result<String> {
    let path = Path::new(path);
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .chain_err(|| "Could not determine the current working directory")?
            .join(path)
    };

    match abs.to_str() {
        Some(s) => Ok(s.to_string()),
        None => bail!("Path is not valid UTF-8: {:?}", abs),
    }
}

/// Check that `path` is a readable file and return its absolute form.
pub fn readable_abs_path(path: &str) -> Result<String> {
    if !file_is_readable(path) {
        bail!("The file {} does not exist or is not readable", path);
    }
    abs_path(path)
}

/// Create `path` and all missing parents.
pub fn ensure_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).chain_err(|| format!("Could not create directory {}", path))
}
