/// Validation of the reference file argument.
use lib_shared::fs_utils;

use super::errors::*;

/// Check that the reference file is readable and return its absolute path.
pub fn check_reference(reference: &str) -> Result<String> {
    fs_utils::readable_abs_path(reference)
        .chain_err(|| format!("The reference file {} is not readable", reference))
}
