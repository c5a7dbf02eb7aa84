use std::path::{Component, Path};

use crate::TransferError;

/// Validates a client-supplied target file name before it is joined
/// into the uploads directory.
///
/// The protocol carries a bare file name in a header, never a path, so
/// anything but a single normal path component is rejected: separators,
/// `..`, `.`, absolute paths and platform prefixes.
pub fn validate_file_name(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::InvalidName("empty name".into()));
    }
    if name.contains(['/', '\\']) {
        return Err(TransferError::InvalidName(format!(
            "path separators not allowed: {name}"
        )));
    }

    // Exactly one normal component; catches "." and ".." and prefixes.
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(TransferError::InvalidName(format!(
            "not a plain file name: {name}"
        ))),
    }
}
