use std::io;
use std::path::Path;

/// Free bytes available to writes at `path`'s filesystem.
pub fn available_space(path: &Path) -> io::Result<u64> {
    fs2::available_space(path)
}
