use std::path::PathBuf;

use typed_path::Utf8NativePathBuf;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<Utf8NativePathBuf, String> {
    if value.is_empty() {
        return Err("Path must not be empty".to_string());
    }
    Ok(Utf8NativePathBuf::from(value))
}

pub fn std_path(path: &Utf8NativePathBuf) -> PathBuf { PathBuf::from(path.as_str()) }
