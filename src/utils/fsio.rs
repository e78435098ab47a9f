//! 文件写入辅助
//!
//! 缓存和会话文件要求"文件级全有或全无"：被中断的运行不能留下半截文件

use std::fs;
use std::path::Path;

use crate::error::{CollectError, Result};

/// 原子化写入：先写临时文件再重命名
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CollectError::persistence(parent.display().to_string(), e))?;
    }

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)
        .map_err(|e| CollectError::persistence(tmp_path.display().to_string(), e))?;
    fs::rename(&tmp_path, path)
        .map_err(|e| CollectError::persistence(path.display().to_string(), e))?;
    Ok(())
}

/// 幂等删除：文件不存在不算错误
pub fn remove_quiet(path: &Path) {
    let _ = fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veri.json");
        write_atomic(&path, b"{\"a\":1}").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{\"a\":1}");
        // 临时文件不残留
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn remove_quiet_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yok.json");
        remove_quiet(&path);
        remove_quiet(&path);
    }
}
