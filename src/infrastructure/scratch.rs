//! 临时目录 - 基础设施层
//!
//! 持有单个请求的解压目录，离开作用域时连同其中文件一起删除

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{AppResult, FileError};

/// 单个请求独占的临时目录
///
/// 职责：
/// - 在配置的根目录下创建唯一子目录，避免并发请求文件名冲突
/// - 无论成功还是失败，drop 时都会删除
/// - 不认识 CSV / 题目
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// 在 `root` 下创建临时目录（根目录不存在时自动创建）
    pub fn create_in(root: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(root).map_err(|source| FileError::ScratchCreateFailed {
            path: root.display().to_string(),
            source,
        })?;

        let dir = tempfile::Builder::new()
            .prefix("upload-")
            .tempdir_in(root)
            .map_err(|source| FileError::ScratchCreateFailed {
                path: root.display().to_string(),
                source,
            })?;

        debug!("创建临时目录: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// 目录内某个文件名对应的路径
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    /// 显式删除，删除失败只记录警告
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!("已删除临时目录: {}", path.display()),
            Err(e) => warn!("删除临时目录失败 {}: {}", path.display(), e),
        }
    }
}
