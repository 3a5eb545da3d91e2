//! 压缩包接收服务 - 业务能力层
//!
//! 只负责"校验 ZIP 并取出唯一的 CSV"能力，不关心题目内容

use std::fs::File;
use std::io::Cursor;
use std::path::PathBuf;

use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{AppError, AppResult, InputError};
use crate::infrastructure::ScratchDir;

const ARCHIVE_EXTENSION: &str = ".zip";
const TABLE_EXTENSION: &str = ".csv";
/// macOS 压缩时附带的资源分支目录
const MACOS_METADATA_DIR: &str = "__MACOSX/";

/// 校验上传文件名是否为 ZIP（在读取任何字节之前）
pub fn check_file_name(file_name: &str) -> AppResult<()> {
    if has_extension(file_name, ARCHIVE_EXTENSION) {
        Ok(())
    } else {
        Err(InputError::NotZipName.into())
    }
}

/// 已打开的上传压缩包
///
/// 策略：压缩包中必须恰好有一个 CSV 条目，其余非 CSV 条目忽略
pub struct ArchiveIntake {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl ArchiveIntake {
    /// 以 ZIP 格式打开字节缓冲
    pub fn open(bytes: Vec<u8>) -> AppResult<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            debug!("ZIP 解析失败: {}", e);
            InputError::InvalidZip
        })?;

        debug!("ZIP 打开成功，共 {} 个条目", archive.len());
        Ok(Self { archive })
    }

    /// 所有 CSV 条目名（忽略目录和 `__MACOSX/`）
    pub fn csv_entries(&self) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| !name.ends_with('/') && !name.starts_with(MACOS_METADATA_DIR))
            .filter(|name| has_extension(name, TABLE_EXTENSION))
            .map(str::to_string)
            .collect()
    }

    /// 取出唯一的 CSV 条目名，数量不为 1 时报错
    pub fn single_csv_entry(&self) -> AppResult<String> {
        let mut entries = self.csv_entries();
        if entries.len() != 1 {
            info!("ZIP 中包含 {} 个 CSV 条目，拒绝处理", entries.len());
            return Err(InputError::CsvEntryCount {
                found: entries.len(),
            }
            .into());
        }
        Ok(entries.remove(0))
    }

    /// 将条目解压到临时目录，返回落盘路径
    ///
    /// 条目名必须能留在压缩包根目录之内，落盘时只用它的最后一段
    pub fn extract_entry(&mut self, entry_name: &str, scratch: &ScratchDir) -> AppResult<PathBuf> {
        let mut entry = self
            .archive
            .by_name(entry_name)
            .map_err(|_| InputError::InvalidZip)?;

        let file_name = entry
            .enclosed_name()
            .and_then(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .ok_or_else(|| InputError::UnsafeEntryName {
                name: entry_name.to_string(),
            })?;
        let dest = scratch.file_path(&file_name);

        let mut out =
            File::create(&dest).map_err(|e| AppError::extract_failed(dest.display().to_string(), e))?;
        let written = std::io::copy(&mut entry, &mut out)
            .map_err(|e| AppError::extract_failed(dest.display().to_string(), e))?;

        debug!("已解压 {} → {} ({} 字节)", entry_name, dest.display(), written);
        Ok(dest)
    }
}

fn has_extension(name: &str, ext: &str) -> bool {
    name.len() >= ext.len()
        && name.is_char_boundary(name.len() - ext.len())
        && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
}
