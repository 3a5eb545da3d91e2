//! 请求处理上下文
//!
//! 封装"我正在处理哪个请求的哪个上传文件"这一信息

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// 上传请求上下文（仅用于日志前缀）
#[derive(Debug, Clone)]
pub struct UploadCtx {
    /// 进程内单调递增的请求编号
    pub request_id: u64,
    /// 上传的文件名
    pub file_name: String,
}

impl UploadCtx {
    /// 创建新的请求上下文，自动分配请求编号
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            request_id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            file_name: file_name.into(),
        }
    }
}

impl Display for UploadCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[请求 #{} 文件 {}]", self.request_id, self.file_name)
    }
}
