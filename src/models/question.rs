use std::collections::HashMap;

use serde::Serialize;

/// 上传的压缩包
///
/// 只在单个请求内存活，不落盘
#[derive(Debug, Clone)]
pub struct UploadedArchive {
    /// 上传时声明的文件名
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedArchive {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// CSV 中的一道题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    /// CSV 行号（表头为第 1 行）
    pub line: u64,
    pub question: String,
}

/// 从 CSV 中读出的题目表
#[derive(Debug, Clone, Default)]
pub struct QuestionTable {
    pub rows: Vec<QuestionRow>,
    /// 因题目为空而跳过的行数
    pub skipped_blank: usize,
}

impl QuestionTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 题目 → 答案
///
/// 序列化为 `{"responses": {...}}`。同一题目出现多次时后写入的答案覆盖之前的。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionAnswers {
    responses: HashMap<String, String>,
}

impl QuestionAnswers {
    /// 写入答案，返回被覆盖的旧答案
    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) -> Option<String> {
        self.responses.insert(question.into(), answer.into())
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.responses.get(question).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
