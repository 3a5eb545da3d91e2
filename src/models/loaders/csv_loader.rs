use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{AppError, AppResult, InputError};
use crate::models::question::{QuestionRow, QuestionTable};

/// 必须存在的题目列名
const QUESTION_COLUMN: &str = "question";

/// 从解压后的 CSV 文件加载题目表
pub fn load_question_table(csv_path: &Path) -> AppResult<QuestionTable> {
    let file =
        File::open(csv_path).map_err(|e| AppError::extract_failed(csv_path.display().to_string(), e))?;
    let table = read_question_table(file)?;

    debug!(
        "CSV 读取成功: {} ({} 道题, 跳过 {} 个空行)",
        csv_path.display(),
        table.len(),
        table.skipped_blank
    );

    Ok(table)
}

/// 从任意 reader 解析题目表
pub fn read_question_table<R: Read>(reader: R) -> AppResult<QuestionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let column = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .position(|name| name == QUESTION_COLUMN)
        .ok_or(InputError::MissingQuestionColumn)?;

    let mut table = QuestionTable::default();

    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(malformed)?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        let question = record.get(column).unwrap_or_default();
        if question.trim().is_empty() {
            warn!("CSV 第 {} 行题目为空，已跳过", line);
            table.skipped_blank += 1;
            continue;
        }

        table.rows.push(QuestionRow {
            line,
            question: question.to_string(),
        });
    }

    Ok(table)
}

fn malformed(err: csv::Error) -> AppError {
    InputError::MalformedCsv(err.to_string()).into()
}
