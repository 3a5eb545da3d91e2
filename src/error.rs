use thiserror::Error;
use warp::http::StatusCode;

/// 应用程序错误类型
///
/// 所有错误最终都会被转换为 `{"error": <message>}` 响应体，
/// HTTP 状态码由 [`AppError::status_code`] 决定。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 客户端输入错误
    #[error(transparent)]
    Input(#[from] InputError),
    /// LLM 服务错误
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error(transparent)]
    File(#[from] FileError),
    /// 其他错误（后台任务崩溃等）
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API Key
    #[error("Missing API key: set LLM_API_KEY (or GROQ_API_KEY) in the environment or .env file.")]
    MissingApiKey,
    /// 配置文件读取失败
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 客户端输入错误
#[derive(Debug, Error)]
pub enum InputError {
    #[error("No file uploaded.")]
    MissingFile,
    #[error("Invalid multipart upload: {0}")]
    Multipart(String),
    #[error("Uploaded file must be a ZIP file.")]
    NotZipName,
    #[error("Uploaded file is not a valid ZIP archive.")]
    InvalidZip,
    #[error("ZIP must contain exactly one CSV file.")]
    CsvEntryCount { found: usize },
    /// 条目名无法安全地映射到磁盘路径
    #[error("ZIP entry name is not a safe file name: {name}")]
    UnsafeEntryName { name: String },
    #[error("CSV file must contain a 'question' column.")]
    MissingQuestionColumn,
    #[error("Malformed CSV file: {0}")]
    MalformedCsv(String),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API call failed (model: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM returned no content (model: {model})")]
    EmptyContent { model: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 创建临时目录失败
    #[error("Failed to create scratch directory {path}: {source}")]
    ScratchCreateFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 解压条目失败
    #[error("Failed to extract {path}: {source}")]
    ExtractFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// 错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::File(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 是否为客户端输入错误
    pub fn is_input(&self) -> bool {
        matches!(self, AppError::Input(_))
    }
}

// ========== 从常见错误类型转换 ==========

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建解压失败错误
    pub fn extract_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ExtractFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
