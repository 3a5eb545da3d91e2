use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "qa_relay.toml";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_addr: SocketAddr,
    /// 解压 CSV 的临时根目录（每个请求在其中创建独立子目录）
    pub scratch_dir: PathBuf,
    /// 上传文件大小上限（字节）
    pub max_upload_bytes: u64,
    /// 同时进行的 LLM 请求数量，1 表示逐题顺序调用
    pub max_concurrent_questions: usize,
    /// 是否显示详细日志（逐题打印答案预览）
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            scratch_dir: std::env::temp_dir().join("extracted_files"),
            max_upload_bytes: 20 * 1024 * 1024,
            max_concurrent_questions: 1,
            verbose_logging: false,
            llm_api_key: None,
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama3-8b-8192".to_string(),
        }
    }
}

/// TOML 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    bind_addr: Option<SocketAddr>,
    scratch_dir: Option<PathBuf>,
    max_upload_bytes: Option<u64>,
    max_concurrent_questions: Option<usize>,
    verbose_logging: Option<bool>,
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let explicit = std::env::var("QA_RELAY_CONFIG").ok();
        let path = explicit
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        // 显式指定的配置文件必须存在，默认文件可以缺省
        if explicit.is_some() || path.exists() {
            config.merge_file(&path)?;
            info!("已加载配置文件: {}", path.display());
        }

        config.apply_env_with(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// 合并 TOML 配置文件
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        self.merge_toml(&content)
            .map_err(|source| ConfigError::ParseFailed {
                path: path.display().to_string(),
                source,
            })
    }

    /// 合并 TOML 字符串
    pub fn merge_toml(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;

        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file.scratch_dir {
            self.scratch_dir = v;
        }
        if let Some(v) = file.max_upload_bytes {
            self.max_upload_bytes = v;
        }
        if let Some(v) = file.max_concurrent_questions {
            self.max_concurrent_questions = v.max(1);
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }
        if file.llm_api_key.is_some() {
            self.llm_api_key = file.llm_api_key;
        }
        if let Some(v) = file.llm_api_base_url {
            self.llm_api_base_url = v;
        }
        if let Some(v) = file.llm_model_name {
            self.llm_model_name = v;
        }
        Ok(())
    }

    /// 用环境变量覆盖配置，`lookup` 便于测试时替换环境
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        parse_into(&lookup, "BIND_ADDR", &mut self.bind_addr);
        if let Some(v) = lookup("SCRATCH_DIR") {
            self.scratch_dir = PathBuf::from(v);
        }
        parse_into(&lookup, "MAX_UPLOAD_BYTES", &mut self.max_upload_bytes);
        parse_into(
            &lookup,
            "MAX_CONCURRENT_QUESTIONS",
            &mut self.max_concurrent_questions,
        );
        self.max_concurrent_questions = self.max_concurrent_questions.max(1);
        parse_into(&lookup, "VERBOSE_LOGGING", &mut self.verbose_logging);

        if let Some(key) = lookup("LLM_API_KEY").or_else(|| lookup("GROQ_API_KEY")) {
            if !key.trim().is_empty() {
                self.llm_api_key = Some(key);
            }
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
    }

    /// 是否已配置 API Key
    pub fn has_api_key(&self) -> bool {
        self.llm_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

fn parse_into<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, slot: &mut T) {
    if let Some(raw) = lookup(name) {
        match raw.parse() {
            Ok(v) => *slot = v,
            Err(_) => warn!("环境变量 {} 的值 '{}' 无法解析，保留原值", name, raw),
        }
    }
}
