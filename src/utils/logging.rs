/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化全局日志
///
/// 级别由 `RUST_LOG` 控制，默认 `info`。重复调用不会 panic。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: {}", config.bind_addr);
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!("📂 临时目录: {}", config.scratch_dir.display());
    info!("📊 最大并发请求数: {}", config.max_concurrent_questions);
    info!("{}", "=".repeat(60));

    if !config.has_api_key() {
        error!("❌ 缺少 API Key，请设置 LLM_API_KEY 或 GROQ_API_KEY（可写入 .env 文件）");
        error!("   服务仍会启动，但所有 /api/ 请求都会失败");
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
