use anyhow::Result;
use qa_relay::utils::logging;
use qa_relay::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 读取 .env（不存在时忽略）
    let dotenv = dotenvy::dotenv();

    // 初始化日志
    logging::init();

    if let Ok(path) = dotenv {
        tracing::debug!("已加载环境文件: {}", path.display());
    }

    // 加载配置
    let config = Config::load()?;

    // 初始化并运行应用
    App::initialize(config).run().await?;

    Ok(())
}
