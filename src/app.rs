use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::{self, ApiState};
use crate::config::Config;
use crate::services::{ChatCompleter, LlmService};
use crate::utils::logging;
use crate::workflow::QuestionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<QuestionFlow>,
}

impl App {
    /// 初始化应用，使用真实的 LLM 服务
    pub fn initialize(config: Config) -> Self {
        let completer: Arc<dyn ChatCompleter> = Arc::new(LlmService::new(&config));
        Self::with_completer(config, completer)
    }

    /// 使用指定的补全实现初始化应用
    pub fn with_completer(config: Config, completer: Arc<dyn ChatCompleter>) -> Self {
        logging::log_startup(&config);

        let flow = Arc::new(QuestionFlow::new(&config, completer));
        Self { config, flow }
    }

    /// 路由共享状态
    pub fn state(&self) -> ApiState {
        ApiState::new(self.flow.clone(), self.config.max_upload_bytes)
    }

    /// 启动 HTTP 服务，收到 Ctrl-C 后优雅退出
    pub async fn run(self) -> Result<()> {
        let routes = api::routes(self.state());

        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(self.config.bind_addr, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("🛑 收到退出信号，正在关闭服务...");
            })
            .with_context(|| format!("无法监听地址 {}", self.config.bind_addr))?;

        info!("✓ 服务已启动: http://{}", addr);
        info!("   存活检查: GET  http://{}/", addr);
        info!("   上传接口: POST http://{}/api/", addr);

        server.await;
        info!("服务已停止");
        Ok(())
    }
}
