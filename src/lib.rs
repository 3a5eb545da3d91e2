//! # QA Relay
//!
//! 接收包含单个 CSV 的 ZIP，逐题转发给 LLM，返回所有答案的 HTTP 服务
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有请求级资源，只暴露能力
//! - `ScratchDir` - 单个请求独占的解压目录，离开作用域即删除
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ArchiveIntake` - 校验 ZIP、定位并解压唯一的 CSV
//! - `LlmService` - 单轮对话补全能力（实现 `ChatCompleter`）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个上传文件"的完整处理流程
//! - `UploadCtx` - 上下文封装（请求编号 + 文件名）
//! - `QuestionFlow` - 流程编排（校验 → 解压 → 解析 → 提问 → 清理）
//!
//! ### ④ 编排层（Orchestration）
//! - `api/` - warp 路由与请求处理
//! - `app` - 组装依赖，启动服务
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{QuestionAnswers, UploadedArchive};
pub use services::{ChatCompleter, LlmService};
pub use workflow::{QuestionFlow, UploadCtx};
