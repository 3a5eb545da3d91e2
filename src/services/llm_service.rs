//! 单轮问答补全
//!
//! 每道题作为一条独立的 user 消息发给 `/chat/completions`，不带系统提示和历史，
//! 取第一个候选的文本作为答案。默认指向 Groq 的 OpenAI 兼容端点。

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;

/// 单轮对话补全能力
///
/// 由编排层以 `Arc<dyn ChatCompleter>` 注入，测试时可替换为假实现
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// 以 `prompt` 作为唯一的用户消息发起一次补全，返回回答文本
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// 使用的模型名（仅用于日志）
    fn model_name(&self) -> &str;
}

/// 基于 OpenAI 兼容接口的 LLM 服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    ///
    /// 缺少 API Key 时仍可创建，请求会在流程层被拦截
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.clone().unwrap_or_default())
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    fn api_failed(&self, source: impl std::error::Error + Send + Sync + 'static) -> LlmError {
        LlmError::ApiCallFailed {
            model: self.model_name.clone(),
            source: Box::new(source),
        }
    }
}

#[async_trait]
impl ChatCompleter for LlmService {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| self.api_failed(e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .build()
            .map_err(|e| self.api_failed(e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            self.api_failed(e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
