//! HTTP API 模块
//!
//! 负责所有与调用方的交互：
//! - `GET /`      存活检查
//! - `POST /api/` 上传 ZIP，返回 `{"responses": {...}}` 或 `{"error": ...}`

pub mod handlers;

use std::convert::Infallible;
use std::sync::Arc;

use warp::path::Tail;
use warp::{Filter, Rejection, Reply};

use crate::workflow::QuestionFlow;

/// 路由共享状态
#[derive(Clone)]
pub struct ApiState {
    pub flow: Arc<QuestionFlow>,
    pub max_upload_bytes: u64,
}

impl ApiState {
    pub fn new(flow: Arc<QuestionFlow>, max_upload_bytes: u64) -> Self {
        Self {
            flow,
            max_upload_bytes,
        }
    }
}

/// 组装全部路由
pub fn routes(state: ApiState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let root = warp::path::end().and(warp::get()).and_then(handlers::root);

    let upload = api_path()
        .and(warp::post())
        .and(warp::multipart::form().max_length(state.max_upload_bytes))
        .and(with_state(state))
        .and_then(handlers::upload);

    root.or(upload).recover(handlers::handle_rejection)
}

/// 同时匹配 `/api` 和 `/api/`
fn api_path() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::path("api")
        .and(warp::path::tail())
        .and_then(|tail: Tail| async move {
            if tail.as_str().trim_matches('/').is_empty() {
                Ok(())
            } else {
                Err(warp::reject::not_found())
            }
        })
        .untuple_one()
}

fn with_state(state: ApiState) -> impl Filter<Extract = (ApiState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
