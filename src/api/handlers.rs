//! 请求处理函数

use std::convert::Infallible;

use bytes::BufMut;
use futures::TryStreamExt;
use serde::Serialize;
use tracing::{debug, warn};
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::reply::{Json, WithStatus};
use warp::{Rejection, Reply};

use crate::api::ApiState;
use crate::error::{AppError, AppResult, InputError};
use crate::models::UploadedArchive;
use crate::workflow::UploadCtx;

/// 可接受的上传字段名（`files` 为当前版本，`file` 兼容旧客户端）
const UPLOAD_FIELDS: [&str; 2] = ["files", "file"];

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// GET / - 存活检查
pub async fn root() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({ "message": "Hello, World!" })))
}

/// POST /api/ - 上传 ZIP 并返回所有问题的答案
pub async fn upload(form: FormData, state: ApiState) -> Result<impl Reply, Infallible> {
    let result = match read_upload(form).await {
        Ok(upload) => {
            let ctx = UploadCtx::new(upload.file_name.clone());
            state.flow.run(upload, &ctx).await
        }
        Err(e) => {
            warn!("读取上传内容失败: {}", e);
            Err(e)
        }
    };

    Ok(match result {
        Ok(answers) => warp::reply::with_status(warp::reply::json(&answers), StatusCode::OK),
        Err(e) => error_reply(e.status_code(), &e.to_string()),
    })
}

/// 把 warp 的拒绝统一转换为 `{"error": ...}` 响应
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let reply = if err.is_not_found() {
        error_reply(StatusCode::NOT_FOUND, "Not Found")
    } else if let Some(e) = err.find::<warp::reject::PayloadTooLarge>() {
        error_reply(StatusCode::PAYLOAD_TOO_LARGE, &e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        error_reply(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        warn!("未处理的请求拒绝: {:?}", err);
        error_reply(StatusCode::BAD_REQUEST, "Invalid request.")
    };
    Ok(reply)
}

/// 从 multipart 表单中取出第一个上传文件
async fn read_upload(mut form: FormData) -> AppResult<UploadedArchive> {
    while let Some(part) = form.try_next().await.map_err(multipart_error)? {
        if !UPLOAD_FIELDS.contains(&part.name()) {
            debug!("忽略表单字段: {}", part.name());
            continue;
        }

        let file_name = part.filename().unwrap_or_default().to_string();
        let bytes = part
            .stream()
            .try_fold(Vec::new(), |mut buf, chunk| async move {
                buf.put(chunk);
                Ok(buf)
            })
            .await
            .map_err(multipart_error)?;

        return Ok(UploadedArchive::new(file_name, bytes));
    }

    Err(InputError::MissingFile.into())
}

fn multipart_error(err: warp::Error) -> AppError {
    InputError::Multipart(err.to_string()).into()
}

fn error_reply(status: StatusCode, message: &str) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status)
}
