pub mod dispatch;
pub mod question_ctx;
pub mod question_flow;

pub use dispatch::answer_questions;
pub use question_ctx::UploadCtx;
pub use question_flow::QuestionFlow;
