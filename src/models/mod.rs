pub mod loaders;
pub mod question;

pub use loaders::load_question_table;
pub use question::{QuestionAnswers, QuestionRow, QuestionTable, UploadedArchive};
