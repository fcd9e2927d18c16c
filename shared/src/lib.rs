//! Types and pure logic shared by the CropDoc backend and frontend.
//!
//! Nothing in this crate performs I/O. The browser side drives the
//! [`session::Session`] state machine and performs the [`session::Command`]s
//! it emits; the server side speaks the wire types in [`api`].

pub mod api;
pub mod error;
pub mod language;
pub mod questionnaire;
pub mod render;
pub mod session;

pub use api::{
    ClassifyResponse, DetectedLanguage, ErrorResponse, HistoryEntry, HistoryResponse,
    LanguageOption, LanguageSelection, ReportRequest, ReportResponse,
};
pub use error::ServiceError;
pub use language::Language;
pub use questionnaire::{Question, QuestionnaireAnswers};
pub use session::{Command, Event, ImageUpload, Screen, Session, SessionContext, Ticket};
