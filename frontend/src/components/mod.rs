pub mod handlers;
pub mod header;
pub mod history;
pub mod questionnaire;
pub mod report;
pub mod results;
pub mod upload_section;
pub mod utils;
