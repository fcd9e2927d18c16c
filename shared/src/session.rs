//! The upload → predict → questionnaire → report state machine.
//!
//! [`Session::handle`] takes the session by value together with one
//! [`Event`] and returns the next session plus at most one [`Command`] for
//! the caller to perform. Completions of those commands come back in as
//! events carrying the command's [`Ticket`]; a completion whose ticket is not
//! the outstanding one is dropped, so a call that resolves after Start Over
//! never touches the fresh context.

use derive_more::Display;

use crate::api::{ClassifyResponse, ReportRequest, ReportResponse};
use crate::error::ServiceError;
use crate::language::Language;
use crate::questionnaire::{Question, QuestionnaireAnswers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Screen {
    #[default]
    Idle,
    Predicting,
    Predicted,
    ReportPending,
    ReportReady,
}

/// A file chosen, dropped, pasted or loaded from the sample gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
    pub localized_name: Option<String>,
}

/// Everything a visit accumulates. `SessionContext::default()` is the
/// first-load state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionContext {
    pub screen: Screen,
    pub image: Option<ImageUpload>,
    pub prediction: Option<Prediction>,
    pub answers: QuestionnaireAnswers,
    pub report: Option<String>,
    pub error: Option<String>,
}

impl SessionContext {
    pub fn can_analyze(&self) -> bool {
        self.screen == Screen::Idle && self.image.is_some()
    }

    pub fn can_request_report(&self) -> bool {
        self.screen == Screen::Predicted && self.prediction.is_some()
    }

    /// The outbound report request for the stored prediction and answers.
    pub fn report_request(&self, language: Language) -> Option<ReportRequest> {
        let prediction = self.prediction.as_ref()?;
        Some(ReportRequest {
            disease_name: prediction.label.clone(),
            user_context: self.answers.clone(),
            language: language.code().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ImageSelected(ImageUpload),
    /// A sample could not be fetched or a chosen file could not be read.
    ImageUnavailable(ServiceError),
    Analyze,
    Classified {
        ticket: Ticket,
        result: Result<ClassifyResponse, ServiceError>,
    },
    AnswerChanged {
        question: Question,
        value: String,
    },
    /// Raised by both the questionnaire submit button and the
    /// "Get Detailed Diagnosis" shortcut.
    RequestReport {
        language: Language,
    },
    ReportGenerated {
        ticket: Ticket,
        result: Result<ReportResponse, ServiceError>,
    },
    DismissError,
    StartOver,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Classify {
        ticket: Ticket,
        image: ImageUpload,
    },
    GenerateReport {
        ticket: Ticket,
        request: ReportRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    context: SessionContext,
    outstanding: Option<Ticket>,
    issued: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn screen(&self) -> Screen {
        self.context.screen
    }

    pub fn is_waiting(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn handle(mut self, event: Event) -> (Self, Option<Command>) {
        let command = match event {
            Event::ImageSelected(image) => {
                self.select_image(image);
                None
            }
            Event::ImageUnavailable(err) => {
                if self.context.screen == Screen::Idle {
                    self.context.error = Some(err.message());
                }
                None
            }
            Event::Analyze => self.analyze(),
            Event::Classified { ticket, result } => {
                if self.take_outstanding(ticket, Screen::Predicting) {
                    self.classified(result);
                }
                None
            }
            Event::AnswerChanged { question, value } => {
                if self.context.screen == Screen::Predicted {
                    self.context.answers.set(question, value);
                }
                None
            }
            Event::RequestReport { language } => self.request_report(language),
            Event::ReportGenerated { ticket, result } => {
                if self.take_outstanding(ticket, Screen::ReportPending) {
                    self.report_generated(result);
                }
                None
            }
            Event::DismissError => {
                self.context.error = None;
                None
            }
            Event::StartOver => {
                self.context = SessionContext::default();
                self.outstanding = None;
                None
            }
        };
        (self, command)
    }

    fn issue(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.outstanding = Some(ticket);
        ticket
    }

    fn take_outstanding(&mut self, ticket: Ticket, expected: Screen) -> bool {
        if self.outstanding != Some(ticket) || self.context.screen != expected {
            log::debug!("dropping stale completion {:?} in {}", ticket, self.context.screen);
            return false;
        }
        self.outstanding = None;
        true
    }

    fn select_image(&mut self, image: ImageUpload) {
        if self.context.screen != Screen::Idle {
            return;
        }
        if !image.is_image() {
            log::warn!("Rejected non-image file: {}", image.file_name);
            self.context.error = Some(format!(
                "\"{}\" is not an image. Please choose a JPG, PNG or WEBP file.",
                image.file_name
            ));
            return;
        }
        self.context.image = Some(image);
        self.context.error = None;
    }

    fn analyze(&mut self) -> Option<Command> {
        if !self.context.can_analyze() {
            return None;
        }
        let image = self.context.image.clone()?;
        self.context.screen = Screen::Predicting;
        self.context.error = None;
        Some(Command::Classify {
            ticket: self.issue(),
            image,
        })
    }

    fn classified(&mut self, result: Result<ClassifyResponse, ServiceError>) {
        match result {
            Ok(response) => {
                self.context.prediction = Some(Prediction {
                    label: response.predicted_class_name,
                    confidence: response.confidence,
                    localized_name: response.localized_name,
                });
                self.context.screen = Screen::Predicted;
            }
            Err(err) => {
                self.context.screen = Screen::Idle;
                self.context.error = Some(err.message());
            }
        }
    }

    fn request_report(&mut self, language: Language) -> Option<Command> {
        if !self.context.can_request_report() {
            return None;
        }
        let request = self.context.report_request(language)?;
        self.context.screen = Screen::ReportPending;
        self.context.error = None;
        Some(Command::GenerateReport {
            ticket: self.issue(),
            request,
        })
    }

    fn report_generated(&mut self, result: Result<ReportResponse, ServiceError>) {
        match result {
            Ok(response) => {
                self.context.report = Some(response.report);
                self.context.screen = Screen::ReportReady;
            }
            Err(err) => {
                self.context.screen = Screen::Predicted;
                self.context.error = Some(err.message());
            }
        }
    }
}
