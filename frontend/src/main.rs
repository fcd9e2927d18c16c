mod api;
mod components;
mod i18n;

use components::handlers;
use components::header::render_header;
use components::history::render_history;
use components::questionnaire::render_questionnaire;
use components::report::render_report;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::{render_error_message, render_spinner, render_start_over};
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use i18n::{LanguageRequest, Translations};
use shared::{Event as SessionEvent, HistoryEntry, Language, ServiceError, Session};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

pub enum Msg {
    /// Everything the state machine decides.
    Session(SessionEvent),

    // Image input
    FileChosen(GlooFile),
    LoadSample(&'static str),
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
    SetDragging(bool),

    // Language
    LanguageDetected(Language),
    ChangeLanguage(Language),
    TranslationsLoaded(Language, Translations),

    // History
    ToggleHistory,
    HistoryLoaded(Result<Vec<HistoryEntry>, ServiceError>),
}

pub struct Model {
    session: Session,
    language: Language,
    language_request: LanguageRequest,
    translations: Translations,
    preview_url: Option<ObjectUrl>,
    is_dragging: bool,
    history_open: bool,
    /// `None` while a fetch is in flight.
    history: Option<Result<Vec<HistoryEntry>, String>>,
    paste_listener: Option<EventListener>,
}

impl Model {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn history_open(&self) -> bool {
        self.history_open
    }

    pub fn history(&self) -> Option<&Result<Vec<HistoryEntry>, String>> {
        self.history.as_ref()
    }

    pub fn preview_url(&self) -> Option<String> {
        self.preview_url.as_ref().map(|url| url.to_string())
    }

    /// Translated UI string.
    pub fn t(&self, key: &str) -> String {
        self.translations.get(key)
    }

    fn dispatch(&mut self, ctx: &Context<Self>, event: SessionEvent) {
        let refresh_preview = matches!(
            event,
            SessionEvent::ImageSelected(_) | SessionEvent::StartOver
        );

        let (session, command) = std::mem::take(&mut self.session).handle(event);
        self.session = session;

        if refresh_preview {
            self.preview_url = self.session.context().image.as_ref().map(handlers::preview_url);
        }
        if let Some(command) = command {
            handlers::run_command(ctx, command, self.language);
        }
    }
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let paste_listener = web_sys::window().map(|window| {
            let link = ctx.link().clone();
            EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            })
        });

        handlers::detect_language(ctx);

        Self {
            session: Session::new(),
            language: Language::default(),
            language_request: LanguageRequest::default(),
            translations: Translations::english(),
            preview_url: None,
            is_dragging: false,
            history_open: false,
            history: None,
            paste_listener,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Session(event) => {
                self.dispatch(ctx, event);
                true
            }

            Msg::FileChosen(file) => {
                handlers::read_upload(ctx, file);
                false
            }
            Msg::LoadSample(file_name) => {
                handlers::load_sample(ctx, file_name);
                false
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),
            Msg::SetDragging(is_dragging) => {
                let changed = self.is_dragging != is_dragging;
                self.is_dragging = is_dragging;
                changed
            }

            Msg::LanguageDetected(language) => {
                if self.language_request.detected(language) {
                    handlers::load_translations(ctx, language);
                }
                false
            }
            Msg::ChangeLanguage(language) => {
                self.language_request.chosen(language);
                handlers::persist_language(language);
                handlers::load_translations(ctx, language);
                false
            }
            Msg::TranslationsLoaded(language, translations) => {
                if !self.language_request.is_current(language) {
                    log::debug!("Ignoring superseded {} translations", language.code());
                    return false;
                }
                self.language = language;
                self.translations = translations;
                true
            }

            Msg::ToggleHistory => {
                self.history_open = !self.history_open;
                if self.history_open {
                    self.history = None;
                    handlers::load_history(ctx);
                }
                true
            }
            Msg::HistoryLoaded(result) => {
                if !self.history_open {
                    return false;
                }
                self.history = Some(result.map_err(|e| e.message()));
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let screen = self.session.screen();
        let visibility = screen.visibility();

        html! {
            <div class="container">
                { render_header(self, ctx) }

                <main class="main-content">
                    { render_error_message(self, ctx) }
                    if visibility.upload {
                        { render_upload_section(self, ctx) }
                    }
                    if visibility.result {
                        { render_results(self, ctx) }
                    }
                    if visibility.spinner {
                        { render_spinner(self) }
                    }
                    if visibility.questionnaire {
                        { render_questionnaire(self, ctx) }
                    }
                    if visibility.report {
                        { render_report(self) }
                    }
                    if visibility.start_over {
                        { render_start_over(self, ctx) }
                    }
                    { render_history(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{ self.t("footer_note") }</p>
                </footer>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.paste_listener.take();
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
