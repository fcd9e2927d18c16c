use crate::api;
use crate::i18n::Translations;
use crate::{Model, Msg};
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use shared::{Command, Event as SessionEvent, ImageUpload, Language, ServiceError};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

pub fn preview_url(image: &ImageUpload) -> ObjectUrl {
    let blob = Blob::new_with_options(image.bytes.as_slice(), Some(image.content_type.as_str()));
    ObjectUrl::from(blob)
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    let was_dragging = model.is_dragging();
    ctx.link().send_message(Msg::SetDragging(false));

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        process_file_list(ctx, file_list);
    }
    was_dragging
}

pub fn handle_paste(_model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) {
        if file_list.length() > 0 {
            event.prevent_default();
            process_file_list(ctx, file_list);
        }
    }
    false
}

/// Only the first file counts; the state machine decides whether it is an
/// acceptable image.
pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    if file_list.length() > 1 {
        log::info!("{} files supplied, using the first", file_list.length());
    }
    if let Some(file) = file_list.item(0) {
        ctx.link().send_message(Msg::FileChosen(GlooFile::from(file)));
    }
}

pub fn read_upload(ctx: &Context<Model>, file: GlooFile) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let file_name = file.name();
        let content_type = file.raw_mime_type();
        match gloo_file::futures::read_as_bytes(&file).await {
            Ok(bytes) => link.send_message(Msg::Session(SessionEvent::ImageSelected(
                ImageUpload::new(file_name, content_type, bytes),
            ))),
            Err(e) => {
                log::error!("Failed to read {}: {}", file_name, e);
                link.send_message(Msg::Session(SessionEvent::ImageUnavailable(
                    ServiceError::FileRead(file_name),
                )));
            }
        }
    });
}

pub fn load_sample(ctx: &Context<Model>, file_name: &'static str) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let event = match api::fetch_sample(file_name).await {
            Ok(image) => SessionEvent::ImageSelected(image),
            Err(e) => {
                log::error!("Sample {} failed to load: {}", file_name, e);
                SessionEvent::ImageUnavailable(e)
            }
        };
        link.send_message(Msg::Session(event));
    });
}

/// Performs a command from the state machine and feeds its completion back.
pub fn run_command(ctx: &Context<Model>, command: Command, language: Language) {
    let link = ctx.link().clone();

    match command {
        Command::Classify { ticket, image } => spawn_local(async move {
            let result = api::classify(&image, language).await;
            if let Err(e) = &result {
                log::error!("Classification failed: {}", e);
            }
            link.send_message(Msg::Session(SessionEvent::Classified { ticket, result }));
        }),
        Command::GenerateReport { ticket, request } => spawn_local(async move {
            let result = api::generate_report(&request).await;
            if let Err(e) = &result {
                log::error!("Report generation failed: {}", e);
            }
            link.send_message(Msg::Session(SessionEvent::ReportGenerated { ticket, result }));
        }),
    }
}

pub fn load_history(ctx: &Context<Model>) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = api::fetch_history().await;
        if let Err(e) = &result {
            log::error!("Loading history failed: {}", e);
        }
        link.send_message(Msg::HistoryLoaded(result));
    });
}

pub fn detect_language(ctx: &Context<Model>) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let language = match api::detect_language().await {
            Ok(language) => language,
            Err(e) => {
                log::warn!("Language detection failed: {}", e);
                Language::default()
            }
        };
        link.send_message(Msg::LanguageDetected(language));
    });
}

pub fn load_translations(ctx: &Context<Model>, language: Language) {
    if let Some(cached) = Translations::cached(language) {
        ctx.link()
            .send_message(Msg::TranslationsLoaded(language, cached));
        return;
    }

    let link = ctx.link().clone();
    spawn_local(async move {
        let translations = match api::fetch_translations(language).await {
            Ok(strings) => {
                let translations = Translations::with_strings(strings);
                translations.store(language);
                translations
            }
            Err(e) => {
                log::warn!("Translations for {} unavailable: {}", language.code(), e);
                Translations::english()
            }
        };
        link.send_message(Msg::TranslationsLoaded(language, translations));
    });
}

pub fn persist_language(language: Language) {
    spawn_local(async move {
        if let Err(e) = api::persist_language(language).await {
            log::warn!("Could not save language preference: {}", e);
        }
    });
}
