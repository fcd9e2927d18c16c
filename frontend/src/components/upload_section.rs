use crate::{Model, Msg};
use super::utils::debounce;
use shared::Event as SessionEvent;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

/// Images shipped under `static/samples/`.
pub const SAMPLES: &[(&str, &str)] = &[
    ("apple_scab.png", "Apple scab"),
    ("corn_common_rust.png", "Corn common rust"),
    ("potato_late_blight.png", "Potato late blight"),
    ("tomato_early_blight.png", "Tomato early blight"),
];

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="upload-section">
            <h2>{ model.t("upload_title") }</h2>
            { render_file_input_area(model, ctx) }
            { render_preview(model, ctx) }
            { render_samples(model, ctx) }
        </div>
    }
}

fn trigger_file_input() {
    let input = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id("file-input"))
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok());
    if let Some(input) = input {
        input.click();
    }
}

fn render_file_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.item(0));
        input.set_value("");
        file.map(|file| Msg::FileChosen(file.into()))
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept="image/*"
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging().then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, trigger_file_input)}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{ model.t("upload_hint") }</p>
                    <button class="secondary-btn" type="button">{ model.t("choose_file") }</button>
                </div>
            </div>
        </>
    }
}

fn render_preview(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(url) = model.preview_url() else {
        return html! {};
    };
    let file_name = model
        .session()
        .context()
        .image
        .as_ref()
        .map(|image| image.file_name.clone())
        .unwrap_or_default();

    let analyze = {
        let link = ctx.link().clone();
        debounce(300, move || {
            link.send_message(Msg::Session(SessionEvent::Analyze))
        })
    };

    html! {
        <div class="preview-area">
            <img src={url} alt={file_name.clone()} class="preview-image" />
            <p class="preview-name">{ file_name }</p>
            <button
                class="analyze-btn"
                disabled={!model.session().context().can_analyze()}
                onclick={analyze}
            >
                <i class="fa-solid fa-magnifying-glass"></i>{ format!(" {}", model.t("analyze")) }
            </button>
        </div>
    }
}

fn render_samples(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="samples">
            <h3>{ model.t("samples_title") }</h3>
            <div class="sample-grid">
                { for SAMPLES.iter().map(|&(file_name, caption)| {
                    let onclick = ctx.link().callback(move |_: MouseEvent| Msg::LoadSample(file_name));
                    html! {
                        <button class="sample" title={caption} {onclick}>
                            <img src={format!("/samples/{file_name}")} alt={caption} />
                            <span>{ caption }</span>
                        </button>
                    }
                })}
            </div>
        </div>
    }
}
