use crate::{Model, Msg};
use shared::Language;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

/// Renders the application header with the language picker.
pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    let on_language = ctx.link().batch_callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Language::from_code(&select.value()).map(Msg::ChangeLanguage)
    });
    let current = model.language();

    html! {
        <header class="app-header">
            <div class="header-top">
                <h1><i class="fa-solid fa-leaf"></i>{ format!(" {}", model.t("app_title")) }</h1>
                <label class="language-picker">
                    <span>{ model.t("language_label") }</span>
                    <select onchange={on_language}>
                        { for Language::all().map(|language| html! {
                            <option value={language.code()} selected={language == current}>
                                { language.native_name() }
                            </option>
                        })}
                    </select>
                </label>
            </div>
            <p class="subtitle">{ model.t("app_subtitle") }</p>
        </header>
    }
}
