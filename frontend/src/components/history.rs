use crate::{Model, Msg};
use shared::HistoryEntry;
use shared::render::{ConfidenceIndicator, display_label, history_timestamp};
use yew::prelude::*;

/// Past predictions, fetched from the server each time the panel opens.
pub fn render_history(model: &Model, ctx: &Context<Model>) -> Html {
    let toggle = ctx.link().callback(|_: MouseEvent| Msg::ToggleHistory);
    let label = if model.history_open() {
        model.t("history_hide")
    } else {
        model.t("history_show")
    };

    html! {
        <section class="history">
            <button class="secondary-btn" onclick={toggle}>
                <i class="fa-solid fa-clock-rotate-left"></i>{ format!(" {label}") }
            </button>
            if model.history_open() {
                <h2>{ model.t("history_title") }</h2>
                { render_entries(model) }
            }
        </section>
    }
}

fn render_entries(model: &Model) -> Html {
    match model.history() {
        None => html! { <div class="spinner"></div> },
        Some(Err(message)) => html! { <p class="error-message">{ message.clone() }</p> },
        Some(Ok(entries)) if entries.is_empty() => {
            html! { <p class="history-empty">{ model.t("history_empty") }</p> }
        }
        Some(Ok(entries)) => html! {
            <table class="history-table">
                <thead>
                    <tr>
                        <th>{ model.t("history_when") }</th>
                        <th>{ model.t("predicted_disease") }</th>
                        <th>{ model.t("confidence") }</th>
                        <th>{ model.t("history_file") }</th>
                    </tr>
                </thead>
                <tbody>
                    { for entries.iter().map(render_entry) }
                </tbody>
            </table>
        },
    }
}

fn render_entry(entry: &HistoryEntry) -> Html {
    let indicator = ConfidenceIndicator::new(entry.confidence);
    html! {
        <tr key={entry.id.clone()}>
            <td>{ history_timestamp(&entry.timestamp) }</td>
            <td>{ display_label(&entry.predicted_class_name) }</td>
            <td>{ indicator.text }</td>
            <td class="history-file">{ entry.file_name.clone() }</td>
        </tr>
    }
}
