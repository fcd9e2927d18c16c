use super::questionnaire::request_report_msg;
use crate::Model;
use shared::render::{ConfidenceIndicator, display_label};
use yew::prelude::*;

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let context = model.session().context();
    let Some(prediction) = &context.prediction else {
        return html! {};
    };

    let indicator = ConfidenceIndicator::new(prediction.confidence);
    let label = display_label(&prediction.label);
    let language = model.language();
    let shortcut = ctx
        .link()
        .callback(move |_: MouseEvent| request_report_msg(language));

    html! {
        <div class="results-container">
            <div class="result-header">
                <h2>{ model.t("result_title") }</h2>
                <div class="predicted-disease">
                    <span class="meter-label">{ format!("{}: ", model.t("predicted_disease")) }</span>
                    <strong>{ label }</strong>
                    if let Some(localized) = &prediction.localized_name {
                        <span class="localized-name">{ format!(" ({localized})") }</span>
                    }
                </div>
                <div class="confidence-meter">
                    <div class="meter-label">{ model.t("confidence") }</div>
                    <div class="meter">
                        <div class="meter-fill" style={indicator.style()}></div>
                    </div>
                    <div class="meter-value">{ indicator.text.clone() }</div>
                </div>
            </div>
            if context.can_request_report() {
                <button class="secondary-btn" onclick={shortcut}>
                    { model.t("skip_to_report") }
                </button>
            }
        </div>
    }
}
