use crate::Model;
use shared::render::render_markdown;
use yew::prelude::*;

pub fn render_report(model: &Model) -> Html {
    let Some(report) = &model.session().context().report else {
        return html! {};
    };
    // render_markdown escapes raw HTML in the source.
    let body = Html::from_html_unchecked(AttrValue::from(render_markdown(report)));

    html! {
        <section class="report">
            <h2>{ model.t("report_title") }</h2>
            <div class="report-body">{ body }</div>
        </section>
    }
}
