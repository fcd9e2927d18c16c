use crate::{Model, Msg};
use shared::{Event as SessionEvent, Language, Question};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

/// What both the questionnaire's submit button and the results shortcut
/// send.
pub fn request_report_msg(language: Language) -> Msg {
    Msg::Session(SessionEvent::RequestReport { language })
}

pub fn render_questionnaire(model: &Model, ctx: &Context<Model>) -> Html {
    let answers = &model.session().context().answers;
    let language = model.language();
    let submit = ctx.link().callback(move |e: SubmitEvent| {
        e.prevent_default();
        request_report_msg(language)
    });

    html! {
        <form class="questionnaire" onsubmit={submit}>
            <h2>{ model.t("questionnaire_title") }</h2>
            <p class="questionnaire-intro">{ model.t("questionnaire_intro") }</p>
            { for Question::all().map(|question| render_question(model, ctx, question, answers.get(question))) }
            <button type="submit" class="analyze-btn">{ model.t("get_report") }</button>
        </form>
    }
}

fn render_question(model: &Model, ctx: &Context<Model>, question: Question, current: &str) -> Html {
    let onchange = ctx.link().callback(move |e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::Session(SessionEvent::AnswerChanged {
            question,
            value: select.value(),
        })
    });
    let id = format!("q-{}", question.key());

    html! {
        <div class="question">
            <label for={id.clone()}>{ model.t(&question.label_key()) }</label>
            <select id={id} {onchange}>
                <option value="" selected={current.is_empty()}>{ model.t("select_option") }</option>
                { for question.options().iter().map(|option| html! {
                    <option value={option.value} selected={option.value == current}>
                        { model.t(option.key) }
                    </option>
                })}
            </select>
        </div>
    }
}
