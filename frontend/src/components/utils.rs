use crate::{Model, Msg};
use gloo_timers::callback::Timeout;
use shared::Event as SessionEvent;
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || inner_callback()));
    })
}

pub fn render_error_message(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(error_msg) = &model.session().context().error else {
        return html! {};
    };
    let dismiss = ctx
        .link()
        .callback(|_: MouseEvent| Msg::Session(SessionEvent::DismissError));

    html! {
        <div class="error-message" role="alert">
            <i class="fa-solid fa-circle-exclamation"></i>
            <p>{ error_msg }</p>
            <button class="dismiss-btn" onclick={dismiss}>{ model.t("dismiss") }</button>
        </div>
    }
}

pub fn render_spinner(model: &Model) -> Html {
    let caption = if model.session().screen() == shared::Screen::ReportPending {
        model.t("generating_report")
    } else {
        model.t("analyzing")
    };

    html! {
        <div class="spinner-container">
            <div class="spinner"></div>
            <p>{ caption }</p>
        </div>
    }
}

pub fn render_start_over(model: &Model, ctx: &Context<Model>) -> Html {
    let start_over = ctx
        .link()
        .callback(|_: MouseEvent| Msg::Session(SessionEvent::StartOver));

    html! {
        <div class="start-over">
            <button class="secondary-btn" onclick={start_over}>
                <i class="fa-solid fa-rotate-left"></i>{ format!(" {}", model.t("start_over")) }
            </button>
        </div>
    }
}
