//! Pure helpers behind the rendering layer: which sections a screen shows,
//! how a prediction is displayed and how the report markdown becomes HTML.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

use crate::session::Screen;

/// Sections of the page that are visible on a given screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    pub upload: bool,
    pub spinner: bool,
    pub result: bool,
    pub questionnaire: bool,
    pub report: bool,
    pub start_over: bool,
}

impl Screen {
    pub fn visibility(self) -> Visibility {
        match self {
            Screen::Idle => Visibility {
                upload: true,
                ..Visibility::default()
            },
            Screen::Predicting => Visibility {
                spinner: true,
                ..Visibility::default()
            },
            Screen::Predicted => Visibility {
                result: true,
                questionnaire: true,
                start_over: true,
                ..Visibility::default()
            },
            Screen::ReportPending => Visibility {
                spinner: true,
                result: true,
                start_over: true,
                ..Visibility::default()
            },
            Screen::ReportReady => Visibility {
                result: true,
                report: true,
                start_over: true,
                ..Visibility::default()
            },
        }
    }
}

/// Width and caption of the confidence bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceIndicator {
    pub width_percent: f64,
    pub text: String,
}

impl ConfidenceIndicator {
    pub fn new(confidence: f64) -> Self {
        let width_percent = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 100.0)
        };
        Self {
            width_percent,
            text: format!("{width_percent:.2}%"),
        }
    }

    pub fn style(&self) -> String {
        format!("width: {}%", self.width_percent)
    }
}

/// `Apple___Black_rot` and `Apple_Black_rot` both read `Apple Black rot`.
pub fn display_label(class_name: &str) -> String {
    class_name
        .split('_')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `2026-10-19T05:53:12.345+00:00` reads `2026-10-19 05:53`. Anything
/// that does not look like RFC 3339 is shown as is.
pub fn history_timestamp(rfc3339: &str) -> String {
    match (rfc3339.get(..10), rfc3339.get(10..11), rfc3339.get(11..16)) {
        (Some(date), Some("T"), Some(time)) => format!("{date} {time}"),
        _ => rfc3339.to_string(),
    }
}

/// Destinations a rendered link or image may point at: http(s), mailto or
/// a relative reference. Browsers ignore whitespace and control characters
/// inside a scheme, so those are dropped before looking for one.
fn is_safe_destination(dest: &str) -> bool {
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();
    let scheme_end = cleaned.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if cleaned[i..].starts_with(':') => matches!(
            cleaned[..i].to_ascii_lowercase().as_str(),
            "http" | "https" | "mailto"
        ),
        _ => true,
    }
}

/// Renders report markdown to HTML. Raw HTML in the source is escaped and
/// links or images with any other scheme keep only their text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // One entry per open link or image: whether its tags are emitted.
    let mut open: Vec<bool> = Vec::new();
    let parser = Parser::new_ext(markdown, options).filter_map(move |event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link { ref dest_url, .. }) | Event::Start(Tag::Image { ref dest_url, .. }) => {
            let safe = is_safe_destination(dest_url);
            if !safe {
                log::warn!("Dropping link to {:?} from rendered report", dest_url);
            }
            open.push(safe);
            safe.then_some(event)
        }
        Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
            open.pop().unwrap_or(true).then_some(event)
        }
        other => Some(other),
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
