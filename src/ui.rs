//! Server-rendered single page.

use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::ml::Analysis;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

// `.html` names get HTML auto-escaping, so echoed review text is safe.
static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)
        .expect("index template must parse");
    env
});

#[derive(Debug, Serialize)]
struct ResultView {
    headline: &'static str,
    css_class: &'static str,
    confidence: String,
    progress: u8,
}

impl From<&Analysis> for ResultView {
    fn from(analysis: &Analysis) -> Self {
        let prediction = &analysis.prediction;
        Self {
            headline: prediction.sentiment.headline(),
            css_class: prediction.sentiment.as_str(),
            confidence: format!("{:.2}", prediction.confidence),
            // the bar shows whole percent only
            progress: prediction.confidence.clamp(0.0, 100.0) as u8,
        }
    }
}

/// What the page shows below the form.
#[derive(Debug)]
pub enum PageState<'a> {
    Blank,
    Warning(&'a str),
    Result(&'a Analysis),
}

pub fn render_page(review: &str, state: PageState<'_>) -> Result<String, minijinja::Error> {
    let (warning, result) = match state {
        PageState::Blank => (None, None),
        PageState::Warning(message) => (Some(message), None),
        PageState::Result(analysis) => (None, Some(ResultView::from(analysis))),
    };
    TEMPLATES.get_template("index.html")?.render(context! {
        review => review,
        warning => warning,
        result => result,
    })
}
