//! Dashboard page: sidebar with the input controls and the main area

use crate::input::{TransactionForm, NUMERIC_CONTROLS, TYPE_LABEL};
use crate::render::plots::{bar_plot, escape_xml, summary_plot, svg_data_uri, waterfall_plot};
use crate::types::{AlertStyle, Evaluation, TransactionType};

pub const PAGE_TITLE: &str = "Smart Fraud Detector";
pub const PAGE_ICON: &str = "🏛️";
pub const HEADING: &str = "Smart Fraud Detector - ML Risk Analysis";
pub const DESCRIPTION: &str = "This app helps in detecting potential fraudulent transactions using a machine learning model. \
It analyzes transaction details and predicts whether an activity is likely to be <strong>fraudulent</strong> or <strong>legitimate</strong>. \
You can connect this tool to your financial systems for real-time monitoring, or test it by entering sample transaction data. \
The goal is to assist in preventing financial losses and ensuring safer digital transactions.";

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; color: #31333f; display: flex; min-height: 100vh; }
aside { width: 300px; background: #f0f2f6; padding: 24px; box-sizing: border-box; }
aside label { display: block; font-size: 14px; margin: 14px 0 4px; }
aside input, aside select { width: 100%; padding: 6px; box-sizing: border-box; }
aside button { margin-top: 20px; width: 100%; padding: 8px; font-size: 15px; cursor: pointer; }
main { flex: 1; padding: 32px 48px; }
.columns { display: flex; gap: 32px; }
.col-main { flex: 4; }
.col-side { flex: 1; }
.alert { padding: 14px 18px; border-radius: 6px; margin: 8px 0 16px; }
.alert-error { background: #ffe4e6; color: #9f1239; }
.alert-success { background: #dcfce7; color: #166534; }
.metric-label { font-size: 14px; }
.metric-value { font-size: 36px; }
figure { margin: 0 0 24px; }
figure img { max-width: 100%; }
"#;

/// What the main area shows below the header
#[derive(Debug)]
pub enum PageState<'a> {
    /// Waiting for the Predict trigger
    Idle,
    /// Trigger ran to completion
    Evaluated(&'a Evaluation),
    /// Submitted values were rejected before evaluation
    Rejected(&'a str),
    /// Evaluation failed part way
    Failed(&'a str),
}

/// Render the full page. `form` fills the sidebar controls.
pub fn render_page(form: &TransactionForm, state: &PageState<'_>) -> String {
    let content = match state {
        PageState::Idle => String::new(),
        PageState::Evaluated(evaluation) => render_evaluation(evaluation),
        PageState::Rejected(reason) => alert(AlertStyle::Error, &format!("Invalid input: {}", reason)),
        PageState::Failed(reason) => alert(AlertStyle::Error, &format!("Prediction failed: {}", reason)),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="icon" href="{icon}">
<style>{style}</style>
</head>
<body>
{sidebar}
<main>
<h1>{heading}</h1>
<p>{description}</p>
{content}
</main>
</body>
</html>
"#,
        title = PAGE_TITLE,
        icon = page_icon(),
        style = STYLE,
        sidebar = render_sidebar(form),
        heading = HEADING,
        description = DESCRIPTION,
        content = content,
    )
}

/// Emoji favicon as an inline SVG
fn page_icon() -> String {
    svg_data_uri(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><text y=".9em" font-size="90">{}</text></svg>"#,
        PAGE_ICON
    ))
}

fn render_sidebar(form: &TransactionForm) -> String {
    let options: String = TransactionType::ALL
        .iter()
        .map(|t| {
            let selected = if *t == form.transaction_type { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, t.as_str(), selected)
        })
        .collect();

    let inputs: String = NUMERIC_CONTROLS
        .iter()
        .map(|control| {
            let raw = form.raw(control.field).trim();
            let value = if raw.is_empty() {
                format!("{:.2}", control.default)
            } else {
                escape_xml(raw)
            };
            format!(
                r#"<label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" min="{min}" step="{step}" value="{value}">"#,
                name = control.name(),
                label = control.label,
                min = control.min,
                step = control.step,
                value = value,
            )
        })
        .collect();

    format!(
        r#"<aside>
<h2>Enter Transaction Details</h2>
<form method="post" action="/predict">
<label for="type">{type_label}</label><select id="type" name="type">{options}</select>
{inputs}
<button type="submit">Predict</button>
</form>
</aside>"#,
        type_label = TYPE_LABEL,
        options = options,
        inputs = inputs,
    )
}

fn render_evaluation(evaluation: &Evaluation) -> String {
    let explanation = &evaluation.explanation;
    let plots = [
        ("Summary Plot", summary_plot(explanation)),
        ("Waterfall Plot", waterfall_plot(explanation)),
        ("Feature Importance", bar_plot(explanation)),
    ];

    let figures: String = plots
        .iter()
        .map(|(title, svg)| {
            format!(
                r#"<section><h3>{title}</h3><figure><img alt="{title}" src="{src}"></figure></section>"#,
                title = title,
                src = svg_data_uri(svg),
            )
        })
        .collect();

    format!(
        r#"<div class="columns">
<div class="col-main">
<h2>Prediction:</h2>
{verdict}
</div>
<div class="col-side">
<div class="metric-label">Fraud Probability</div>
<div class="metric-value">{probability}</div>
</div>
</div>
<div class="col-main">
<h3><em>Why did the model predict this?</em></h3>
{figures}
</div>"#,
        verdict = alert(evaluation.verdict.style(), evaluation.verdict.message()),
        probability = evaluation.fraud_percent(),
        figures = figures,
    )
}

fn alert(style: AlertStyle, message: &str) -> String {
    let class = match style {
        AlertStyle::Error => "alert alert-error",
        AlertStyle::Success => "alert alert-success",
    };
    format!(r#"<div class="{}" role="alert">{}</div>"#, class, escape_xml(message))
}
