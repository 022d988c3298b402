//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{PredictionResult, RiskLabel};
use crate::tui::styles::MedicalTheme;

/// Render the verdict for the last submission.
pub fn render_result(f: &mut Frame, area: Rect, result: Option<&PredictionResult>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match result {
        Some(result) => render_verdict(f, chunks[1], result),
        None => render_empty(f, chunks[1]),
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prediction Results", MedicalTheme::title()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(Line::from(Span::styled(
        "No prediction yet. Press [N] to enter patient data.",
        MedicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_verdict(f: &mut Frame, area: Rect, result: &PredictionResult) {
    let block = Block::default()
        .title(Span::styled(" Risk Assessment ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Label
            Constraint::Length(4), // Probability
            Constraint::Length(3), // Recommendation
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let style = MedicalTheme::risk_label(result.label);
    let icon = match result.label {
        RiskLabel::Low => "OK",
        RiskLabel::High => "!",
    };

    let verdict = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{icon} {}", result.label),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({} probability)", result.probability_display()),
            MedicalTheme::text(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(verdict, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Heart Disease Probability ",
                    MedicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(style)
        .ratio((result.probability / 100.0).clamp(0.0, 1.0))
        .label(result.probability_display());
    f.render_widget(gauge, chunks[1]);

    let recommendation = Paragraph::new(Line::from(vec![
        Span::styled("Recommendation: ", MedicalTheme::text_secondary()),
        Span::styled(result.label.recommendation(), style),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(recommendation, chunks[2]);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[G] ", MedicalTheme::key_hint()),
        Span::styled("Interpretation Guide ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Patient ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Dashboard", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
