//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::adapters::artifact::IntegrityStatus;
use crate::adapters::ArtifactClassifier;
use crate::application::InferenceService;
use crate::ports::Classifier;
use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

/// What the dashboard knows about the model. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    Ready {
        model_type: &'static str,
        integrity: IntegrityStatus,
        n_features: usize,
    },
    Unavailable {
        reason: String,
    },
}

/// Dashboard state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub model_path: String,
    pub model: ModelStatus,
}

impl DashboardState {
    #[must_use]
    pub fn from_service(
        service: &InferenceService<ArtifactClassifier>,
        model_path: &std::path::Path,
    ) -> Self {
        let model = match (service.classifier(), service.load_error()) {
            (Some(classifier), _) => ModelStatus::Ready {
                model_type: classifier.model_type(),
                integrity: classifier.integrity(),
                n_features: classifier.schema().len(),
            },
            (None, Some(e)) => ModelStatus::Unavailable {
                reason: e.to_string(),
            },
            (None, None) => ModelStatus::Unavailable {
                reason: "model not loaded".to_string(),
            },
        };
        Self {
            model_path: model_path.display().to_string(),
            model,
        }
    }
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .margin(1)
        .split(chunks[1]);

    render_model_status(f, columns[0], state);
    render_quick_actions(f, columns[1], matches!(state.model, ModelStatus::Ready { .. }));
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(LOGO_SMALL, MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled("Heart Disease Risk Prediction", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn detail(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}: "), MedicalTheme::text_secondary()),
        Span::styled(value, MedicalTheme::text()),
    ])
}

fn render_model_status(f: &mut Frame, area: Rect, state: &DashboardState) {
    let mut lines = Vec::new();
    match &state.model {
        ModelStatus::Ready {
            model_type,
            integrity,
            n_features,
        } => {
            lines.push(Line::from(vec![
                Span::styled("  OK ", MedicalTheme::success()),
                Span::styled("Model loaded successfully", MedicalTheme::text()),
            ]));
            lines.push(detail("Artifact", state.model_path.clone()));
            lines.push(detail("Estimator", (*model_type).to_string()));
            lines.push(detail("Expected columns", n_features.to_string()));

            let integrity_style = match integrity {
                IntegrityStatus::Signed => MedicalTheme::success(),
                IntegrityStatus::DigestsVerified => MedicalTheme::info(),
                IntegrityStatus::Unverified => MedicalTheme::warning(),
            };
            lines.push(Line::from(vec![
                Span::styled("  Integrity: ", MedicalTheme::text_secondary()),
                Span::styled(integrity.to_string(), integrity_style),
            ]));
        }
        ModelStatus::Unavailable { reason } => {
            lines.push(Line::from(vec![
                Span::styled("  FAIL ", MedicalTheme::danger()),
                Span::styled("Model loading failed", MedicalTheme::text()),
            ]));
            lines.push(detail("Artifact", state.model_path.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {reason}"),
                MedicalTheme::danger(),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Predictions are disabled until the application is restarted with a valid artifact.",
                MedicalTheme::text_muted(),
            )));
        }
    }

    let block = Block::default()
        .title(Span::styled(" Model Status ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_quick_actions(f: &mut Frame, area: Rect, model_ready: bool) {
    let form_desc = if model_ready {
        "New Patient"
    } else {
        "New Patient (prediction disabled)"
    };
    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled(form_desc, MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[G] ", MedicalTheme::key_hint()),
            Span::styled("Interpretation Guide", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(actions).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::path::Path;

    #[test]
    fn test_state_for_missing_model() {
        let config = AppConfig {
            model_path: "does/not/exist.json".into(),
            ..AppConfig::default()
        };
        let service = InferenceService::load(&config);
        let state = DashboardState::from_service(&service, &config.model_path);

        assert_eq!(state.model_path, "does/not/exist.json");
        match state.model {
            ModelStatus::Unavailable { reason } => assert!(reason.contains("not found")),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn test_state_for_bundled_model() {
        let config = AppConfig::default();
        let service = InferenceService::load(&config);
        let state = DashboardState::from_service(&service, Path::new(&config.model_path));

        match state.model {
            ModelStatus::Ready { n_features, .. } => assert_eq!(n_features, 24),
            other => panic!("unexpected status: {other:?}"),
        }
    }
}
