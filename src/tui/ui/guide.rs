//! Feature interpretation guide.
//!
//! Built from the categorical code tables so the guide cannot drift from
//! what the form submits.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::features::{BP_HR_RATIO, HIGH_CHOL, HIGH_CHOL_THRESHOLD};
use crate::domain::{Categorical, ChestPain, RestingEcg, StSlope, Thalassemia};
use crate::tui::styles::MedicalTheme;

fn code_table<C: Categorical>() -> String {
    C::ALL
        .iter()
        .map(|c| format!("{}={}", c.code(), c.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn entry<'a>(title: &'a str, body: String) -> Line<'a> {
    Line::from(vec![
        Span::styled("• ", MedicalTheme::key_hint()),
        Span::styled(title, MedicalTheme::focused()),
        Span::styled(": ", MedicalTheme::text_secondary()),
        Span::styled(body, MedicalTheme::text()),
    ])
}

/// Guide lines, one per interpreted feature.
#[must_use]
pub fn guide_lines() -> Vec<Line<'static>> {
    vec![
        entry("Chest Pain Type (cp)", code_table::<ChestPain>()),
        entry("Resting ECG (restecg)", code_table::<RestingEcg>()),
        entry(
            "Slope of Peak Exercise ST Segment (slope)",
            code_table::<StSlope>(),
        ),
        entry("Thalassemia (thal)", code_table::<Thalassemia>()),
        Line::from(""),
        entry(
            BP_HR_RATIO,
            "resting blood pressure divided by maximum heart rate".to_string(),
        ),
        entry(
            HIGH_CHOL,
            format!("1 when serum cholesterol is above {HIGH_CHOL_THRESHOLD} mg/dl, else 0"),
        ),
    ]
}

pub fn render_guide(f: &mut Frame, area: Rect) {
    let mut lines = guide_lines();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back", MedicalTheme::key_desc()),
    ]));

    let block = Block::default()
        .title(Span::styled(
            " Feature Interpretation Guide ",
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_lists_every_code() {
        assert_eq!(
            code_table::<StSlope>(),
            "0=Upsloping, 1=Flat, 2=Downsloping"
        );
        assert!(code_table::<ChestPain>().contains("3=Asymptomatic"));
    }

    #[test]
    fn test_guide_covers_derived_features() {
        let text: String = guide_lines()
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("bp_hr_ratio"));
        assert!(text.contains("above 240"));
    }
}
