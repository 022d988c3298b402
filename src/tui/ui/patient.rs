//! Patient data input form.
//!
//! Numeric fields are typed into text buffers; enumerated fields are cycled
//! with ←/→ over their coded options. Every field starts at its default.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    bounds, Categorical, ChestPain, ExerciseAngina, FastingBloodSugar, RawRecord, RestingEcg,
    Sex, StSlope, Thalassemia,
};
use crate::tui::styles::MedicalTheme;

/// How a field is entered.
#[derive(Debug, Clone)]
pub enum FieldInput {
    /// Typed value; `decimal` allows a single '.'
    Numeric { buffer: String, decimal: bool },
    /// One of a fixed set of coded options
    Choice {
        options: Vec<(u8, &'static str)>,
        selected: usize,
    },
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub hint: String,
    pub input: FieldInput,
}

impl FormField {
    fn numeric(key: &'static str, label: &'static str, hint: String, decimal: bool) -> Self {
        Self {
            key,
            label,
            hint,
            input: FieldInput::Numeric {
                buffer: String::new(),
                decimal,
            },
        }
    }

    fn choice<C: Categorical>(label: &'static str) -> Self {
        Self {
            key: C::FIELD,
            label,
            hint: "←/→ to change".to_string(),
            input: FieldInput::Choice {
                options: C::ALL.iter().map(|c| (c.code(), c.label())).collect(),
                selected: 0,
            },
        }
    }

    /// Text shown in the field box.
    #[must_use]
    pub fn display(&self) -> &str {
        match &self.input {
            FieldInput::Numeric { buffer, .. } => buffer,
            FieldInput::Choice { options, selected } => options[*selected].1,
        }
    }
}

fn range_hint<T: std::fmt::Display>(unit: &str, (min, max): (T, T)) -> String {
    if unit.is_empty() {
        format!("{min}-{max}")
    } else {
        format!("{unit} ({min}-{max})")
    }
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        let mut state = Self {
            fields: vec![
                FormField::numeric("age", "Age", range_hint("years", bounds::AGE), false),
                FormField::choice::<Sex>("Sex"),
                FormField::choice::<ChestPain>("Chest Pain Type"),
                FormField::numeric(
                    "trestbps",
                    "Resting Blood Pressure",
                    range_hint("mm Hg", bounds::TRESTBPS),
                    false,
                ),
                FormField::numeric(
                    "chol",
                    "Serum Cholesterol",
                    range_hint("mg/dl", bounds::CHOL),
                    false,
                ),
                FormField::choice::<FastingBloodSugar>("Fasting Blood Sugar > 120 mg/dl"),
                FormField::choice::<RestingEcg>("Resting ECG Results"),
                FormField::numeric(
                    "thalach",
                    "Maximum Heart Rate Achieved",
                    range_hint("bpm", bounds::THALACH),
                    false,
                ),
                FormField::choice::<ExerciseAngina>("Exercise Induced Angina"),
                FormField::numeric(
                    "oldpeak",
                    "ST Depression Induced by Exercise",
                    range_hint("", bounds::OLDPEAK),
                    true,
                ),
                FormField::choice::<StSlope>("Slope of Peak Exercise ST Segment"),
                FormField::numeric(
                    "ca",
                    "Major Vessels Colored by Fluoroscopy",
                    range_hint("", bounds::CA),
                    false,
                ),
                FormField::choice::<Thalassemia>("Thalassemia"),
            ],
            selected_field: 0,
            error_message: None,
        };
        state.load_record(&RawRecord::default());
        state
    }
}

impl PatientFormState {
    fn field(&self, key: &str) -> Result<&FormField, String> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| format!("{key}: missing from form"))
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.key == key)
    }

    fn set_numeric(&mut self, key: &str, value: String) {
        if let Some(FormField {
            input: FieldInput::Numeric { buffer, .. },
            ..
        }) = self.field_mut(key)
        {
            buffer.zeroize();
            *buffer = value;
        }
    }

    fn set_choice<C: Categorical>(&mut self, value: C) {
        if let Some(FormField {
            input: FieldInput::Choice { options, selected },
            ..
        }) = self.field_mut(C::FIELD)
        {
            if let Some(idx) = options.iter().position(|(code, _)| *code == value.code()) {
                *selected = idx;
            }
        }
    }

    fn parse_numeric<T: std::str::FromStr>(&self, key: &str) -> Result<T, String> {
        let field = self.field(key)?;
        match &field.input {
            FieldInput::Numeric { buffer, .. } => buffer
                .trim()
                .parse()
                .map_err(|_| format!("{}: Invalid number", field.label)),
            FieldInput::Choice { .. } => Err(format!("{}: not a numeric field", field.label)),
        }
    }

    fn parse_choice<C: Categorical>(&self) -> Result<C, String> {
        let field = self.field(C::FIELD)?;
        match &field.input {
            FieldInput::Choice { options, selected } => C::from_code(options[*selected].0),
            FieldInput::Numeric { .. } => Err(format!("{}: not a choice field", field.label)),
        }
    }

    /// Fill every field from a record.
    pub fn load_record(&mut self, record: &RawRecord) {
        self.set_numeric("age", record.age.to_string());
        self.set_choice(record.sex);
        self.set_choice(record.cp);
        self.set_numeric("trestbps", record.trestbps.to_string());
        self.set_numeric("chol", record.chol.to_string());
        self.set_choice(record.fbs);
        self.set_choice(record.restecg);
        self.set_numeric("thalach", record.thalach.to_string());
        self.set_choice(record.exang);
        self.set_numeric("oldpeak", format!("{:.1}", record.oldpeak));
        self.set_choice(record.slope);
        self.set_numeric("ca", record.ca.to_string());
        self.set_choice(record.thal);
        self.error_message = None;
    }

    /// Load the high-risk sample patient
    pub fn load_sample_data(&mut self) {
        self.load_record(&RawRecord::sample());
    }

    /// Restore all defaults
    pub fn reset(&mut self) {
        self.load_record(&RawRecord::default());
        self.selected_field = 0;
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle the selected choice field forward or backward.
    pub fn cycle_choice(&mut self, forward: bool) {
        if let FieldInput::Choice { options, selected } =
            &mut self.fields[self.selected_field].input
        {
            let n = options.len();
            *selected = if forward {
                (*selected + 1) % n
            } else {
                (*selected + n - 1) % n
            };
            self.error_message = None;
        }
    }

    /// Add a character to the current numeric field
    pub fn input_char(&mut self, c: char) {
        if let FieldInput::Numeric { buffer, decimal } = &mut self.fields[self.selected_field].input
        {
            let accepted = c.is_ascii_digit() || (c == '.' && *decimal && !buffer.contains('.'));
            if accepted && buffer.len() < 8 {
                buffer.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let FieldInput::Numeric { buffer, .. } = &mut self.fields[self.selected_field].input {
            buffer.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let FieldInput::Numeric { buffer, .. } = &mut self.fields[self.selected_field].input {
            buffer.zeroize();
        }
    }

    /// Wipe all typed buffers from memory.
    ///
    /// Called right after a submission so entered values do not persist in
    /// the UI state.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            match &mut field.input {
                FieldInput::Numeric { buffer, .. } => buffer.zeroize(),
                FieldInput::Choice { selected, .. } => *selected = 0,
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Parse the form into a record.
    ///
    /// Bounds are checked by the inference service, not here.
    ///
    /// # Errors
    /// Returns a message naming the first field that is not a number.
    pub fn to_raw_record(&self) -> Result<RawRecord, String> {
        Ok(RawRecord {
            age: self.parse_numeric("age")?,
            sex: self.parse_choice()?,
            cp: self.parse_choice()?,
            trestbps: self.parse_numeric("trestbps")?,
            chol: self.parse_numeric("chol")?,
            fbs: self.parse_choice()?,
            restecg: self.parse_choice()?,
            thalach: self.parse_numeric("thalach")?,
            exang: self.parse_choice()?,
            oldpeak: self.parse_numeric("oldpeak")?,
            slope: self.parse_choice()?,
            ca: self.parse_numeric("ca")?,
            thal: self.parse_choice()?,
        })
    }
}

/// Render the patient data input form.
///
/// `unavailable` carries the model load failure, shown above the fields.
pub fn render_patient_form(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    unavailable: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], unavailable);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, unavailable: Option<&str>) {
    let mut spans = vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Information", MedicalTheme::title()),
    ];
    match unavailable {
        Some(reason) => {
            spans.push(Span::styled(" │ Prediction disabled: ", MedicalTheme::danger()));
            spans.push(Span::styled(reason.to_string(), MedicalTheme::danger()));
        }
        None => spans.push(Span::styled(
            " │ Heart Disease Risk Attributes",
            MedicalTheme::text_secondary(),
        )),
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = state.fields.len().div_ceil(2);

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match &field.input {
            FieldInput::Numeric { buffer, .. } => {
                if buffer.is_empty() {
                    spans.push(Span::styled(field.hint.as_str(), MedicalTheme::text_muted()));
                } else {
                    spans.push(Span::styled(buffer.as_str(), MedicalTheme::text()));
                }
                if is_selected {
                    spans.push(Span::styled("▌", MedicalTheme::cursor()));
                }
            }
            FieldInput::Choice { .. } => {
                if is_selected {
                    spans.push(Span::styled("‹ ", MedicalTheme::key_hint()));
                }
                spans.push(Span::styled(field.display(), MedicalTheme::text()));
                if is_selected {
                    spans.push(Span::styled(" ›", MedicalTheme::key_hint()));
                }
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Change ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict Risk ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Reset ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Back", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(state: &mut PatientFormState, key: &str) {
        state.selected_field = state
            .fields
            .iter()
            .position(|f| f.key == key)
            .expect("field exists");
    }

    #[test]
    fn test_defaults_round_trip() {
        let state = PatientFormState::default();
        assert_eq!(state.fields.len(), 13);
        assert_eq!(state.to_raw_record().expect("parse"), RawRecord::default());
    }

    #[test]
    fn test_sample_and_reset() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        assert_eq!(state.to_raw_record().expect("parse"), RawRecord::sample());

        state.reset();
        assert_eq!(state.to_raw_record().expect("parse"), RawRecord::default());
    }

    #[test]
    fn test_choice_cycles_both_ways() {
        let mut state = PatientFormState::default();
        select(&mut state, "cp");

        state.cycle_choice(false);
        assert_eq!(state.to_raw_record().expect("parse").cp, ChestPain::Asymptomatic);
        state.cycle_choice(true);
        state.cycle_choice(true);
        assert_eq!(state.to_raw_record().expect("parse").cp, ChestPain::AtypicalAngina);
    }

    #[test]
    fn test_numeric_input_filters_characters() {
        let mut state = PatientFormState::default();
        select(&mut state, "oldpeak");
        state.clear_field();
        for c in "2.5.x".chars() {
            state.input_char(c);
        }
        assert!((state.to_raw_record().expect("parse").oldpeak - 2.5).abs() < 1e-12);

        select(&mut state, "age");
        state.input_char('.');
        assert_eq!(state.to_raw_record().expect("parse").age, 50);
    }

    #[test]
    fn test_empty_field_is_invalid_number() {
        let mut state = PatientFormState::default();
        select(&mut state, "chol");
        state.clear_field();
        let err = state.to_raw_record().expect_err("must fail");
        assert!(err.starts_with("Serum Cholesterol"));
    }

    #[test]
    fn test_clear_sensitive_wipes_buffers() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        state.clear_sensitive();
        assert!(state.fields.iter().all(|f| match &f.input {
            FieldInput::Numeric { buffer, .. } => buffer.is_empty(),
            FieldInput::Choice { selected, .. } => *selected == 0,
        }));
    }
}
