//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous prediction on form submission

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::ArtifactClassifier;
use crate::application::InferenceService;
use crate::config::AppConfig;
use crate::domain::PredictionResult;

use super::ui::{
    dashboard::{render_dashboard, DashboardState},
    guide::render_guide,
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::render_result,
};

fn enter_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Run `setup`, calling `restore` if it fails so the terminal is not left
/// in raw mode.
fn setup_or_restore<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce()) -> Result<T> {
    setup().map_err(|e| {
        restore();
        e
    })
}

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
    Result,
    Guide,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Screen to return to when leaving the guide
    guide_return: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Inference service, ready or degraded
    service: InferenceService<ArtifactClassifier>,

    /// Dashboard state (fixed after startup)
    dashboard_state: DashboardState,

    /// Patient form state
    patient_form_state: PatientFormState,

    /// Last prediction, consumed by the result screen
    last_result: Option<PredictionResult>,
}

impl App {
    /// Create the application, loading the model named by `config`.
    ///
    /// A load failure does not fail construction; the app starts degraded.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let service = InferenceService::load(config);
        Self::with_service(service, config)
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_service(service: InferenceService<ArtifactClassifier>, config: &AppConfig) -> Self {
        let dashboard_state = DashboardState::from_service(&service, &config.model_path);
        Self {
            screen: Screen::Dashboard,
            guide_return: Screen::Dashboard,
            should_quit: false,
            service,
            dashboard_state,
            patient_form_state: PatientFormState::default(),
            last_result: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut terminal = setup_or_restore(enter_terminal, || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        })?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => render_dashboard(f, content_area, &self.dashboard_state),
                    Screen::PatientForm => render_patient_form(
                        f,
                        content_area,
                        &self.patient_form_state,
                        self.unavailable_reason().as_deref(),
                    ),
                    Screen::Result => render_result(f, content_area, self.last_result.as_ref()),
                    Screen::Guide => render_guide(f, content_area),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn unavailable_reason(&self) -> Option<String> {
        self.service.load_error().map(ToString::to_string)
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::Guide => self.handle_guide_key(key),
        }
    }

    fn open_form(&mut self) {
        self.patient_form_state = PatientFormState::default();
        self.screen = Screen::PatientForm;
    }

    fn open_guide(&mut self) {
        self.guide_return = self.screen;
        self.screen = Screen::Guide;
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => self.open_form(),
            KeyCode::Char('g') | KeyCode::Char('G') => self.open_guide(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::Dashboard,
            KeyCode::Up | KeyCode::BackTab => self.patient_form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.patient_form_state.next_field(),
            KeyCode::Left => self.patient_form_state.cycle_choice(false),
            KeyCode::Right => self.patient_form_state.cycle_choice(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.patient_form_state.load_sample_data(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.patient_form_state.reset(),
            KeyCode::Char(c) => self.patient_form_state.input_char(c),
            KeyCode::Backspace => self.patient_form_state.delete_char(),
            KeyCode::Delete => self.patient_form_state.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('g') | KeyCode::Char('G') => self.open_guide(),
            KeyCode::Char('n') | KeyCode::Char('N') => self.open_form(),
            KeyCode::Enter | KeyCode::Esc => self.screen = Screen::Dashboard,
            _ => {}
        }
    }

    fn handle_guide_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Enter) {
            self.screen = self.guide_return;
        }
    }

    fn submit_patient_form(&mut self) {
        let raw = match self.patient_form_state.to_raw_record() {
            Ok(raw) => raw,
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
                return;
            }
        };

        match self.service.predict(&raw) {
            Ok(result) => {
                self.last_result = Some(result);
                self.patient_form_state.clear_sensitive();
                self.screen = Screen::Result;
            }
            Err(e) => {
                // The message can carry submitted values; log the kind only.
                tracing::debug!(kind = e.kind(), "Submission not completed");
                self.patient_form_state.error_message = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLabel;
    use tempfile::tempdir;

    #[test]
    fn test_failed_setup_restores_terminal() {
        let restored = std::cell::Cell::new(false);
        let outcome: Result<()> =
            setup_or_restore(|| Err(anyhow::anyhow!("no tty")), || restored.set(true));
        assert!(outcome.is_err());
        assert!(restored.get());

        restored.set(false);
        let value = setup_or_restore(|| Ok(7), || restored.set(true)).expect("setup");
        assert_eq!(value, 7);
        assert!(!restored.get());
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn ready_app() -> App {
        App::new(&AppConfig::default())
    }

    fn degraded_app() -> (App, tempfile::TempDir) {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig {
            model_path: temp.path().join("heart_disease_model.json"),
            ..AppConfig::default()
        };
        (App::new(&config), temp)
    }

    #[test]
    fn test_navigation() {
        let mut app = ready_app();
        assert_eq!(app.screen, Screen::Dashboard);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::PatientForm);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Dashboard);

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.screen, Screen::Guide);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_ctrl_q_quits_from_form() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('n'));
        // Plain 'q' is not a hotkey on the form.
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_submit_sample_shows_high_risk() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Result);
        let result = app.last_result.as_ref().expect("result");
        assert_eq!(result.label, RiskLabel::High);

        // Typed buffers are wiped after submission.
        assert!(app.patient_form_state.to_raw_record().is_err());

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.screen, Screen::Guide);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Result);
    }

    #[test]
    fn test_out_of_range_stays_on_form() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('n'));
        // Age is the first field; 50 -> 500.
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::PatientForm);
        let message = app.patient_form_state.error_message.as_deref().unwrap_or("");
        assert!(message.contains("Age 500"));
        assert!(app.last_result.is_none());
    }

    #[test]
    fn test_degraded_submit_shows_reason() {
        let (mut app, _temp) = degraded_app();
        assert!(app.unavailable_reason().is_some());

        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::PatientForm);
        assert!(app.last_result.is_none());
        let message = app.patient_form_state.error_message.as_deref().unwrap_or("");
        assert!(message.starts_with("Prediction unavailable"));
    }
}
