use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tui_input::{backend::crossterm::EventHandler, Input};

use super::Component;
use crate::{
    action::Action,
    mode::{AppMode, Route},
    models::{NewProfile, PreferredMode, ProfileApi, RiskTolerance, DEFAULT_CURRENCY},
    theme::{ThemeColors, ThemeMode},
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum Field {
    #[default]
    Name,
    Email,
    MonthlyIncome,
    HouseholdSize,
    PrimaryGoals,
    RiskTolerance,
    PersonalInterests,
    RoutineStart,
    RoutineEnd,
    FocusAreas,
}

impl Field {
    const ALL: [Field; 10] = [
        Field::Name,
        Field::Email,
        Field::MonthlyIncome,
        Field::HouseholdSize,
        Field::PrimaryGoals,
        Field::RiskTolerance,
        Field::PersonalInterests,
        Field::RoutineStart,
        Field::RoutineEnd,
        Field::FocusAreas,
    ];

    fn title(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::MonthlyIncome => "monthly income (JD)",
            Field::HouseholdSize => "household size",
            Field::PrimaryGoals => "primary goals (comma separated)",
            Field::RiskTolerance => "risk tolerance (low/medium/high)",
            Field::PersonalInterests => "interests (comma separated)",
            Field::RoutineStart => "routine start (hh:mm)",
            Field::RoutineEnd => "routine end (hh:mm)",
            Field::FocusAreas => "focus areas (comma separated)",
        }
    }

    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First-run profile form. Collects the onboarding answers and inserts the
/// profile row through [`ProfileApi`] on a background task; the main loop
/// hears back via [`Action::ProfileSaved`].
pub struct Onboarding {
    action_tx: Option<UnboundedSender<Action>>,
    api: Option<Arc<ProfileApi>>,
    user_id: Option<String>,
    show_form: bool,
    saving: bool,
    save_failed: bool,
    focused: Field,
    mode: AppMode,
    theme: ThemeMode,
    throbber_state: throbber_widgets_tui::ThrobberState,
    name: Input,
    email: Input,
    monthly_income: Input,
    household_size: Input,
    primary_goals: Input,
    risk_tolerance: Input,
    personal_interests: Input,
    routine_start: Input,
    routine_end: Input,
    focus_areas: Input,
}

impl Onboarding {
    pub fn new(api: Option<Arc<ProfileApi>>, user_id: Option<String>) -> Self {
        Self {
            action_tx: None,
            api,
            user_id,
            show_form: false,
            saving: false,
            save_failed: false,
            focused: Field::default(),
            mode: AppMode::default(),
            theme: ThemeMode::default(),
            throbber_state: Default::default(),
            name: Default::default(),
            email: Default::default(),
            monthly_income: Default::default(),
            household_size: Default::default(),
            primary_goals: Default::default(),
            risk_tolerance: Default::default(),
            personal_interests: Default::default(),
            routine_start: Default::default(),
            routine_end: Default::default(),
            focus_areas: Default::default(),
        }
    }

    fn colors(&self) -> ThemeColors {
        ThemeColors::of(self.theme)
    }

    fn input_mut(&mut self, field: Field) -> &mut Input {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::MonthlyIncome => &mut self.monthly_income,
            Field::HouseholdSize => &mut self.household_size,
            Field::PrimaryGoals => &mut self.primary_goals,
            Field::RiskTolerance => &mut self.risk_tolerance,
            Field::PersonalInterests => &mut self.personal_interests,
            Field::RoutineStart => &mut self.routine_start,
            Field::RoutineEnd => &mut self.routine_end,
            Field::FocusAreas => &mut self.focus_areas,
        }
    }

    fn input(&self, field: Field) -> &Input {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::MonthlyIncome => &self.monthly_income,
            Field::HouseholdSize => &self.household_size,
            Field::PrimaryGoals => &self.primary_goals,
            Field::RiskTolerance => &self.risk_tolerance,
            Field::PersonalInterests => &self.personal_interests,
            Field::RoutineStart => &self.routine_start,
            Field::RoutineEnd => &self.routine_end,
            Field::FocusAreas => &self.focus_areas,
        }
    }

    fn build_profile(&self) -> NewProfile {
        NewProfile {
            email: self.email.value().trim().to_string(),
            name: self.name.value().trim().to_string(),
            preferred_mode: PreferredMode::from(self.mode),
            has_completed_onboarding: true,
            monthly_income: self.monthly_income.value().trim().parse().unwrap_or(0.0),
            household_size: self.household_size.value().trim().parse().unwrap_or(1),
            primary_goals: split_list(self.primary_goals.value()),
            risk_tolerance: self
                .risk_tolerance
                .value()
                .trim()
                .parse()
                .unwrap_or(RiskTolerance::Medium),
            personal_interests: split_list(self.personal_interests.value()),
            daily_routine_start: optional(self.routine_start.value()),
            daily_routine_end: optional(self.routine_end.value()),
            focus_areas: split_list(self.focus_areas.value()),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        if self.saving {
            return None;
        }
        // Presence check only; the backend owns real validation.
        if self.name.value().trim().is_empty() || self.email.value().trim().is_empty() {
            self.save_failed = true;
            return None;
        }
        self.save_failed = false;
        let profile = self.build_profile();
        info!(name = %profile.name, "submitting profile");
        match (&self.action_tx, &self.api, &self.user_id) {
            (Some(tx), Some(api), Some(user_id)) => {
                let tx = tx.clone();
                let api = api.clone();
                let user_id = user_id.clone();
                tokio::spawn(async move {
                    let _ = tx.send(Action::EnterProcessing);
                    let saved = api.create_profile(&user_id, &profile).await;
                    let _ = tx.send(Action::ProfileSaved(saved));
                    let _ = tx.send(Action::ExitProcessing);
                });
                None
            }
            _ => {
                warn!("profile service not configured, cannot save profile");
                Some(Action::ProfileSaved(false))
            }
        }
    }

    fn open(&mut self) -> Option<Action> {
        self.show_form = true;
        self.save_failed = false;
        self.focused = Field::default();
        Some(Action::EnterInsert)
    }

    fn close(&mut self) -> Option<Action> {
        self.show_form = false;
        self.saving = false;
        Some(Action::EnterNormal)
    }
}

impl Component for Onboarding {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let mut result = None;
        match action {
            Action::Tick => self.throbber_state.calc_next(),
            Action::ThemeChanged(theme) => self.theme = theme,
            Action::Navigate(route) => {
                self.mode = match route {
                    Route::FinancialHome => AppMode::Financial,
                    Route::PersonalHome => AppMode::Personal,
                };
            }
            Action::StartOnboarding => result = self.open(),
            Action::EnterProcessing => self.saving = true,
            Action::ExitProcessing => self.saving = false,
            Action::ProfileSaved(true) => result = self.close(),
            Action::ProfileSaved(false) => self.save_failed = true,
            _ => (),
        }
        Ok(result)
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if !self.show_form || self.saving {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Esc => self.close(),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => {
                self.focused = self.focused.next();
                Some(Action::Update)
            }
            KeyCode::BackTab => {
                self.focused = self.focused.previous();
                Some(Action::Update)
            }
            _ => {
                self.input_mut(self.focused)
                    .handle_event(&crossterm::event::Event::Key(key));
                Some(Action::Update)
            }
        };
        Ok(action)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        if !self.show_form {
            return Ok(());
        }
        let colors = self.colors();

        let rect = rect.inner(Margin {
            horizontal: 6,
            vertical: 2,
        });
        f.render_widget(Clear, rect);

        let frame_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border))
            .style(Style::default().bg(colors.surface))
            .title(Line::from(vec![Span::styled(
                " Tell us about yourself ",
                Style::default()
                    .fg(colors.primary)
                    .add_modifier(Modifier::BOLD),
            )]));
        f.render_widget(frame_block, rect);

        let inner = rect.inner(Margin {
            horizontal: 2,
            vertical: 1,
        });
        let mut constraints = vec![Constraint::Length(3); Field::ALL.len()];
        constraints.push(Constraint::Min(1));
        let rows = Layout::new(Direction::Vertical, constraints).split(inner);

        let width = inner.width.max(3) - 3; // keep 2 for borders and 1 for cursor
        for (i, field) in Field::ALL.into_iter().enumerate() {
            let focused = self.focused == field;
            let input = self.input(field);
            let style = if focused {
                Style::default().fg(colors.primary)
            } else {
                Style::default().fg(colors.text)
            };
            let widget = Paragraph::new(input.value())
                .style(style)
                .scroll((0, input.visual_scroll(width as usize) as u16))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(if focused {
                            colors.primary
                        } else {
                            colors.border
                        }))
                        .title(Line::from(vec![Span::styled(
                            field.title(),
                            Style::default()
                                .fg(colors.text_muted)
                                .add_modifier(Modifier::BOLD),
                        )])),
                );
            f.render_widget(widget, rows[i]);

            if focused && !self.saving {
                let scroll = input.visual_scroll(width as usize);
                f.set_cursor(
                    rows[i].x + ((input.visual_cursor()).max(scroll) - scroll) as u16 + 1,
                    rows[i].y + 1,
                );
            }
        }

        let status_row = rows[Field::ALL.len()];
        if self.saving {
            let throbber = throbber_widgets_tui::Throbber::default()
                .throbber_style(
                    Style::default()
                        .fg(colors.info)
                        .add_modifier(Modifier::BOLD),
                )
                .throbber_set(throbber_widgets_tui::BRAILLE_EIGHT_DOUBLE)
                .use_type(throbber_widgets_tui::WhichUse::Spin)
                .to_symbol_span(&self.throbber_state);
            let line = Line::from(vec![
                throbber,
                Span::styled("Saving profile...", Style::default().fg(colors.info)),
            ]);
            f.render_widget(Paragraph::new(line).alignment(Alignment::Left), status_row);
        } else if self.save_failed {
            let line = Line::from(Span::styled(
                "Could not save profile. Check the connection and try again.",
                Style::default().fg(colors.danger),
            ));
            f.render_widget(Paragraph::new(line), status_row);
        } else {
            let line = Line::from(vec![
                Span::styled(
                    "tab",
                    Style::default()
                        .fg(colors.text)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled("next field", Style::default().fg(colors.text_muted)),
                Span::raw("   "),
                Span::styled(
                    "enter",
                    Style::default()
                        .fg(colors.text)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled("save", Style::default().fg(colors.text_muted)),
                Span::raw("   "),
                Span::styled(
                    "esc",
                    Style::default()
                        .fg(colors.text)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled("skip", Style::default().fg(colors.text_muted)),
            ]);
            f.render_widget(Paragraph::new(line), status_row);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn type_str(form: &mut Onboarding, text: &str) {
        for c in text.chars() {
            form.handle_key_events(KeyEvent::from(KeyCode::Char(c)))
                .unwrap();
        }
    }

    #[test]
    fn open_locks_input_and_close_releases_it() {
        let mut form = Onboarding::new(None, None);
        let opened = form.update(Action::StartOnboarding).unwrap();
        assert_eq!(opened, Some(Action::EnterInsert));
        assert!(form.show_form);

        let closed = form.handle_key_events(KeyEvent::from(KeyCode::Esc)).unwrap();
        assert_eq!(closed, Some(Action::EnterNormal));
        assert!(!form.show_form);
    }

    #[test]
    fn tab_cycles_through_every_field() {
        let mut form = Onboarding::new(None, None);
        form.update(Action::StartOnboarding).unwrap();
        for expected in Field::ALL {
            assert_eq!(form.focused, expected);
            form.handle_key_events(KeyEvent::from(KeyCode::Tab)).unwrap();
        }
        // Wrapped all the way around.
        assert_eq!(form.focused, Field::Name);
        form.handle_key_events(KeyEvent::from(KeyCode::BackTab))
            .unwrap();
        assert_eq!(form.focused, Field::FocusAreas);
    }

    #[test]
    fn submit_without_service_reports_failure() {
        let mut form = Onboarding::new(None, None);
        form.update(Action::StartOnboarding).unwrap();
        type_str(&mut form, "Lina");
        form.handle_key_events(KeyEvent::from(KeyCode::Tab)).unwrap();
        type_str(&mut form, "lina@example.com");
        let result = form
            .handle_key_events(KeyEvent::from(KeyCode::Enter))
            .unwrap();
        assert_eq!(result, Some(Action::ProfileSaved(false)));
    }

    #[test]
    fn submit_requires_name_and_email() {
        let mut form = Onboarding::new(None, None);
        form.update(Action::StartOnboarding).unwrap();
        let result = form
            .handle_key_events(KeyEvent::from(KeyCode::Enter))
            .unwrap();
        assert_eq!(result, None);
        assert!(form.save_failed);
    }

    #[test]
    fn profile_payload_reflects_inputs() {
        let mut form = Onboarding::new(None, None);
        form.update(Action::StartOnboarding).unwrap();
        form.update(Action::Navigate(Route::PersonalHome)).unwrap();
        type_str(&mut form, "Lina");
        form.handle_key_events(KeyEvent::from(KeyCode::Tab)).unwrap();
        type_str(&mut form, "lina@example.com");
        form.handle_key_events(KeyEvent::from(KeyCode::Tab)).unwrap();
        type_str(&mut form, "850");
        form.handle_key_events(KeyEvent::from(KeyCode::Tab)).unwrap();
        type_str(&mut form, "3");
        form.handle_key_events(KeyEvent::from(KeyCode::Tab)).unwrap();
        type_str(&mut form, "emergency fund, debt free");
        form.handle_key_events(KeyEvent::from(KeyCode::Tab)).unwrap();
        type_str(&mut form, "low");

        let profile = form.build_profile();
        assert_eq!(profile.name, "Lina");
        assert_eq!(profile.monthly_income, 850.0);
        assert_eq!(profile.household_size, 3);
        assert_eq!(
            profile.primary_goals,
            vec!["emergency fund".to_string(), "debt free".to_string()]
        );
        assert_eq!(profile.risk_tolerance, RiskTolerance::Low);
        assert_eq!(profile.preferred_mode, PreferredMode::Personal);
        assert!(profile.has_completed_onboarding);
        assert_eq!(profile.currency, "JD");
        assert_eq!(profile.daily_routine_start, None);
    }
}
