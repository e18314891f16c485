use color_eyre::eyre::Result;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::Component;
use crate::{
    action::Action,
    mode::Route,
    theme::{ThemeColors, ThemeMode},
};

/// The personal facet's home screen: the day's routine window and the
/// user's focus areas.
pub struct Personal {
    active: bool,
    theme: ThemeMode,
    routine_start: String,
    routine_end: String,
    focus_areas: Vec<String>,
    state: ListState,
}

impl Default for Personal {
    fn default() -> Self {
        Self::new()
    }
}

impl Personal {
    pub fn new() -> Self {
        Self {
            active: false,
            theme: ThemeMode::default(),
            routine_start: "07:30".to_string(),
            routine_end: "22:00".to_string(),
            // Placeholder focus areas until the profile feeds them.
            focus_areas: vec![
                "Deep work".to_string(),
                "Exercise".to_string(),
                "Reading".to_string(),
                "Sleep".to_string(),
            ],
            state: ListState::default(),
        }
    }

    fn colors(&self) -> ThemeColors {
        ThemeColors::of(self.theme)
    }

    fn next(&mut self) {
        if self.focus_areas.is_empty() {
            return self.state.select(None);
        }
        let i = match self.state.selected() {
            Some(i) if i >= self.focus_areas.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.focus_areas.is_empty() {
            return self.state.select(None);
        }
        let i = match self.state.selected() {
            Some(0) | None => self.focus_areas.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

impl Component for Personal {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Navigate(route) => self.active = route == Route::PersonalHome,
            Action::ThemeChanged(theme) => self.theme = theme,
            Action::NextItem if self.active => self.next(),
            Action::PreviousItem if self.active => self.previous(),
            Action::ProfileLoaded(Some(profile)) => {
                if let Some(start) = profile.daily_routine_start {
                    self.routine_start = start;
                }
                if let Some(end) = profile.daily_routine_end {
                    self.routine_end = end;
                }
                if !profile.focus_areas.is_empty() {
                    self.focus_areas = profile.focus_areas;
                    self.state.select(None);
                }
            }
            _ => (),
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        let colors = self.colors();

        let rects = Layout::default()
            .constraints([Constraint::Min(3), Constraint::Percentage(100)].as_ref())
            .split(rect);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Routine ", Style::default().fg(colors.text_muted)),
            Span::styled(
                format!("{} - {}", self.routine_start, self.routine_end),
                Style::default().fg(colors.info).add_modifier(Modifier::BOLD),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .title(Line::from(vec![Span::styled(
                    " Personal ",
                    Style::default()
                        .fg(colors.primary)
                        .add_modifier(Modifier::BOLD),
                )]))
                .style(Style::default().bg(colors.surface)),
        );
        f.render_widget(header, rects[0]);

        let items: Vec<ListItem> = self
            .focus_areas
            .iter()
            .map(|area| {
                ListItem::new(Line::from(Span::styled(
                    area.clone(),
                    Style::default().fg(colors.text),
                )))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::new()
                    .borders(Borders::NONE)
                    .style(Style::default().fg(colors.text).bg(colors.background)),
            )
            .highlight_style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED)
                    .fg(colors.primary),
            )
            .highlight_symbol(">")
            .highlight_spacing(HighlightSpacing::Always);

        f.render_stateful_widget(list, rects[1], &mut self.state);

        Ok(())
    }
}
