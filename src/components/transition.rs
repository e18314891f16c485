use std::time::Instant;

use color_eyre::eyre::Result;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use super::Component;
use crate::{
    action::Action,
    mode::{self, AppMode},
    theme::{ThemeColors, ThemeMode},
};

/// Full-screen sweep shown while the app switches facets.
///
/// The overlay owns its animation clock: it starts timing on
/// [`Action::TransitionStarted`], samples the shared progress/scale curves
/// every render frame, and disappears on [`Action::TransitionEnded`]. The
/// screens underneath must treat the whole window as unstable — the mode
/// is only settled once the overlay is gone.
pub struct TransitionOverlay {
    started: Option<Instant>,
    target: Option<AppMode>,
    theme: ThemeMode,
}

impl Default for TransitionOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionOverlay {
    pub fn new() -> Self {
        Self {
            started: None,
            target: None,
            theme: ThemeMode::default(),
        }
    }

    fn colors(&self) -> ThemeColors {
        ThemeColors::of(self.theme)
    }
}

impl Component for TransitionOverlay {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::TransitionStarted(target) => {
                self.started = Some(Instant::now());
                self.target = Some(target);
            }
            Action::TransitionEnded => {
                self.started = None;
                self.target = None;
            }
            Action::ThemeChanged(theme) => self.theme = theme,
            _ => (),
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, rect: Rect) -> Result<()> {
        let (Some(started), Some(target)) = (self.started, self.target) else {
            return Ok(());
        };
        let colors = self.colors();
        let elapsed = started.elapsed();
        let progress = mode::progress_at(elapsed);
        let scale = mode::scale_at(elapsed);

        f.render_widget(Clear, rect);
        f.render_widget(
            Block::new().style(Style::default().bg(colors.background)),
            rect,
        );

        // The card dips with the scale curve, like the screen shrinking
        // away underneath the sweep.
        let card_width = ((rect.width as f64 * 0.6 * scale) as u16)
            .max(20)
            .min(rect.width);
        let card_height = ((7.0 * scale).round() as u16).max(5).min(rect.height);
        let card = centered_rect(rect, card_width, card_height);

        let title = match target {
            AppMode::Financial => "Switching to Financial",
            AppMode::Personal => "Switching to Personal",
        };

        let rows = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
            ],
        )
        .margin(1)
        .split(card);

        f.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.primary))
                .style(Style::default().bg(colors.surface)),
            card,
        );
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                title,
                Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center),
            rows[0],
        );
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(colors.primary).bg(colors.primary_light))
                .ratio(progress)
                .label(format!("{:>3.0}%", progress * 100.0)),
            rows[1],
        );

        Ok(())
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
