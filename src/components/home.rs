use color_eyre::eyre::Result;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use super::Component;
use crate::{
    action::Action,
    mode::Route,
    models::DEFAULT_CURRENCY,
    theme::{ThemeColors, ThemeMode},
};

/// One line of the money ledger shown on the financial home screen.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub label: String,
    pub amount: f64,
}

impl LedgerEntry {
    fn new(label: &str, amount: f64) -> Self {
        Self {
            label: label.to_string(),
            amount,
        }
    }

    fn to_list_item(&self, colors: &ThemeColors) -> ListItem<'_> {
        let amount_color = if self.amount < 0.0 {
            colors.danger
        } else {
            colors.success
        };
        ListItem::new(Line::from(vec![
            Span::styled(self.label.clone(), Style::default().fg(colors.text)),
            Span::raw("  "),
            Span::styled(
                format!("{:+.2} {}", self.amount, DEFAULT_CURRENCY),
                Style::default().fg(amount_color),
            ),
        ]))
    }
}

#[derive(Default)]
pub struct LedgerList {
    state: ListState,
    items: Vec<LedgerEntry>,
    last_selected: Option<usize>,
}

impl LedgerList {
    fn new(items: Vec<LedgerEntry>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return self.state.select(None);
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => self.last_selected.unwrap_or(0),
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return self.state.select(None);
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => self.last_selected.unwrap_or(0),
        };
        self.state.select(Some(i));
    }
}

/// The financial facet's home screen: balance header, recent ledger
/// activity, and the keymap footer.
pub struct Home {
    active: bool,
    show_help: bool,
    theme: ThemeMode,
    entries: LedgerList,
    app_ticker: usize,
    render_ticker: usize,
    action_tx: Option<UnboundedSender<Action>>,
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

impl Home {
    pub fn new() -> Self {
        // Placeholder ledger until account sync lands.
        let entries = LedgerList::new(vec![
            LedgerEntry::new("Salary", 850.0),
            LedgerEntry::new("Rent", -320.0),
            LedgerEntry::new("Groceries", -86.5),
            LedgerEntry::new("Transport", -24.0),
            LedgerEntry::new("Side projects", 120.0),
        ]);
        Self {
            active: true,
            show_help: false,
            theme: ThemeMode::default(),
            entries,
            app_ticker: 0,
            render_ticker: 0,
            action_tx: None,
        }
    }

    fn colors(&self) -> ThemeColors {
        ThemeColors::of(self.theme)
    }

    fn balance(&self) -> f64 {
        self.entries.items.iter().map(|e| e.amount).sum()
    }

    fn tick(&mut self) {
        self.app_ticker = self.app_ticker.saturating_add(1);
    }

    fn render_tick(&mut self) {
        self.render_ticker = self.render_ticker.saturating_add(1);
    }
}

impl Component for Home {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.tick(),
            Action::Render => self.render_tick(),
            Action::Navigate(route) => self.active = route == Route::FinancialHome,
            Action::ThemeChanged(theme) => self.theme = theme,
            Action::ToggleShowHelp if self.active => self.show_help = !self.show_help,
            Action::NextItem if self.active => self.entries.next(),
            Action::PreviousItem if self.active => self.entries.previous(),
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
            .constraints(
                [
                    Constraint::Min(3),
                    Constraint::Percentage(100),
                    Constraint::Min(3),
                ]
                .as_ref(),
            )
            .split(rect);

        // TOP: balance summary
        let balance = self.balance();
        let balance_color = if balance < 0.0 {
            colors.danger
        } else {
            colors.success
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("Balance ", Style::default().fg(colors.text_muted)),
            Span::styled(
                format!("{:.2} {}", balance, DEFAULT_CURRENCY),
                Style::default()
                    .fg(balance_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .title(Line::from(vec![Span::styled(
                    " Financial ",
                    Style::default()
                        .fg(colors.primary)
                        .add_modifier(Modifier::BOLD),
                )]))
                .style(Style::default().bg(colors.surface)),
        );
        f.render_widget(header, rects[0]);

        // MIDDLE: recent activity
        let inner_block = Block::new()
            .borders(Borders::NONE)
            .style(Style::default().fg(colors.text).bg(colors.background));

        let items: Vec<ListItem> = self
            .entries
            .items
            .iter()
            .map(|entry| entry.to_list_item(&colors))
            .collect();

        let items = List::new(items)
            .block(inner_block)
            .highlight_style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED)
                    .fg(colors.primary),
            )
            .highlight_symbol(">")
            .highlight_spacing(HighlightSpacing::Always);

        f.render_stateful_widget(items, rects[1], &mut self.entries.state);

        // BOTTOM: keymap footer
        let mut help_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border))
            .style(Style::default().bg(colors.surface));
        let spacer = Span::raw("   ");
        let key_style = Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(colors.text);
        let hint_style = Style::default().fg(colors.text_muted);

        let default_help = Line::from(vec![
            Span::styled("j/k", key_style),
            Span::raw(" "),
            Span::styled("move", hint_style),
            spacer.clone(),
            Span::styled("m", key_style),
            Span::raw(" "),
            Span::styled("personal facet", hint_style),
            spacer.clone(),
            Span::styled("t", key_style),
            Span::raw(" "),
            Span::styled("theme", hint_style),
            spacer.clone(),
            Span::styled("q", key_style),
            Span::raw(" "),
            Span::styled("quit", hint_style),
            spacer.clone(),
            Span::styled("?", key_style),
            Span::raw(" "),
            Span::styled("more", hint_style),
        ]);

        let mut lines = vec![];
        if self.show_help {
            help_block = help_block.title("Help");
            lines.push(Line::from(vec![
                Span::styled("o", key_style),
                Span::raw(" "),
                Span::styled("onboarding", hint_style),
                spacer.clone(),
                Span::styled("r", key_style),
                Span::raw(" "),
                Span::styled("refresh", hint_style),
                spacer.clone(),
                Span::styled("ctrl-z", key_style),
                Span::raw(" "),
                Span::styled("suspend", hint_style),
            ]));
        }
        lines.push(default_help);

        let help_widget = Paragraph::new(lines).block(help_block);
        f.render_widget(help_widget, rects[2]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn navigation_toggles_visibility() {
        let mut home = Home::new();
        assert!(home.active);
        home.update(Action::Navigate(Route::PersonalHome)).unwrap();
        assert!(!home.active);
        home.update(Action::Navigate(Route::FinancialHome)).unwrap();
        assert!(home.active);
    }

    #[test]
    fn list_selection_wraps() {
        let mut home = Home::new();
        let n = home.entries.items.len();
        for _ in 0..n {
            home.update(Action::NextItem).unwrap();
        }
        assert_eq!(home.entries.state.selected(), Some(n - 1));
        home.update(Action::NextItem).unwrap();
        assert_eq!(home.entries.state.selected(), Some(0));
        home.update(Action::PreviousItem).unwrap();
        assert_eq!(home.entries.state.selected(), Some(n - 1));
    }

    #[test]
    fn inactive_screen_ignores_list_keys() {
        let mut home = Home::new();
        home.update(Action::Navigate(Route::PersonalHome)).unwrap();
        home.update(Action::NextItem).unwrap();
        assert_eq!(home.entries.state.selected(), None);
    }
}
