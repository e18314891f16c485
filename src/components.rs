use color_eyre::eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    action::Action,
    config::Config,
    tui::{Event, Frame},
};

pub mod home;
pub mod onboarding;
pub mod personal;
pub mod transition;

/// `Component` is a trait that represents a visual and interactive element of
/// the user interface. Implementors can be registered with the main
/// application loop and will receive events, update state, and be rendered on
/// the screen.
pub trait Component {
    /// Registers an action handler for the component, allowing it to send
    /// [`Action`]s for processing via the provided channel.
    ///
    /// Override this method if your component needs to emit actions to the
    /// main application loop.
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        let _ = tx;
        Ok(())
    }
    /// Registers a configuration handler, allowing the component to receive
    /// configuration settings from the application.
    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        let _ = config;
        Ok(())
    }
    /// Initializes the component with a specified area.
    ///
    /// Override this method if your component needs to perform setup or
    /// layout calculations based on its assigned rectangular area.
    fn init(&mut self, area: Rect) -> Result<()> {
        let _ = area;
        Ok(())
    }
    /// Handles incoming events and produces actions if necessary.
    fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
        let r = match event {
            Some(Event::Key(key_event)) => self.handle_key_events(key_event)?,
            Some(Event::Mouse(mouse_event)) => self.handle_mouse_events(mouse_event)?,
            _ => None,
        };
        Ok(r)
    }
    /// Handles key events and produces actions if necessary.
    #[allow(unused_variables)]
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }
    /// Handles mouse events and produces actions if necessary.
    #[allow(unused_variables)]
    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        Ok(None)
    }
    /// Updates the state of the component based on a received action.
    /// (REQUIRED)
    ///
    /// May return a follow-up action to be processed by the application.
    #[allow(unused_variables)]
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        Ok(None)
    }
    /// Renders the component on the screen. (REQUIRED)
    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}
