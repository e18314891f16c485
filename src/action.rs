//! Defines the `Action` enum, which represents all possible actions/events
//! that can occur in the application.
//!
//! This includes UI events (tick, render, resize), user commands (quit,
//! help, navigation), and domain-specific actions (facet switching, theme
//! switching, profile load/save).
//!
//! The `Action` enum is central to the application's event-driven
//! architecture.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
    mode::{AppMode, Route},
    models::Profile,
    theme::ThemeMode,
};

#[derive(Debug, Clone, PartialEq, Serialize, Display, Deserialize)]
pub enum Action {
    /// Represents a periodic tick event, typically used for UI updates.
    Tick,
    /// Represents a render event to redraw the UI.
    Render,
    /// Represents a terminal resize event with new width and height.
    Resize(u16, u16),
    /// Represents suspension of the application (e.g., for shelling out).
    Suspend,
    /// Represents resuming the application after suspension.
    Resume,
    /// Represents a request to quit the application.
    Quit,
    /// Represents a request to refresh the application's state or data.
    Refresh,
    /// Represents an error event with an associated message.
    Error(String),
    /// Represents a request to show help information.
    Help,
    /// Toggles the visibility of the help UI.
    ToggleShowHelp,
    /// Moves to the next item in a list or menu.
    NextItem,
    /// Moves to the previous item in a list or menu.
    PreviousItem,
    /// Hands the keyboard back to global keybindings.
    EnterNormal,
    /// Locks the keyboard onto the focused text input.
    EnterInsert,
    /// Switches the application into a busy/processing state.
    EnterProcessing,
    /// Exits the processing state.
    ExitProcessing,
    /// Represents an update event for the application's state.
    Update,
    /// Requests an animated switch to the opposite facet.
    ToggleMode,
    /// Sets the facet directly, with no animation.
    Mode(AppMode),
    /// A facet switch began; carries the facet being switched to.
    TransitionStarted(AppMode),
    /// The switch animation finished; persist and adopt the target facet.
    CommitMode(AppMode),
    /// The post-switch settle delay elapsed; transition state resets.
    TransitionEnded,
    /// Replaces the active screen with the one for the given route.
    Navigate(Route),
    /// Flips between the light and dark palettes.
    ToggleTheme,
    /// Sets the theme directly.
    Theme(ThemeMode),
    /// The theme changed; components should restyle.
    ThemeChanged(ThemeMode),
    /// Opens the profile onboarding form.
    StartOnboarding,
    /// The remote profile lookup finished.
    ProfileLoaded(Option<Profile>),
    /// The remote profile insert finished, successfully or not.
    ProfileSaved(bool),
}
