use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    action::Action,
    components::{
        home::Home, onboarding::Onboarding, personal::Personal, transition::TransitionOverlay,
        Component,
    },
    config::Config,
    mode::{self, AppMode, ModeStore, Route},
    models::{Profile, ProfileApi},
    storage::{FileStore, KeyValueStore},
    theme::ThemeStore,
    tui,
    utils::get_data_dir,
};

pub struct App {
    pub config: Config,
    pub tick_rate: f64,
    pub frame_rate: f64,
    pub components: Vec<Box<dyn Component>>,
    pub route: Route,
    pub mode_store: ModeStore,
    pub theme_store: ThemeStore,
    pub profile_api: Option<Arc<ProfileApi>>,
    pub should_quit: bool,
    pub should_suspend: bool,
    pub input_locked: bool,
    pub last_tick_key_events: Vec<KeyEvent>,
    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(tick_rate: f64, frame_rate: f64) -> Result<Self> {
        let config = Config::new()?;
        let storage: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::new(get_data_dir().join("settings.json")));
        Self::with_storage(config, tick_rate, frame_rate, storage)
    }

    /// Builds the app around an explicit storage backend. This is the
    /// composition root: the stores are constructed here and nowhere else.
    pub fn with_storage(
        config: Config,
        tick_rate: f64,
        frame_rate: f64,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let profile_api = ProfileApi::from_config(&config.config.profile_service).map(Arc::new);
        let onboarding = Onboarding::new(
            profile_api.clone(),
            config.config.profile_service.user_id.clone(),
        );
        Ok(Self {
            components: vec![
                Box::new(Home::new()),
                Box::new(Personal::new()),
                Box::new(onboarding),
                Box::new(TransitionOverlay::new()),
            ],
            route: Route::default(),
            mode_store: ModeStore::new(storage.clone()),
            theme_store: ThemeStore::new(storage),
            profile_api,
            config,
            tick_rate,
            frame_rate,
            should_quit: false,
            should_suspend: false,
            input_locked: false,
            last_tick_key_events: Vec::new(),
            action_tx,
            action_rx,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        self.mode_store.load().await;
        self.theme_store.load().await;
        self.route = Route::for_mode(self.mode_store.mode());

        let mut tui = tui::Tui::new()?;
        tui.tick_rate(self.tick_rate);
        tui.frame_rate(self.frame_rate);
        tui.enter()?;

        for component in self.components.iter_mut() {
            component.register_action_handler(self.action_tx.clone())?;
            component.register_config_handler(self.config.clone())?;
            component.init(tui.size()?)?;
        }

        self.action_tx
            .send(Action::ThemeChanged(self.theme_store.theme()))?;
        self.action_tx.send(Action::Navigate(self.route))?;
        self.fetch_profile();

        loop {
            if let Some(e) = tui.next().await {
                match e {
                    tui::Event::Quit => self.action_tx.send(Action::Quit)?,
                    tui::Event::Tick => self.action_tx.send(Action::Tick)?,
                    tui::Event::Render => self.action_tx.send(Action::Render)?,
                    tui::Event::Resize(x, y) => self.action_tx.send(Action::Resize(x, y))?,
                    tui::Event::Key(key) => self.handle_key_event(key)?,
                    _ => {}
                }
                for component in self.components.iter_mut() {
                    if let Some(action) = component.handle_events(Some(e.clone()))? {
                        self.action_tx.send(action)?;
                    }
                }
            }

            loop {
                let Ok(action) = self.action_rx.try_recv() else {
                    break;
                };
                match action {
                    Action::Render => self.draw(&mut tui)?,
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.draw(&mut tui)?;
                    }
                    action => {
                        if action != Action::Tick {
                            debug!("{action:?}");
                        }
                        self.update(action).await?;
                    }
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                self.action_tx.send(Action::Resume)?;
                tui = tui::Tui::new()?;
                tui.tick_rate(self.tick_rate);
                tui.frame_rate(self.frame_rate);
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.input_locked {
            // A text input owns the keyboard; components still see the raw
            // event through handle_events. Keep the escape hatch.
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                self.action_tx.send(Action::Quit)?;
            }
            return Ok(());
        }
        let Some(keymap) = self.config.keybindings.get(&self.mode_store.mode()) else {
            return Ok(());
        };
        match keymap.get(&vec![key]) {
            Some(action) => {
                info!("Got action: {action:?}");
                self.action_tx.send(action.clone())?;
            }
            _ => {
                // Possibly a multi-key combination
                self.last_tick_key_events.push(key);
                if let Some(action) = keymap.get(&self.last_tick_key_events) {
                    info!("Got action: {action:?}");
                    self.action_tx.send(action.clone())?;
                }
            }
        }
        Ok(())
    }

    async fn update(&mut self, action: Action) -> Result<()> {
        match &action {
            Action::Tick => {
                self.last_tick_key_events.drain(..);
            }
            Action::Quit => self.should_quit = true,
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::EnterInsert => self.input_locked = true,
            Action::EnterNormal => self.input_locked = false,
            Action::ToggleMode => self.start_mode_switch(),
            Action::CommitMode(target) => self.commit_mode_switch(*target).await?,
            Action::TransitionEnded => self.mode_store.finish_toggle(),
            Action::Mode(new_mode) => {
                self.mode_store.set_mode(*new_mode).await;
                let route = Route::for_mode(self.mode_store.mode());
                if route != self.route {
                    self.action_tx.send(Action::Navigate(route))?;
                }
            }
            Action::Navigate(route) => {
                info!(route = %route, "navigating");
                self.route = *route;
            }
            Action::ToggleTheme => {
                let theme = self.theme_store.toggle().await;
                self.action_tx.send(Action::ThemeChanged(theme))?;
            }
            Action::Theme(theme) => {
                self.theme_store.set_theme(*theme).await;
                self.action_tx
                    .send(Action::ThemeChanged(self.theme_store.theme()))?;
            }
            Action::ProfileLoaded(profile) => self.apply_profile(profile.clone())?,
            Action::ProfileSaved(saved) => {
                if *saved {
                    info!("profile saved");
                } else {
                    warn!("profile save failed");
                }
            }
            Action::Error(msg) => warn!(message = %msg, "error action"),
            _ => {}
        }
        for component in self.components.iter_mut() {
            if let Some(follow_up) = component.update(action.clone())? {
                self.action_tx.send(follow_up)?
            };
        }
        Ok(())
    }

    /// Kicks off the animated facet switch, in the fixed order: mark the
    /// transition in flight, let the sweep run its course, then commit.
    /// A toggle while one is already running is dropped.
    fn start_mode_switch(&mut self) {
        let Some(target) = self.mode_store.begin_toggle() else {
            debug!("facet switch already in flight, ignoring toggle");
            return;
        };
        info!(target = %target, "starting facet switch");
        let _ = self.action_tx.send(Action::TransitionStarted(target));
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(mode::MODE_SWITCH_DURATION).await;
            let _ = tx.send(Action::CommitMode(target));
        });
    }

    /// Lands the switch: persist the target facet, replace the route, then
    /// schedule the settle delay after which the transition state resets.
    async fn commit_mode_switch(&mut self, target: AppMode) -> Result<()> {
        self.mode_store.commit(target).await;
        self.action_tx
            .send(Action::Navigate(Route::for_mode(target)))?;
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(mode::SETTLE_DELAY).await;
            let _ = tx.send(Action::TransitionEnded);
        });
        Ok(())
    }

    fn fetch_profile(&mut self) {
        let Some(api) = self.profile_api.clone() else {
            return;
        };
        let Some(user_id) = self.config.config.profile_service.user_id.clone() else {
            return;
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let profile = api.get_profile(&user_id).await;
            let _ = tx.send(Action::ProfileLoaded(profile));
        });
    }

    fn apply_profile(&mut self, profile: Option<Profile>) -> Result<()> {
        let Some(profile) = profile else {
            info!("no remote profile, opening onboarding");
            self.action_tx.send(Action::StartOnboarding)?;
            return Ok(());
        };
        if !profile.has_completed_onboarding {
            self.action_tx.send(Action::StartOnboarding)?;
        }
        if let Some(preferred) = profile.preferred_mode.as_app_mode() {
            if preferred != self.mode_store.mode() && !self.mode_store.is_transitioning() {
                self.action_tx.send(Action::Mode(preferred))?;
            }
        }
        Ok(())
    }

    fn draw(&mut self, tui: &mut tui::Tui) -> Result<()> {
        tui.draw(|f| {
            for component in self.components.iter_mut() {
                let r = component.draw(f, f.size());
                if let Err(e) = r {
                    self.action_tx
                        .send(Action::Error(format!("Failed to draw: {:?}", e)))
                        .unwrap();
                }
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mode::MODE_KEY;
    use crate::storage::testing::MemoryStore;
    use crate::theme::{ThemeMode, THEME_KEY};

    fn test_app(storage: Arc<MemoryStore>) -> App {
        App::with_storage(Config::default(), 4.0, 60.0, storage).unwrap()
    }

    async fn next_action(app: &mut App) -> Action {
        tokio::time::timeout(Duration::from_secs(5), app.action_rx.recv())
            .await
            .expect("timed out waiting for action")
            .expect("action channel closed")
    }

    /// Drives queued actions through the app until the transition settles.
    async fn settle_transition(app: &mut App) -> (usize, usize) {
        let mut navigations = 0;
        let mut commits = 0;
        let mut guard = 0;
        while app.mode_store.is_transitioning() {
            let action = next_action(app).await;
            match action {
                Action::Navigate(_) => navigations += 1,
                Action::CommitMode(_) => commits += 1,
                _ => {}
            }
            app.update(action).await.unwrap();
            guard += 1;
            assert!(guard < 32, "transition did not settle");
        }
        (navigations, commits)
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_lands_on_opposite_facet_with_one_navigation() {
        let storage = Arc::new(MemoryStore::new());
        let mut app = test_app(storage.clone());
        app.mode_store.load().await;
        app.theme_store.load().await;
        assert_eq!(app.mode_store.mode(), AppMode::Financial);

        app.update(Action::ToggleMode).await.unwrap();
        assert!(app.mode_store.is_transitioning());

        let (navigations, _) = settle_transition(&mut app).await;

        assert_eq!(app.mode_store.mode(), AppMode::Personal);
        assert!(!app.mode_store.is_transitioning());
        assert_eq!(navigations, 1);
        assert_eq!(app.route, Route::PersonalHome);
        assert_eq!(
            storage.get(MODE_KEY).await.unwrap().as_deref(),
            Some("personal")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reentrant_toggle_is_dropped() {
        let storage = Arc::new(MemoryStore::new());
        let mut app = test_app(storage);
        app.mode_store.load().await;

        app.update(Action::ToggleMode).await.unwrap();
        app.update(Action::ToggleMode).await.unwrap();

        let (navigations, commits) = settle_transition(&mut app).await;
        assert_eq!(commits, 1);
        assert_eq!(navigations, 1);
        assert_eq!(app.mode_store.mode(), AppMode::Personal);
    }

    #[tokio::test]
    async fn toggle_theme_persists_and_broadcasts() {
        let storage = Arc::new(MemoryStore::new());
        let mut app = test_app(storage.clone());
        app.theme_store.load().await;

        app.update(Action::ToggleTheme).await.unwrap();
        assert_eq!(app.theme_store.theme(), ThemeMode::Light);
        assert_eq!(
            storage.get(THEME_KEY).await.unwrap().as_deref(),
            Some("light")
        );
        assert_eq!(
            next_action(&mut app).await,
            Action::ThemeChanged(ThemeMode::Light)
        );
    }

    #[tokio::test]
    async fn missing_profile_opens_onboarding() {
        let storage = Arc::new(MemoryStore::new());
        let mut app = test_app(storage);
        app.update(Action::ProfileLoaded(None)).await.unwrap();
        assert_eq!(next_action(&mut app).await, Action::StartOnboarding);
    }

    #[tokio::test]
    async fn direct_mode_set_navigates_without_transition() {
        let storage = Arc::new(MemoryStore::new());
        let mut app = test_app(storage.clone());
        app.mode_store.load().await;

        app.update(Action::Mode(AppMode::Personal)).await.unwrap();
        assert!(!app.mode_store.is_transitioning());
        let action = next_action(&mut app).await;
        assert_eq!(action, Action::Navigate(Route::PersonalHome));
        app.update(action).await.unwrap();
        assert_eq!(app.route, Route::PersonalHome);
        assert_eq!(
            storage.get(MODE_KEY).await.unwrap().as_deref(),
            Some("personal")
        );
    }
}
