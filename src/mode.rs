//! The facet of the application that is currently active.
//!
//! Tandem tracks two independent life ledgers — money and time — and shows
//! exactly one of them at a time. The active facet is persisted so the app
//! reopens where the user left it, and switching facets runs a short
//! animated sweep before the new screen takes over.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{error, warn};

use crate::storage::KeyValueStore;

/// Storage key for the persisted facet.
pub const MODE_KEY: &str = "app_mode";

/// Duration of the facet-switch progress ramp.
pub const MODE_SWITCH_DURATION: Duration = Duration::from_millis(800);
/// Duration of each half of the decorative scale dip.
pub const SCALE_DIP_DURATION: Duration = Duration::from_millis(400);
/// Lowest point the scale dip reaches.
pub const SCALE_DIP_FLOOR: f64 = 0.95;
/// Pause between the post-commit navigation and the transition reset.
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Represents the two facets of the application.
#[derive(
    Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppMode {
    /// Money: accounts, budgets, the ledger.
    #[default]
    Financial,
    /// Time: routines, focus areas, the day.
    Personal,
}

impl AppMode {
    pub fn opposite(self) -> Self {
        match self {
            AppMode::Financial => AppMode::Personal,
            AppMode::Personal => AppMode::Financial,
        }
    }
}

/// Top-level screen shown for a facet. Each facet maps to exactly one route.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Route {
    #[default]
    FinancialHome,
    PersonalHome,
}

impl Route {
    pub fn for_mode(mode: AppMode) -> Self {
        match mode {
            AppMode::Financial => Route::FinancialHome,
            AppMode::Personal => Route::PersonalHome,
        }
    }
}

/// Holds the active [`AppMode`] and keeps it in sync with durable storage.
///
/// Constructed once at app start and injected where needed; nothing in here
/// is global. Failures never escape a store operation: a read problem leaves
/// the default in place, a write problem leaves the in-memory value
/// untouched. Both are logged.
pub struct ModeStore {
    storage: Arc<dyn KeyValueStore>,
    mode: AppMode,
    is_loading: bool,
    is_transitioning: bool,
}

impl ModeStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            mode: AppMode::default(),
            is_loading: true,
            is_transitioning: false,
        }
    }

    /// Adopts the persisted facet, if there is one and it parses.
    ///
    /// Anything else — absent key, unrecognized value, storage error —
    /// retains the default. Always clears `is_loading`.
    pub async fn load(&mut self) {
        match self.storage.get(MODE_KEY).await {
            Ok(Some(raw)) => match raw.parse::<AppMode>() {
                Ok(mode) => self.mode = mode,
                Err(_) => warn!(value = %raw, "ignoring unrecognized persisted mode"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read persisted mode"),
        }
        self.is_loading = false;
    }

    /// Persists `new_mode`, then updates the in-memory value.
    ///
    /// The write is awaited first: if it fails, the in-memory value does not
    /// advance, so memory and disk never disagree after a reported success.
    pub async fn set_mode(&mut self, new_mode: AppMode) {
        if let Err(e) = self.storage.set(MODE_KEY, &new_mode.to_string()).await {
            error!(error = %e, mode = %new_mode, "failed to persist mode");
            return;
        }
        self.mode = new_mode;
    }

    /// Starts a facet switch and returns the target facet.
    ///
    /// Returns `None` while a switch is already in flight — re-entrant
    /// toggles are ignored rather than racing the running animation.
    pub fn begin_toggle(&mut self) -> Option<AppMode> {
        if self.is_transitioning {
            return None;
        }
        self.is_transitioning = true;
        Some(self.mode.opposite())
    }

    /// Lands the switch: persist and adopt the target facet.
    pub async fn commit(&mut self, target: AppMode) {
        self.set_mode(target).await;
    }

    /// Clears the in-flight flag once the presentation layer has settled.
    pub fn finish_toggle(&mut self) {
        self.is_transitioning = false;
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn is_financial(&self) -> bool {
        self.mode == AppMode::Financial
    }

    pub fn is_personal(&self) -> bool {
        self.mode == AppMode::Personal
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }
}

/// Progress of the facet-switch sweep at `elapsed`, eased in and out.
///
/// Ramps 0 → 1 over [`MODE_SWITCH_DURATION`] along a cubic ease-in-out
/// curve. Pure so the overlay can sample it every frame and tests can pin
/// the endpoints without a clock.
pub fn progress_at(elapsed: Duration) -> f64 {
    let t = (elapsed.as_secs_f64() / MODE_SWITCH_DURATION.as_secs_f64()).clamp(0.0, 1.0);
    ease_in_out(t)
}

/// Decorative scale at `elapsed`: dips 1 → [`SCALE_DIP_FLOOR`] over the
/// first [`SCALE_DIP_DURATION`], then returns to 1 over the second.
pub fn scale_at(elapsed: Duration) -> f64 {
    let dip = SCALE_DIP_DURATION.as_secs_f64();
    let t = elapsed.as_secs_f64();
    if t < dip {
        1.0 - (1.0 - SCALE_DIP_FLOOR) * (t / dip)
    } else if t < 2.0 * dip {
        SCALE_DIP_FLOOR + (1.0 - SCALE_DIP_FLOOR) * ((t - dip) / dip)
    } else {
        1.0
    }
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::storage::testing::MemoryStore;

    #[tokio::test]
    async fn load_defaults_to_financial_on_empty_store() {
        let mut store = ModeStore::new(Arc::new(MemoryStore::new()));
        assert!(store.is_loading());
        store.load().await;
        assert_eq!(store.mode(), AppMode::Financial);
        assert!(store.is_financial());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn set_mode_survives_restart() {
        let storage = Arc::new(MemoryStore::new());
        for mode in [AppMode::Financial, AppMode::Personal] {
            let mut store = ModeStore::new(storage.clone());
            store.load().await;
            store.set_mode(mode).await;

            let mut reopened = ModeStore::new(storage.clone());
            reopened.load().await;
            assert_eq!(reopened.mode(), mode);
        }
    }

    #[tokio::test]
    async fn set_mode_to_current_is_a_no_op() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = ModeStore::new(storage.clone());
        store.load().await;
        store.set_mode(AppMode::Financial).await;
        let before = storage.get(MODE_KEY).await.unwrap();
        store.set_mode(AppMode::Financial).await;
        assert_eq!(store.mode(), AppMode::Financial);
        assert_eq!(storage.get(MODE_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn load_ignores_junk_persisted_value() {
        let storage = Arc::new(MemoryStore::new());
        storage.insert_raw(MODE_KEY, "sideways");
        let mut store = ModeStore::new(storage);
        store.load().await;
        assert_eq!(store.mode(), AppMode::Financial);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = ModeStore::new(storage.clone());
        store.load().await;
        storage.fail_writes(true);
        store.set_mode(AppMode::Personal).await;
        assert_eq!(store.mode(), AppMode::Financial);
        assert_eq!(storage.get(MODE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn begin_toggle_is_reentrancy_guarded() {
        let mut store = ModeStore::new(Arc::new(MemoryStore::new()));
        store.load().await;
        assert_eq!(store.begin_toggle(), Some(AppMode::Personal));
        assert!(store.is_transitioning());
        assert_eq!(store.begin_toggle(), None);
        store.commit(AppMode::Personal).await;
        store.finish_toggle();
        assert!(!store.is_transitioning());
        assert_eq!(store.mode(), AppMode::Personal);
        assert_eq!(store.begin_toggle(), Some(AppMode::Financial));
    }

    #[test]
    fn route_follows_mode() {
        assert_eq!(Route::for_mode(AppMode::Financial), Route::FinancialHome);
        assert_eq!(Route::for_mode(AppMode::Personal), Route::PersonalHome);
    }

    #[test]
    fn progress_curve_endpoints() {
        assert_eq!(progress_at(Duration::ZERO), 0.0);
        assert_eq!(progress_at(Duration::from_millis(400)), 0.5);
        assert_eq!(progress_at(MODE_SWITCH_DURATION), 1.0);
        assert_eq!(progress_at(Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn progress_curve_eases() {
        // Ease-in-out runs slow at the edges, fast through the middle.
        let early = progress_at(Duration::from_millis(100));
        let late = progress_at(Duration::from_millis(700));
        assert!(early < 0.125);
        assert!(late > 0.875);
    }

    #[test]
    fn scale_dips_and_recovers() {
        assert_eq!(scale_at(Duration::ZERO), 1.0);
        assert_eq!(scale_at(SCALE_DIP_DURATION), SCALE_DIP_FLOOR);
        assert_eq!(scale_at(Duration::from_millis(800)), 1.0);
        assert_eq!(scale_at(Duration::from_secs(2)), 1.0);
        let halfway_down = scale_at(Duration::from_millis(200));
        assert!(halfway_down < 1.0 && halfway_down > SCALE_DIP_FLOOR);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(AppMode::Financial.to_string(), "financial");
        assert_eq!("personal".parse::<AppMode>(), Ok(AppMode::Personal));
        assert!("Neither".parse::<AppMode>().is_err());
    }
}
