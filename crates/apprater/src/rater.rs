//! The prompt orchestrator.
//!
//! [`AppRater`] ties a [`LaunchTracker`] to a [`ConfirmationSurface`], a
//! [`StoreNavigator`], and an optional [`PromptListener`]. Hosts call
//! [`on_application_start`](AppRater::on_application_start) once per cold
//! start and nothing else.
//!
//! ```text
//!            predicate true
//!   Idle ───────────────────▶ Prompting
//!    ▲                            │
//!    └── accept/defer/decline ────┘
//!        (or cancelled)
//! ```
//!
//! Hosts with their own event loop drive the two halves separately:
//! [`check_launch`](AppRater::check_launch) returns the request to show, and
//! [`resolve`](AppRater::resolve) applies the user's answer later.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RaterConfig;
use crate::listener::{NoopListener, PromptListener};
use crate::navigator::{FallbackNavigator, NavigationOutcome, StoreNavigator};
use crate::prompt::{ConfirmationSurface, PromptAction, PromptRequest};
use crate::store::PreferenceStore;
use crate::tracker::LaunchTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptState {
    Idle,
    Prompting,
}

/// What an answered prompt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub action: PromptAction,
    /// Set only for [`PromptAction::Accept`].
    pub navigation: Option<NavigationOutcome>,
}

/// Result of [`AppRater::on_application_start`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// Launch recorded; the prompt is not due.
    NotDue,
    /// Launch recorded while an earlier prompt is still open.
    AlreadyPrompting,
    /// The prompt was shown and answered.
    Resolved(Resolution),
}

pub struct AppRater<S> {
    tracker: LaunchTracker<S>,
    config: RaterConfig,
    navigator: Box<dyn StoreNavigator>,
    listener: Box<dyn PromptListener>,
    state: PromptState,
}

impl<S: PreferenceStore> AppRater<S> {
    /// Orchestrator using the platform store navigator and no listener.
    pub fn new(tracker: LaunchTracker<S>, config: RaterConfig) -> Self {
        let navigator = FallbackNavigator::new(config.store_links.clone());
        Self {
            tracker,
            config,
            navigator: Box::new(navigator),
            listener: Box::new(NoopListener),
            state: PromptState::Idle,
        }
    }

    pub fn with_navigator(mut self, navigator: impl StoreNavigator + 'static) -> Self {
        self.navigator = Box::new(navigator);
        self
    }

    pub fn with_listener(mut self, listener: Box<dyn PromptListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn tracker(&self) -> &LaunchTracker<S> {
        &self.tracker
    }

    pub fn into_tracker(self) -> LaunchTracker<S> {
        self.tracker
    }

    pub fn config(&self) -> &RaterConfig {
        &self.config
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    /// The tracker predicate evaluated with the configured thresholds.
    pub fn should_prompt(&self) -> Result<bool, String> {
        self.tracker
            .should_prompt(self.config.days_until_prompt, self.config.launches_until_prompt)
    }

    /// Record a launch and, if the prompt is due, enter `Prompting` and
    /// return the request to show.
    ///
    /// A launch seen while a prompt is already open is still counted, but
    /// never yields a second request.
    pub fn check_launch(&mut self) -> Result<Option<PromptRequest>, String> {
        self.tracker.record_launch()?;

        if self.state == PromptState::Prompting {
            warn!("launch recorded while a rating prompt is still open");
            return Ok(None);
        }
        if !self.should_prompt()? {
            debug!("rating prompt not due");
            return Ok(None);
        }

        info!(app_id = %self.config.app_id, "rating prompt due");
        self.state = PromptState::Prompting;
        Ok(Some(self.config.prompt.clone()))
    }

    /// Enter `Prompting` regardless of the predicate (e.g. a "Rate this app"
    /// menu item). Fails if a prompt is already open.
    pub fn request_prompt(&mut self) -> Result<PromptRequest, String> {
        if self.state == PromptState::Prompting {
            return Err("a rating prompt is already open".to_string());
        }
        self.state = PromptState::Prompting;
        Ok(self.config.prompt.clone())
    }

    /// Apply the user's answer to the open prompt and return to `Idle`.
    ///
    /// Tracker state is updated before the listener runs. On accept the
    /// prompt is dismissed for good *before* the store hand-off, so a failed
    /// hand-off still never asks again.
    pub fn resolve(&mut self, action: PromptAction) -> Result<Resolution, String> {
        if self.state != PromptState::Prompting {
            return Err("no rating prompt is open".to_string());
        }
        self.state = PromptState::Idle;

        let navigation = match action {
            PromptAction::Accept => {
                self.tracker.dismiss_permanently()?;
                Some(self.navigator.open_listing(&self.config.app_id))
            }
            PromptAction::Defer => {
                self.tracker.reset()?;
                None
            }
            PromptAction::Decline => {
                self.tracker.dismiss_permanently()?;
                None
            }
            PromptAction::Cancelled => {
                debug!("rating prompt cancelled");
                return Ok(Resolution {
                    action,
                    navigation: None,
                });
            }
        };

        self.listener.on_action(action);
        Ok(Resolution { action, navigation })
    }

    /// Hand-off to the store without showing a prompt: dismiss for good, then
    /// open the listing. The listener is not involved.
    pub fn rate_app(&mut self) -> Result<NavigationOutcome, String> {
        self.tracker.dismiss_permanently()?;
        Ok(self.navigator.open_listing(&self.config.app_id))
    }

    /// The per-cold-start entry point: record the launch, and if the prompt
    /// is due show it on `surface` and apply the answer.
    pub fn on_application_start(
        &mut self,
        surface: &mut dyn ConfirmationSurface,
    ) -> Result<LaunchOutcome, String> {
        let was_prompting = self.state == PromptState::Prompting;
        let Some(request) = self.check_launch()? else {
            return Ok(if was_prompting {
                LaunchOutcome::AlreadyPrompting
            } else {
                LaunchOutcome::NotDue
            });
        };
        self.present(surface, &request).map(LaunchOutcome::Resolved)
    }

    /// Show the prompt now, whatever the predicate says.
    pub fn show_prompt(
        &mut self,
        surface: &mut dyn ConfirmationSurface,
    ) -> Result<Resolution, String> {
        let request = self.request_prompt()?;
        self.present(surface, &request)
    }

    fn present(
        &mut self,
        surface: &mut dyn ConfirmationSurface,
        request: &PromptRequest,
    ) -> Result<Resolution, String> {
        match surface.present(request) {
            Ok(action) => self.resolve(action),
            Err(e) => {
                // Close the prompt; the tracker is untouched.
                self.state = PromptState::Idle;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    const T0: i64 = 1_700_000_000_000;

    /// Surface that answers from a script and counts how often it was shown.
    struct ScriptedSurface {
        answers: VecDeque<Result<PromptAction, String>>,
        shown: usize,
    }

    impl ScriptedSurface {
        fn new(answers: impl IntoIterator<Item = PromptAction>) -> Self {
            Self {
                answers: answers.into_iter().map(Ok).collect(),
                shown: 0,
            }
        }

        fn failing() -> Self {
            Self {
                answers: VecDeque::from([Err("terminal lost".to_string())]),
                shown: 0,
            }
        }
    }

    impl ConfirmationSurface for ScriptedSurface {
        fn present(&mut self, _request: &PromptRequest) -> Result<PromptAction, String> {
            self.shown += 1;
            self.answers
                .pop_front()
                .unwrap_or_else(|| Err("no scripted answer".to_string()))
        }
    }

    struct FakeNavigator {
        outcome: NavigationOutcome,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl StoreNavigator for FakeNavigator {
        fn open_listing(&self, app_id: &str) -> NavigationOutcome {
            self.calls.borrow_mut().push(app_id.to_string());
            self.outcome.clone()
        }
    }

    fn build_rater(
        config: RaterConfig,
        outcome: NavigationOutcome,
    ) -> (AppRater<MemoryStore>, ManualClock, Rc<RefCell<Vec<String>>>) {
        let clock = ManualClock::new(T0);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let tracker = LaunchTracker::with_clock(MemoryStore::new(), clock.clone());
        let rater = AppRater::new(tracker, config).with_navigator(FakeNavigator {
            outcome,
            calls: calls.clone(),
        });
        (rater, clock, calls)
    }

    fn quick_config() -> RaterConfig {
        RaterConfig::new("com.example.notes")
            .with_days_until_prompt(0)
            .with_launches_until_prompt(3)
    }

    fn store_outcome() -> NavigationOutcome {
        NavigationOutcome::StoreApp("market://details?id=com.example.notes".into())
    }

    #[test]
    fn prompt_due_on_third_launch() {
        let (mut rater, _, _) = build_rater(quick_config(), store_outcome());
        let mut surface = ScriptedSurface::new([PromptAction::Defer]);

        assert_eq!(rater.on_application_start(&mut surface).unwrap(), LaunchOutcome::NotDue);
        assert_eq!(rater.on_application_start(&mut surface).unwrap(), LaunchOutcome::NotDue);
        assert_eq!(surface.shown, 0);

        let outcome = rater.on_application_start(&mut surface).unwrap();
        assert_eq!(surface.shown, 1);
        assert_eq!(
            outcome,
            LaunchOutcome::Resolved(Resolution {
                action: PromptAction::Defer,
                navigation: None,
            })
        );
        assert_eq!(rater.state(), PromptState::Idle);
    }

    #[test]
    fn accept_navigates_and_dismisses() {
        let (mut rater, _, calls) = build_rater(quick_config(), store_outcome());
        let mut surface = ScriptedSurface::new([PromptAction::Accept]);
        for _ in 0..3 {
            rater.on_application_start(&mut surface).unwrap();
        }

        assert_eq!(calls.borrow().as_slice(), ["com.example.notes"]);
        assert!(rater.tracker().is_dismissed_permanently().unwrap());

        for _ in 0..20 {
            assert_eq!(rater.on_application_start(&mut surface).unwrap(), LaunchOutcome::NotDue);
        }
        assert_eq!(surface.shown, 1);
    }

    #[test]
    fn failed_navigation_still_dismisses() {
        let (mut rater, _, calls) = build_rater(quick_config(), NavigationOutcome::Unavailable);
        let mut surface = ScriptedSurface::new([PromptAction::Accept]);
        for _ in 0..3 {
            rater.on_application_start(&mut surface).unwrap();
        }
        assert_eq!(calls.borrow().len(), 1);
        assert!(rater.tracker().is_dismissed_permanently().unwrap());
        assert!(!rater.should_prompt().unwrap());
    }

    #[test]
    fn defer_restarts_the_cycle() {
        let (mut rater, clock, _) = build_rater(quick_config(), store_outcome());
        let mut surface = ScriptedSurface::new([PromptAction::Defer, PromptAction::Decline]);
        for _ in 0..3 {
            rater.on_application_start(&mut surface).unwrap();
        }
        clock.advance_days(1);

        // The reset happened at T0; the next prompt needs three new launches.
        assert_eq!(rater.tracker().launch_count().unwrap(), 0);
        assert_eq!(rater.tracker().first_launch_millis().unwrap(), T0);
        assert!(!rater.tracker().is_dismissed_permanently().unwrap());

        rater.on_application_start(&mut surface).unwrap();
        rater.on_application_start(&mut surface).unwrap();
        assert_eq!(surface.shown, 1);
        let outcome = rater.on_application_start(&mut surface).unwrap();
        assert_eq!(surface.shown, 2);
        assert!(matches!(
            outcome,
            LaunchOutcome::Resolved(Resolution {
                action: PromptAction::Decline,
                ..
            })
        ));
        assert!(rater.tracker().is_dismissed_permanently().unwrap());
    }

    #[test]
    fn cancel_changes_nothing_and_reprompts() {
        let (mut rater, _, calls) = build_rater(quick_config(), store_outcome());
        let heard = Rc::new(Cell::new(0));
        let counter = heard.clone();
        rater = rater.with_listener(Box::new(crate::listener::FnListener::new(move |_| {
            counter.set(counter.get() + 1)
        })));

        let mut surface = ScriptedSurface::new([PromptAction::Cancelled, PromptAction::Cancelled]);
        for _ in 0..3 {
            rater.on_application_start(&mut surface).unwrap();
        }
        let before = rater.tracker().record().unwrap();
        assert_eq!(before.launch_count, 3);
        assert!(!before.do_not_show_again);

        // Still due on the very next launch.
        rater.on_application_start(&mut surface).unwrap();
        assert_eq!(surface.shown, 2);
        assert_eq!(heard.get(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn listener_sees_updated_state() {
        /// Store shared between the rater and the listener.
        #[derive(Clone, Default)]
        struct SharedStore(Rc<RefCell<MemoryStore>>);

        impl PreferenceStore for SharedStore {
            fn get(&self, key: &str) -> Result<Option<serde_json::Value>, String> {
                self.0.borrow().get(key)
            }
            fn put(&mut self, key: &str, value: serde_json::Value) -> Result<(), String> {
                self.0.borrow_mut().put(key, value)
            }
        }

        struct Probe {
            store: SharedStore,
            seen: Rc<RefCell<Vec<(PromptAction, crate::tracker::LaunchRecord)>>>,
        }

        impl PromptListener for Probe {
            fn on_action(&self, action: PromptAction) {
                let tracker = LaunchTracker::with_clock(self.store.clone(), ManualClock::new(0));
                self.seen
                    .borrow_mut()
                    .push((action, tracker.record().unwrap()));
            }
        }

        let store = SharedStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let clock = ManualClock::new(T0);
        let mut rater = AppRater::new(
            LaunchTracker::with_clock(store.clone(), clock.clone()),
            quick_config(),
        )
        .with_navigator(FakeNavigator {
            outcome: store_outcome(),
            calls: Rc::new(RefCell::new(Vec::new())),
        })
        .with_listener(Box::new(Probe {
            store: store.clone(),
            seen: seen.clone(),
        }));

        let mut surface = ScriptedSurface::new([PromptAction::Defer, PromptAction::Accept]);
        for _ in 0..6 {
            rater.on_application_start(&mut surface).unwrap();
        }

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, PromptAction::Defer);
        assert_eq!(seen[0].1.launch_count, 0);
        assert_eq!(seen[1].0, PromptAction::Accept);
        assert!(seen[1].1.do_not_show_again);
    }

    #[test]
    fn dismissal_precedes_navigation() {
        #[derive(Clone, Default)]
        struct SharedStore(Rc<RefCell<MemoryStore>>);

        impl PreferenceStore for SharedStore {
            fn get(&self, key: &str) -> Result<Option<serde_json::Value>, String> {
                self.0.borrow().get(key)
            }
            fn put(&mut self, key: &str, value: serde_json::Value) -> Result<(), String> {
                self.0.borrow_mut().put(key, value)
            }
        }

        struct CheckingNavigator {
            store: SharedStore,
            flag_at_call: Rc<Cell<Option<bool>>>,
        }

        impl StoreNavigator for CheckingNavigator {
            fn open_listing(&self, _app_id: &str) -> NavigationOutcome {
                let tracker = LaunchTracker::with_clock(self.store.clone(), ManualClock::new(0));
                self.flag_at_call
                    .set(Some(tracker.is_dismissed_permanently().unwrap()));
                NavigationOutcome::Unavailable
            }
        }

        let store = SharedStore::default();
        let flag = Rc::new(Cell::new(None));
        let mut rater = AppRater::new(
            LaunchTracker::with_clock(store.clone(), ManualClock::new(T0)),
            quick_config(),
        )
        .with_navigator(CheckingNavigator {
            store: store.clone(),
            flag_at_call: flag.clone(),
        });

        rater.request_prompt().unwrap();
        rater.resolve(PromptAction::Accept).unwrap();
        assert_eq!(flag.get(), Some(true));
    }

    #[test]
    fn day_threshold_gates_prompt() {
        let config = RaterConfig::new("a.b")
            .with_days_until_prompt(3)
            .with_launches_until_prompt(0);
        let (mut rater, clock, _) = build_rater(config, store_outcome());
        let mut surface = ScriptedSurface::new([PromptAction::Decline]);

        rater.on_application_start(&mut surface).unwrap();
        clock.advance_days(2);
        rater.on_application_start(&mut surface).unwrap();
        assert_eq!(surface.shown, 0);

        clock.advance_days(1);
        rater.on_application_start(&mut surface).unwrap();
        assert_eq!(surface.shown, 1);
    }

    #[test]
    fn two_phase_api() {
        let (mut rater, _, _) = build_rater(quick_config(), store_outcome());
        assert!(rater.check_launch().unwrap().is_none());
        assert!(rater.check_launch().unwrap().is_none());
        let request = rater.check_launch().unwrap().unwrap();
        assert_eq!(request, rater.config().prompt);
        assert_eq!(rater.state(), PromptState::Prompting);

        // Another launch while the prompt is open: counted, no second prompt.
        assert!(rater.check_launch().unwrap().is_none());
        assert_eq!(rater.tracker().launch_count().unwrap(), 4);
        assert!(rater.request_prompt().is_err());

        let resolution = rater.resolve(PromptAction::Decline).unwrap();
        assert_eq!(resolution.navigation, None);
        assert_eq!(rater.state(), PromptState::Idle);
        assert!(rater.resolve(PromptAction::Decline).is_err());
    }

    #[test]
    fn launch_while_prompting_reports_already_prompting() {
        let (mut rater, _, _) = build_rater(quick_config().with_launches_until_prompt(0), store_outcome());
        rater.request_prompt().unwrap();
        let mut surface = ScriptedSurface::new(std::iter::empty());
        assert_eq!(
            rater.on_application_start(&mut surface).unwrap(),
            LaunchOutcome::AlreadyPrompting
        );
        assert_eq!(surface.shown, 0);
    }

    #[test]
    fn show_prompt_ignores_predicate() {
        let (mut rater, _, calls) = build_rater(quick_config(), store_outcome());
        let mut surface = ScriptedSurface::new([PromptAction::Accept]);
        let resolution = rater.show_prompt(&mut surface).unwrap();
        assert_eq!(resolution.navigation, Some(store_outcome()));
        assert_eq!(calls.borrow().len(), 1);
        // No launch was recorded.
        assert_eq!(rater.tracker().launch_count().unwrap(), 0);
    }

    #[test]
    fn surface_error_returns_to_idle() {
        let (mut rater, _, _) = build_rater(quick_config(), store_outcome());
        let mut surface = ScriptedSurface::failing();
        let err = rater.show_prompt(&mut surface).unwrap_err();
        assert_eq!(err, "terminal lost");
        assert_eq!(rater.state(), PromptState::Idle);
        assert!(!rater.tracker().is_dismissed_permanently().unwrap());
    }

    #[test]
    fn rate_app_dismisses_then_navigates() {
        let (mut rater, _, calls) = build_rater(quick_config(), NavigationOutcome::Unavailable);
        assert_eq!(rater.rate_app().unwrap(), NavigationOutcome::Unavailable);
        assert_eq!(calls.borrow().len(), 1);
        assert!(rater.tracker().is_dismissed_permanently().unwrap());
    }
}
