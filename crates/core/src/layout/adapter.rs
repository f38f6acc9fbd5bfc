//! Layout adapter
//!
//! Turns a stream of [`LayoutSuggestion`]s into a gradually applied layout.
//! A differing suggestion shows the adaptation notice, waits the transition
//! delay and then applies sidebar position, density and primary widgets in one
//! step. A newer suggestion arriving during the delay supersedes the pending
//! one. The collapsed flag is only ever changed by [`LayoutAdapter::toggle_sidebar`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wayfare_domain::{LayoutConfig, LayoutSuggestion, Result, WayfareError};

use super::state::{AdaptationPhase, AppliedLayout, LayoutView, ThemeMode};
use crate::behavior::events::{BehaviorEvent, SubscriptionId};
use crate::behavior::BehaviorRecorder;

struct AdapterState {
    view: LayoutView,
    /// Incremented for every scheduled transition
    generation: u64,
    pending: Option<CancellationToken>,
}

struct AdapterInner {
    state: Mutex<AdapterState>,
    updates: watch::Sender<LayoutView>,
    config: LayoutConfig,
    runtime: Handle,
    shutdown: CancellationToken,
}

/// Consumer of layout suggestions; sole writer of its layout state
#[derive(Clone)]
pub struct LayoutAdapter {
    inner: Arc<AdapterInner>,
}

impl LayoutAdapter {
    /// Create an adapter showing `initial`.
    ///
    /// # Errors
    ///
    /// Returns `WayfareError::Unavailable` when called outside a Tokio
    /// runtime; timers are spawned on the runtime captured here.
    pub fn new(initial: AppliedLayout, config: LayoutConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|err| WayfareError::Unavailable(format!("layout adapter needs a runtime: {err}")))?;

        let view = LayoutView { layout: initial, ..LayoutView::default() };
        let (updates, _) = watch::channel(view.clone());

        Ok(Self {
            inner: Arc::new(AdapterInner {
                state: Mutex::new(AdapterState { view, generation: 0, pending: None }),
                updates,
                config,
                runtime,
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Feed a suggestion.
    ///
    /// Returns `true` when a transition was scheduled. A non-`auto` color
    /// scheme switches the theme immediately either way.
    pub fn propose(&self, suggestion: LayoutSuggestion) -> bool {
        if self.inner.shutdown.is_cancelled() {
            return false;
        }

        let (generation, token) = {
            let mut state = self.inner.state.lock();
            let mut changed = false;

            if let Some(theme) = ThemeMode::from_suggestion(suggestion.color_scheme) {
                if state.view.theme != theme {
                    info!(?theme, "Theme switched from suggestion");
                    state.view.theme = theme;
                    changed = true;
                }
            }

            if let Some(previous) = state.pending.take() {
                debug!(generation = state.generation, "Pending layout transition superseded");
                previous.cancel();
            }

            if !state.view.layout.differs_from(&suggestion) {
                if state.view.phase != AdaptationPhase::Idle {
                    state.view.phase = AdaptationPhase::Idle;
                    changed = true;
                }
                if changed {
                    self.inner.publish(&state.view);
                }
                return false;
            }

            state.generation += 1;
            let token = self.inner.shutdown.child_token();
            state.pending = Some(token.clone());
            state.view.phase = AdaptationPhase::Pending;
            state.view.notice_visible = true;
            self.inner.publish(&state.view);
            (state.generation, token)
        };

        debug!(generation, "Layout transition scheduled");
        self.spawn_transition(generation, suggestion, token);
        self.spawn_notice_hide();
        true
    }

    /// Flip collapsed/expanded immediately.
    pub fn toggle_sidebar(&self) -> bool {
        let mut state = self.inner.state.lock();
        state.view.layout.collapsed = !state.view.layout.collapsed;
        self.inner.publish(&state.view);
        state.view.layout.collapsed
    }

    /// Hide the adaptation notice now.
    pub fn dismiss_notice(&self) {
        let mut state = self.inner.state.lock();
        if state.view.notice_visible {
            state.view.notice_visible = false;
            self.inner.publish(&state.view);
        }
    }

    /// Feed every analysis published by `recorder` into this adapter.
    pub fn attach(&self, recorder: &BehaviorRecorder) -> SubscriptionId {
        let adapter = self.clone();
        recorder.subscribe(BehaviorEvent::PatternsUpdated, move |analysis| {
            adapter.propose(analysis.suggested_layout.clone());
        })
    }

    /// Stop listening to `recorder`.
    pub fn detach(&self, recorder: &BehaviorRecorder, id: SubscriptionId) -> bool {
        recorder.unsubscribe(BehaviorEvent::PatternsUpdated, id)
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<LayoutView> {
        self.inner.updates.subscribe()
    }

    /// Current view, the same value the watch channel last published
    #[must_use]
    pub fn view(&self) -> LayoutView {
        self.inner.state.lock().view.clone()
    }

    #[must_use]
    pub fn layout(&self) -> AppliedLayout {
        self.inner.state.lock().view.layout.clone()
    }

    #[must_use]
    pub fn theme(&self) -> ThemeMode {
        self.inner.state.lock().view.theme
    }

    #[must_use]
    pub fn phase(&self) -> AdaptationPhase {
        self.inner.state.lock().view.phase
    }

    #[must_use]
    pub fn is_notice_visible(&self) -> bool {
        self.inner.state.lock().view.notice_visible
    }

    /// Cancel the pending transition and all notice timers, hiding the
    /// notice. Later suggestions are ignored.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let mut state = self.inner.state.lock();
        state.pending = None;
        state.view.phase = AdaptationPhase::Idle;
        state.view.notice_visible = false;
        self.inner.publish(&state.view);
    }

    fn spawn_transition(
        &self,
        generation: u64,
        suggestion: LayoutSuggestion,
        token: CancellationToken,
    ) {
        let inner = Arc::clone(&self.inner);
        let delay = self.inner.config.transition_delay();
        self.inner.runtime.spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            if !inner.begin_apply(generation) {
                return;
            }
            // Observers see `Applying` before the fields change
            tokio::task::yield_now().await;
            inner.finish_apply(generation, &suggestion);
        });
    }

    // Not cancelled by newer suggestions: the notice hides a fixed time after
    // it was shown.
    fn spawn_notice_hide(&self) {
        let inner = Arc::clone(&self.inner);
        let duration = self.inner.config.notice_duration();
        let shutdown = self.inner.shutdown.clone();
        self.inner.runtime.spawn(async move {
            tokio::select! {
                () = shutdown.cancelled() => {}
                () = tokio::time::sleep(duration) => {
                    let mut state = inner.state.lock();
                    if state.view.notice_visible {
                        state.view.notice_visible = false;
                        inner.publish(&state.view);
                    }
                }
            }
        });
    }
}

impl AdapterInner {
    fn is_current(state: &AdapterState, generation: u64) -> bool {
        state.generation == generation
            && state.pending.as_ref().is_some_and(|token| !token.is_cancelled())
    }

    fn begin_apply(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if !Self::is_current(&state, generation) {
            return false;
        }
        state.view.phase = AdaptationPhase::Applying;
        self.publish(&state.view);
        true
    }

    fn finish_apply(&self, generation: u64, suggestion: &LayoutSuggestion) {
        let mut state = self.state.lock();
        if !Self::is_current(&state, generation) {
            return;
        }

        state.pending = None;
        state.view.layout.adopt(suggestion);
        state.view.adaptations += 1;
        state.view.phase = AdaptationPhase::Idle;
        self.publish(&state.view);

        info!(
            generation,
            sidebar = %suggestion.sidebar_position,
            density = %suggestion.density,
            widgets = suggestion.primary_widgets.len(),
            "Layout adapted"
        );
    }

    fn publish(&self, view: &LayoutView) {
        self.updates.send_replace(view.clone());
    }
}

impl std::fmt::Debug for LayoutAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutAdapter").field("view", &self.view()).finish()
    }
}
