//! Button controller — debounced press handling with post-toggle verification.
//!
//! A press is **dropped**, never queued, when a prior action is still in
//! flight or when it lands inside the debounce window. The processing flag
//! is released on every exit path, so a failed gateway call can never wedge
//! a button.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use lumen_domain::error::GatewayError;
use lumen_domain::event::{ButtonAction, ButtonEvent};
use lumen_domain::id::{ButtonId, LightId, SwitchId, ZoneId};
use lumen_domain::state::SwitchState;

use crate::ports::{LightGateway, SwitchGateway};
use crate::router::ButtonHandler;
use crate::zone::AutoOffCanceller;

/// What a button drives: the queryable bridge light for `single`, the bus
/// switch (and optionally a zone's auto-off) for `double`.
#[derive(Debug, Clone)]
pub struct ButtonBinding {
    pub button: ButtonId,
    pub light: LightId,
    pub switch: SwitchId,
    /// Zone whose pending auto-off a `double` press to off cancels.
    pub zone: Option<ZoneId>,
}

/// Mutable per-button record.
///
/// Guarded by a sync lock that is only ever held for flag reads and writes,
/// never across an await.
#[derive(Debug, Default)]
struct ButtonState {
    last_known_on: Option<bool>,
    last_press_at: Option<Instant>,
    processing: bool,
}

/// Debounced controller for one wall button.
pub struct ButtonController<L, S, Z> {
    binding: ButtonBinding,
    debounce: Duration,
    lights: L,
    switches: S,
    zones: Z,
    state: Mutex<ButtonState>,
}

impl<L, S, Z> ButtonController<L, S, Z>
where
    L: LightGateway,
    S: SwitchGateway,
    Z: AutoOffCanceller,
{
    #[must_use]
    pub fn new(binding: ButtonBinding, debounce: Duration, lights: L, switches: S, zones: Z) -> Self {
        Self {
            binding,
            debounce,
            lights,
            switches,
            zones,
            state: Mutex::new(ButtonState::default()),
        }
    }

    /// The button this controller owns.
    #[must_use]
    pub fn button(&self) -> &ButtonId {
        &self.binding.button
    }

    /// Locally tracked on/off of the controlled light, `None` until a press
    /// establishes one.
    #[must_use]
    pub fn last_known_on(&self) -> Option<bool> {
        self.lock_state().last_known_on
    }

    /// Whether an action is currently in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.lock_state().processing
    }

    /// Handle one press. Dropped presses return without any gateway call.
    pub async fn handle_action(&self, action: ButtonAction) {
        if !self.begin_press() {
            return;
        }

        let result = match action {
            ButtonAction::Single => self.toggle_light().await,
            ButtonAction::Double => self.toggle_switch().await,
            ButtonAction::Hold => {
                tracing::info!(button = %self.binding.button, "hold accepted, no action bound");
                Ok(())
            }
        };

        // Release before reporting: no failure may leave the button stuck.
        self.finish_press();

        if let Err(err) = result {
            tracing::warn!(
                button = %self.binding.button,
                action = %action,
                error = %err,
                "press handling failed"
            );
        }
    }

    /// Entry guard. Accepting a press records the press time and raises the
    /// processing flag in one step.
    fn begin_press(&self) -> bool {
        let mut state = self.lock_state();
        if state.processing {
            tracing::debug!(button = %self.binding.button, "press dropped, action in flight");
            return false;
        }
        let now = Instant::now();
        let debounced = state
            .last_press_at
            .is_some_and(|last| now.duration_since(last) < self.debounce);
        if debounced {
            tracing::debug!(button = %self.binding.button, "press dropped, inside debounce window");
            return false;
        }
        state.processing = true;
        state.last_press_at = Some(now);
        true
    }

    fn finish_press(&self) {
        self.lock_state().processing = false;
    }

    /// `single`: read the light, command the inverse, read back to verify.
    async fn toggle_light(&self) -> Result<(), GatewayError> {
        let light = &self.binding.light;
        let current = self.lights.light_status(light).await?;
        let target = !current;
        tracing::info!(
            button = %self.binding.button,
            light = %light,
            on = target,
            "toggling light"
        );
        self.lights.set_light(light, target).await?;

        match self.lights.light_status(light).await {
            Ok(observed) => {
                if observed != target {
                    tracing::warn!(
                        button = %self.binding.button,
                        light = %light,
                        commanded = target,
                        observed,
                        "light did not take the commanded state"
                    );
                }
                self.record_light(observed);
            }
            Err(err) => {
                // Verification is observational only. Keep the commanded
                // state as best knowledge and move on.
                tracing::warn!(
                    button = %self.binding.button,
                    light = %light,
                    error = %err,
                    "could not verify light state"
                );
                self.record_light(target);
            }
        }
        Ok(())
    }

    /// `double`: toggle the bus switch from tracked state. The backend cannot
    /// be queried, so the toggle sequence is a pure function of
    /// `last_known_on`, and the record advances whether or not the publish
    /// lands.
    async fn toggle_switch(&self) -> Result<(), GatewayError> {
        let target = {
            let mut state = self.lock_state();
            let target = SwitchState::from_on(!state.last_known_on.unwrap_or(false));
            state.last_known_on = Some(target.is_on());
            target
        };

        tracing::info!(
            button = %self.binding.button,
            switch = %self.binding.switch,
            state = %target,
            "toggling switch"
        );
        if let Err(err) = self.switches.set_switch(&self.binding.switch, target).await {
            tracing::warn!(
                button = %self.binding.button,
                switch = %self.binding.switch,
                error = %err,
                "switch command failed"
            );
        }

        // Switching off by hand must also disarm the zone's auto-off, or the
        // stale timer would fire into an already dark room.
        if target == SwitchState::Off
            && let Some(zone) = &self.binding.zone
            && self.zones.cancel_auto_off(zone).await
        {
            tracing::debug!(button = %self.binding.button, zone = %zone, "pending auto-off cancelled");
        }
        Ok(())
    }

    fn record_light(&self, on: bool) {
        self.lock_state().last_known_on = Some(on);
    }

    fn lock_state(&self) -> MutexGuard<'_, ButtonState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// All configured buttons, keyed by id.
pub struct ButtonSet<L, S, Z> {
    buttons: HashMap<ButtonId, Arc<ButtonController<L, S, Z>>>,
}

impl<L, S, Z> Default for ButtonSet<L, S, Z> {
    fn default() -> Self {
        Self {
            buttons: HashMap::new(),
        }
    }
}

impl<L, S, Z> ButtonSet<L, S, Z>
where
    L: LightGateway,
    S: SwitchGateway,
    Z: AutoOffCanceller,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, controller: ButtonController<L, S, Z>) {
        self.buttons
            .insert(controller.binding.button.clone(), Arc::new(controller));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}

impl<L, S, Z> ButtonHandler for ButtonSet<L, S, Z>
where
    L: LightGateway,
    S: SwitchGateway,
    Z: AutoOffCanceller,
{
    fn handle_action(&self, event: ButtonEvent) -> impl Future<Output = ()> + Send {
        async move {
            match self.buttons.get(&event.button) {
                Some(controller) => controller.handle_action(event.action).await,
                None => tracing::warn!(button = %event.button, "press for unknown button"),
            }
        }
    }
}
