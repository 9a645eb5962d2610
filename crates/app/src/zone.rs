//! Zone controller — occupancy-driven switching with a cancellable auto-off.
//!
//! One controller owns one zone: an occupancy flag, the last commanded light
//! state, and at most one pending auto-off timer. Presence switches the light
//! on immediately; vacancy arms the timer instead of switching off, so brief
//! absences inside the window never blink the light. The whole transition
//! runs under one lock, which is what serializes a zone's events.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use lumen_domain::event::OccupancyEvent;
use lumen_domain::id::{SwitchId, ZoneId};
use lumen_domain::state::SwitchState;

use crate::ports::{OccupancyGate, SwitchGateway};
use crate::router::OccupancyHandler;
use crate::timer::{self, TimerHandle};

/// Where a zone currently stands, derived from its tracked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonePhase {
    /// Unoccupied, no timer pending.
    Idle,
    /// Presence detected; the light was commanded on.
    Occupied,
    /// Presence lost; the auto-off timer is running.
    Vacating,
}

/// Mutable per-zone record. Guarded by the controller's lock.
#[derive(Debug, Default)]
struct ZoneState {
    occupied: bool,
    light: Option<SwitchState>,
    pending: Option<TimerHandle>,
}

/// Cancels a zone's pending auto-off on behalf of a manual override.
///
/// Implemented by [`ZoneSet`]; the button controller depends on this seam
/// instead of the zone types so its tests can spy on the cancel.
pub trait AutoOffCanceller: Send + Sync {
    /// Cancel `zone`'s pending auto-off. Returns whether one was armed.
    fn cancel_auto_off(&self, zone: &ZoneId) -> impl Future<Output = bool> + Send;
}

impl<T: AutoOffCanceller> AutoOffCanceller for Arc<T> {
    fn cancel_auto_off(&self, zone: &ZoneId) -> impl Future<Output = bool> + Send {
        (**self).cancel_auto_off(zone)
    }
}

/// Occupancy-driven controller for one zone.
pub struct ZoneController<G, P> {
    zone: ZoneId,
    switch: SwitchId,
    auto_off: Duration,
    gateway: G,
    gate: P,
    state: Mutex<ZoneState>,
}

impl<G, P> ZoneController<G, P>
where
    G: SwitchGateway + 'static,
    P: OccupancyGate + 'static,
{
    #[must_use]
    pub fn new(zone: ZoneId, switch: SwitchId, auto_off: Duration, gateway: G, gate: P) -> Self {
        Self {
            zone,
            switch,
            auto_off,
            gateway,
            gate,
            state: Mutex::new(ZoneState::default()),
        }
    }

    /// The zone this controller owns.
    #[must_use]
    pub fn zone(&self) -> &ZoneId {
        &self.zone
    }

    /// Apply one occupancy report.
    ///
    /// Presence cancels any pending auto-off and commands the light on, even
    /// when a previous report already did: sensors re-report presence
    /// periodically and the re-issued command costs nothing. Vacancy arms a
    /// fresh auto-off; a vacancy report while one is already armed restarts
    /// the window.
    pub async fn handle_occupancy(self: &Arc<Self>, occupied: bool) {
        let mut state = self.state.lock().await;
        state.occupied = occupied;

        if occupied {
            if let Some(pending) = state.pending.take() {
                pending.cancel();
                tracing::debug!(zone = %self.zone, "presence returned, auto-off cancelled");
            }
            if self.gate.allow_light_on().await {
                tracing::info!(zone = %self.zone, "presence detected, switching light on");
                self.command(&mut state, SwitchState::On).await;
            } else {
                tracing::debug!(zone = %self.zone, "presence detected, turn-on vetoed by gate");
            }
        } else {
            tracing::debug!(
                zone = %self.zone,
                delay_secs = self.auto_off.as_secs(),
                "presence lost, arming auto-off"
            );
            self.arm(&mut state);
        }
    }

    /// Cancel the pending auto-off, if any. Returns whether one was armed.
    pub async fn cancel_auto_off(&self) -> bool {
        let mut state = self.state.lock().await;
        match state.pending.take() {
            Some(pending) => {
                pending.cancel();
                true
            }
            None => false,
        }
    }

    /// The phase the zone is in, derived from its tracked state.
    pub async fn phase(&self) -> ZonePhase {
        let state = self.state.lock().await;
        if state.occupied {
            ZonePhase::Occupied
        } else if state.pending.is_some() {
            ZonePhase::Vacating
        } else {
            ZonePhase::Idle
        }
    }

    /// Last commanded light state, `None` until the first command.
    pub async fn light(&self) -> Option<SwitchState> {
        self.state.lock().await.light
    }

    /// Arm (or restart) the auto-off timer.
    fn arm(self: &Arc<Self>, state: &mut ZoneState) {
        if let Some(previous) = state.pending.take() {
            previous.cancel();
        }
        let controller = Arc::clone(self);
        state.pending = Some(timer::schedule(self.auto_off, async move {
            controller.auto_off_elapsed().await;
        }));
    }

    /// Timer callback. Re-checks the live occupancy flag before acting: a
    /// presence report can race the firing and must win.
    async fn auto_off_elapsed(self: &Arc<Self>) {
        let mut state = self.state.lock().await;
        state.pending = None;
        if state.occupied {
            tracing::debug!(zone = %self.zone, "auto-off fired during occupancy, re-arming");
            self.arm(&mut state);
        } else {
            tracing::info!(zone = %self.zone, "auto-off elapsed, switching light off");
            self.command(&mut state, SwitchState::Off).await;
        }
    }

    /// Record then publish a switch command. The record is kept even when the
    /// publish fails: the backend offers no rollback to observe.
    async fn command(&self, state: &mut ZoneState, target: SwitchState) {
        state.light = Some(target);
        if let Err(err) = self.gateway.set_switch(&self.switch, target).await {
            tracing::warn!(
                zone = %self.zone,
                switch = %self.switch,
                state = %target,
                error = %err,
                "switch command failed"
            );
        }
    }
}

/// All configured zones, keyed by id.
pub struct ZoneSet<G, P> {
    zones: HashMap<ZoneId, Arc<ZoneController<G, P>>>,
}

impl<G, P> Default for ZoneSet<G, P> {
    fn default() -> Self {
        Self {
            zones: HashMap::new(),
        }
    }
}

impl<G, P> ZoneSet<G, P>
where
    G: SwitchGateway + 'static,
    P: OccupancyGate + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, controller: ZoneController<G, P>) {
        self.zones
            .insert(controller.zone.clone(), Arc::new(controller));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl<G, P> OccupancyHandler for ZoneSet<G, P>
where
    G: SwitchGateway + 'static,
    P: OccupancyGate + 'static,
{
    fn handle_occupancy(&self, event: OccupancyEvent) -> impl Future<Output = ()> + Send {
        async move {
            match self.zones.get(&event.zone) {
                Some(controller) => controller.handle_occupancy(event.occupied).await,
                None => tracing::warn!(zone = %event.zone, "occupancy report for unknown zone"),
            }
        }
    }
}

impl<G, P> AutoOffCanceller for ZoneSet<G, P>
where
    G: SwitchGateway + 'static,
    P: OccupancyGate + 'static,
{
    fn cancel_auto_off(&self, zone: &ZoneId) -> impl Future<Output = bool> + Send {
        async move {
            match self.zones.get(zone) {
                Some(controller) => controller.cancel_auto_off().await,
                None => {
                    tracing::warn!(zone = %zone, "auto-off cancel for unknown zone");
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use lumen_domain::error::GatewayError;
    use lumen_domain::state::SwitchState;

    use crate::ports::Ungated;

    use super::*;

    const AUTO_OFF: Duration = Duration::from_secs(300);

    // ── Fakes ────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct SpySwitch {
        commands: StdMutex<Vec<(SwitchId, SwitchState)>>,
    }

    impl SpySwitch {
        fn commands(&self) -> Vec<(SwitchId, SwitchState)> {
            self.commands.lock().unwrap().clone()
        }

        fn states(&self) -> Vec<SwitchState> {
            self.commands().into_iter().map(|(_, state)| state).collect()
        }
    }

    impl SwitchGateway for SpySwitch {
        fn set_switch(
            &self,
            switch: &SwitchId,
            state: SwitchState,
        ) -> impl Future<Output = Result<(), GatewayError>> + Send {
            self.commands.lock().unwrap().push((switch.clone(), state));
            async { Ok(()) }
        }
    }

    struct FailingSwitch;

    impl SwitchGateway for FailingSwitch {
        fn set_switch(
            &self,
            _switch: &SwitchId,
            _state: SwitchState,
        ) -> impl Future<Output = Result<(), GatewayError>> + Send {
            async {
                Err(GatewayError::Malformed(
                    "injected command failure".to_string(),
                ))
            }
        }
    }

    struct DenyGate;

    impl OccupancyGate for DenyGate {
        fn allow_light_on(&self) -> impl Future<Output = bool> + Send {
            async { false }
        }
    }

    fn make_zone() -> (Arc<ZoneController<Arc<SpySwitch>, Ungated>>, Arc<SpySwitch>) {
        let spy = Arc::new(SpySwitch::default());
        let controller = Arc::new(ZoneController::new(
            ZoneId::from("kitchen"),
            SwitchId::from("kitchen_switch"),
            AUTO_OFF,
            Arc::clone(&spy),
            Ungated,
        ));
        (controller, spy)
    }

    // ── Presence ─────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_switch_on_when_presence_detected() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;

        assert_eq!(
            spy.commands(),
            vec![(SwitchId::from("kitchen_switch"), SwitchState::On)]
        );
        assert_eq!(controller.phase().await, ZonePhase::Occupied);
        assert_eq!(controller.light().await, Some(SwitchState::On));
    }

    #[tokio::test(start_paused = true)]
    async fn should_reissue_on_command_for_repeated_presence() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;
        controller.handle_occupancy(true).await;

        assert_eq!(spy.states(), vec![SwitchState::On, SwitchState::On]);
    }

    // ── Auto-off ─────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_switch_off_only_after_the_auto_off_delay() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;
        controller.handle_occupancy(false).await;
        assert_eq!(controller.phase().await, ZonePhase::Vacating);

        tokio::time::sleep(AUTO_OFF - Duration::from_secs(1)).await;
        assert_eq!(spy.states(), vec![SwitchState::On]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(spy.states(), vec![SwitchState::On, SwitchState::Off]);
        assert_eq!(controller.phase().await, ZonePhase::Idle);
        assert_eq!(controller.light().await, Some(SwitchState::Off));
    }

    #[tokio::test(start_paused = true)]
    async fn should_restart_the_window_when_vacancy_is_renotified() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;
        controller.handle_occupancy(false).await;
        tokio::time::sleep(Duration::from_secs(150)).await;
        controller.handle_occupancy(false).await;

        // 200s past the first vacancy, but only 50s past the second.
        tokio::time::sleep(Duration::from_secs(50)).await;
        assert_eq!(spy.states(), vec![SwitchState::On]);

        tokio::time::sleep(AUTO_OFF).await;
        assert_eq!(spy.states(), vec![SwitchState::On, SwitchState::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_switch_off_when_presence_returns_inside_the_window() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;
        controller.handle_occupancy(false).await;
        tokio::time::sleep(Duration::from_secs(150)).await;
        controller.handle_occupancy(true).await;

        tokio::time::sleep(AUTO_OFF * 3).await;
        assert_eq!(spy.states(), vec![SwitchState::On, SwitchState::On]);
        assert_eq!(controller.phase().await, ZonePhase::Occupied);
    }

    #[tokio::test(start_paused = true)]
    async fn should_rearm_instead_of_switching_off_when_firing_races_presence() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;

        // Drive the callback directly, as if a fired timer lost the race
        // against the presence report that was just applied.
        controller.auto_off_elapsed().await;

        assert_eq!(spy.states(), vec![SwitchState::On]);
        assert!(controller.cancel_auto_off().await, "callback should have re-armed");
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_the_light_on_across_rearm_cycles_while_occupied() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;
        controller.auto_off_elapsed().await;

        // The re-armed timer fires for real; occupancy still holds.
        tokio::time::sleep(AUTO_OFF * 2).await;
        assert_eq!(spy.states(), vec![SwitchState::On]);
    }

    // ── Cancellation ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_cancel_auto_off_when_requested() {
        let (controller, spy) = make_zone();

        controller.handle_occupancy(true).await;
        controller.handle_occupancy(false).await;

        assert!(controller.cancel_auto_off().await);
        assert!(!controller.cancel_auto_off().await);
        assert_eq!(controller.phase().await, ZonePhase::Idle);

        tokio::time::sleep(AUTO_OFF * 2).await;
        assert_eq!(spy.states(), vec![SwitchState::On]);
    }

    // ── Failure and gating ───────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_keep_tracking_state_when_the_gateway_fails() {
        let controller = Arc::new(ZoneController::new(
            ZoneId::from("kitchen"),
            SwitchId::from("kitchen_switch"),
            AUTO_OFF,
            FailingSwitch,
            Ungated,
        ));

        controller.handle_occupancy(true).await;

        assert_eq!(controller.phase().await, ZonePhase::Occupied);
        assert_eq!(controller.light().await, Some(SwitchState::On));
    }

    #[tokio::test(start_paused = true)]
    async fn should_suppress_turn_on_but_not_auto_off_when_gated() {
        let spy = Arc::new(SpySwitch::default());
        let controller = Arc::new(ZoneController::new(
            ZoneId::from("kitchen"),
            SwitchId::from("kitchen_switch"),
            AUTO_OFF,
            Arc::clone(&spy),
            DenyGate,
        ));

        controller.handle_occupancy(true).await;
        assert!(spy.commands().is_empty());
        assert_eq!(controller.phase().await, ZonePhase::Occupied);

        controller.handle_occupancy(false).await;
        tokio::time::sleep(AUTO_OFF + Duration::from_secs(1)).await;
        assert_eq!(spy.states(), vec![SwitchState::Off]);
    }

    // ── ZoneSet ──────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_route_events_to_the_matching_zone() {
        let spy = Arc::new(SpySwitch::default());
        let mut set = ZoneSet::new();
        set.insert(ZoneController::new(
            ZoneId::from("kitchen"),
            SwitchId::from("kitchen_switch"),
            AUTO_OFF,
            Arc::clone(&spy),
            Ungated,
        ));
        set.insert(ZoneController::new(
            ZoneId::from("office"),
            SwitchId::from("office_switch"),
            AUTO_OFF,
            Arc::clone(&spy),
            Ungated,
        ));

        set.handle_occupancy(OccupancyEvent {
            zone: ZoneId::from("office"),
            occupied: true,
        })
        .await;

        assert_eq!(
            spy.commands(),
            vec![(SwitchId::from("office_switch"), SwitchState::On)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_ignore_events_for_unknown_zones() {
        let spy = Arc::new(SpySwitch::default());
        let mut set = ZoneSet::new();
        set.insert(ZoneController::new(
            ZoneId::from("kitchen"),
            SwitchId::from("kitchen_switch"),
            AUTO_OFF,
            Arc::clone(&spy),
            Ungated,
        ));

        set.handle_occupancy(OccupancyEvent {
            zone: ZoneId::from("attic"),
            occupied: true,
        })
        .await;
        assert!(spy.commands().is_empty());

        assert!(!set.cancel_auto_off(&ZoneId::from("attic")).await);
    }
}
