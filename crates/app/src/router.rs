//! Event router — maps bus topics onto zone and button controllers.
//!
//! Dispatch is pure routing: no queueing, no buffering, no replay. Occupancy
//! reports are awaited inline so each zone sees them in bus order; button
//! work is spawned so a slow bridge round-trip cannot stall the dispatch
//! loop. Malformed payloads and unrouted topics are logged and dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use lumen_domain::event::{ButtonEvent, ButtonPayload, OccupancyEvent, OccupancyPayload};
use lumen_domain::id::{ButtonId, ZoneId};

/// Receives occupancy reports, keyed by zone.
pub trait OccupancyHandler: Send + Sync {
    /// Apply one occupancy report to its zone.
    fn handle_occupancy(&self, event: OccupancyEvent) -> impl Future<Output = ()> + Send;
}

/// Receives press actions, keyed by button.
pub trait ButtonHandler: Send + Sync {
    /// Apply one press action to its button.
    fn handle_action(&self, event: ButtonEvent) -> impl Future<Output = ()> + Send;
}

/// Where a topic's messages go.
#[derive(Debug, Clone)]
enum Target {
    Zone(ZoneId),
    Button(ButtonId),
}

/// Topic-to-controller dispatcher.
pub struct EventRouter<Z, B> {
    routes: HashMap<String, Target>,
    zones: Arc<Z>,
    buttons: Arc<B>,
}

impl<Z, B> EventRouter<Z, B>
where
    Z: OccupancyHandler,
    B: ButtonHandler + 'static,
{
    #[must_use]
    pub fn new(zones: Arc<Z>, buttons: Arc<B>) -> Self {
        Self {
            routes: HashMap::new(),
            zones,
            buttons,
        }
    }

    /// Register `topic` as the occupancy feed of `zone`.
    pub fn route_occupancy(&mut self, topic: impl Into<String>, zone: ZoneId) {
        self.routes.insert(topic.into(), Target::Zone(zone));
    }

    /// Register `topic` as the press feed of `button`.
    pub fn route_button(&mut self, topic: impl Into<String>, button: ButtonId) {
        self.routes.insert(topic.into(), Target::Button(button));
    }

    /// The exact topics the controllers need subscribed.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    /// Dispatch one inbound bus message.
    pub async fn dispatch(&self, topic: &str, payload: &[u8]) {
        match self.routes.get(topic) {
            Some(Target::Zone(zone)) => match OccupancyPayload::parse(payload) {
                Ok(report) => {
                    self.zones
                        .handle_occupancy(OccupancyEvent {
                            zone: zone.clone(),
                            occupied: report.occupancy,
                        })
                        .await;
                }
                Err(err) => {
                    tracing::warn!(topic = %topic, error = %err, "dropping malformed occupancy payload");
                }
            },
            Some(Target::Button(button)) => match ButtonPayload::parse(payload) {
                Ok(press) => {
                    let buttons = Arc::clone(&self.buttons);
                    let event = ButtonEvent {
                        button: button.clone(),
                        action: press.action,
                    };
                    tokio::spawn(async move {
                        buttons.handle_action(event).await;
                    });
                }
                Err(err) => {
                    tracing::warn!(topic = %topic, error = %err, "dropping malformed button payload");
                }
            },
            None => {
                tracing::debug!(topic = %topic, "no route for topic");
            }
        }
    }
}
