// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
// In-process broadcast of map, plan and catalog events
//
// In-memory event streaming over tokio broadcast channels. Events are
// published only after the unit of work that produced them has committed.
// Nothing is persisted: a subscriber that joins late misses earlier events.

use crate::domain::direction::DirectionId;
use crate::domain::events::{CatalogEvent, MapEvent, PlanEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Unified domain event type for the event bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    Map(MapEvent),
    Plan(PlanEvent),
    Catalog(CatalogEvent),
}

/// Broadcast hub shared by the application services
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity.
    /// Slow receivers lose the oldest events once the buffer is full.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn publish_map_event(&self, event: MapEvent) {
        self.publish(DomainEvent::Map(event));
    }

    pub fn publish_plan_event(&self, event: PlanEvent) {
        self.publish(DomainEvent::Plan(event));
    }

    pub fn publish_catalog_event(&self, event: CatalogEvent) {
        self.publish(DomainEvent::Catalog(event));
    }

    fn publish(&self, event: DomainEvent) {
        debug!("Publishing event: {:?}", event);

        // send() only fails when nobody is subscribed
        if self.sender.send(event).is_err() {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all domain events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to map events of one direction
    pub fn subscribe_direction(&self, direction_id: DirectionId) -> DirectionEventReceiver {
        DirectionEventReceiver {
            receiver: self.sender.subscribe(),
            direction_id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

fn map_recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

/// Receiver for all domain events
pub struct EventReceiver {
    receiver: broadcast::Receiver<DomainEvent>,
}

impl EventReceiver {
    /// Receive the next event, waiting until one is available
    pub async fn recv(&mut self) -> Result<DomainEvent, EventBusError> {
        self.receiver.recv().await.map_err(map_recv_error)
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<DomainEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver for the map events of a single direction
pub struct DirectionEventReceiver {
    receiver: broadcast::Receiver<DomainEvent>,
    direction_id: DirectionId,
}

impl DirectionEventReceiver {
    /// Receive the next map event for the direction, skipping everything else
    pub async fn recv(&mut self) -> Result<MapEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(map_recv_error)?;
            if let DomainEvent::Map(map_event) = event {
                if map_event.direction_id() == self.direction_id {
                    return Ok(map_event);
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver fell behind; {0} events dropped")]
    Lagged(u64),
}
