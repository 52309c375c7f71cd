//! Workflow events
//!
//! This module provides the event envelope emitted on every committed
//! workflow transition and the sink abstraction that decouples the core
//! from any delivery mechanism. Delivery (webhooks, email, queues) is an
//! external collaborator; the default sink just logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trellis_access::Role;

/// Workflow event envelope.
///
/// All events are wrapped in this envelope which provides metadata for
/// routing, tracing, and audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Unique event id.
    pub id: Uuid,

    /// Event type (e.g., "workflow.started", "workflow.stage_advanced").
    pub event_type: String,

    /// Timestamp when the event was created.
    pub timestamp: DateTime<Utc>,

    /// Tenant context.
    pub tenant_id: Uuid,

    /// Workflow instance the event concerns.
    pub instance_id: Uuid,

    /// Entity under review.
    pub entity_id: Uuid,

    /// Actor that triggered the event, if any.
    pub actor_id: Option<Uuid>,

    /// Role the actor acted under, if any.
    pub actor_role: Option<Role>,

    /// Stage the instance is at after the event.
    pub stage: String,

    /// Event payload.
    pub payload: serde_json::Value,
}

impl WorkflowEvent {
    /// Create a new event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The event type string
    /// * `tenant_id` - Tenant context
    /// * `instance_id` - Workflow instance the event concerns
    /// * `entity_id` - Entity under review
    /// * `stage` - Stage after the event
    pub fn new(
        event_type: impl Into<String>,
        tenant_id: Uuid,
        instance_id: Uuid,
        entity_id: Uuid,
        stage: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            tenant_id,
            instance_id,
            entity_id,
            actor_id: None,
            actor_role: None,
            stage: stage.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Set the acting user.
    pub fn with_actor(mut self, actor_id: Uuid, role: Role) -> Self {
        self.actor_id = Some(actor_id);
        self.actor_role = Some(role);
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Sink for workflow events.
///
/// Emission happens after the transition has committed; sinks must not
/// fail the request, so `emit` is infallible from the caller's view.
pub trait EventSink: Send + Sync {
    /// Receive one event.
    fn emit(&self, event: &WorkflowEvent);
}

/// Default sink that logs events via `tracing`.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &WorkflowEvent) {
        tracing::info!(
            event_type = %event.event_type,
            tenant_id = %event.tenant_id,
            instance_id = %event.instance_id,
            entity_id = %event.entity_id,
            stage = %event.stage,
            "workflow event"
        );
    }
}
