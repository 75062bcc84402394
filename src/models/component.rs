use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::models::vehicle::VehicleRecord;
use crate::sequence::{DecoSequence, TeamId};

/// Per-team decoration status of a component.
///
/// The upstream wire historically also sent `COMPLETED` for "fully produced,
/// not yet dispatched"; it is mapped onto `ReadyToDispatch` at the serde
/// boundary and never appears inside the engine.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DecorationStatus {
    #[default]
    Pending,
    InProgress,
    #[serde(alias = "COMPLETED")]
    ReadyToDispatch,
    Dispatched,
}

impl DecorationStatus {
    /// Terminal statuses floor the remaining quantity at zero.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ReadyToDispatch | Self::Dispatched)
    }
}

/// Quantity/status sub-record attached to a component for one team.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TeamDecorationRecord {
    /// Quantity this team has to produce.
    #[serde(default)]
    pub qty: i64,

    #[serde(default)]
    pub completed_qty: i64,

    #[serde(default)]
    pub status: DecorationStatus,
}

impl TeamDecorationRecord {
    /// Remaining quantity for this team. Dispatch is a hard floor: once the
    /// record is terminal the remainder is zero regardless of the raw
    /// arithmetic.
    pub fn remaining(&self) -> i64 {
        if self.status.is_terminal() {
            0
        } else {
            (self.qty - self.completed_qty).max(0)
        }
    }
}

/// Append-only production log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrackingEntry {
    pub date: DateTime<Utc>,

    pub quantity_produced: i64,

    #[serde(default)]
    pub stock_used: i64,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Component category. Only glass components flow through decoration teams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    #[default]
    Glass,
    #[serde(other)]
    Other,
}

/// The unit that flows through the decoration sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Component {
    /// Unique within its item.
    pub component_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub component_type: ComponentKind,

    /// Ordered decoration chain; empty means no decoration workflow.
    #[serde(default)]
    pub deco_sequence: DecoSequence,

    /// Per-team records, keyed by team identifier. Invariant: holds an entry
    /// for a team iff that team appears in `deco_sequence`.
    #[serde(default)]
    pub decorations: HashMap<TeamId, TeamDecorationRecord>,

    /// Must be true before any team in the sequence may record production.
    #[serde(default)]
    pub is_deco_approved: bool,

    #[serde(default)]
    pub vehicle_details: Vec<VehicleRecord>,

    #[serde(default)]
    pub tracking_history: Vec<TrackingEntry>,

    /// Monotonic revision; the propagator rejects events that are not newer.
    #[serde(default)]
    pub revision: u64,
}

impl Component {
    /// Whether this component participates in the decoration workflow at all.
    pub fn is_decorated_glass(&self) -> bool {
        self.component_type == ComponentKind::Glass && !self.deco_sequence.is_empty()
    }

    pub fn decoration(&self, team: &TeamId) -> Option<&TeamDecorationRecord> {
        self.decorations.get(team)
    }

    pub fn decoration_mut(&mut self, team: &TeamId) -> Option<&mut TeamDecorationRecord> {
        self.decorations.get_mut(team)
    }

    pub fn total_produced(&self) -> i64 {
        self.tracking_history
            .iter()
            .map(|entry| entry.quantity_produced)
            .sum()
    }

    pub fn total_stock_used(&self) -> i64 {
        self.tracking_history
            .iter()
            .map(|entry| entry.stock_used)
            .sum()
    }

    /// Restores the `decorations` <-> `deco_sequence` invariant after
    /// ingestion or a sequence change: missing teams get a default record,
    /// records for teams outside the sequence are dropped.
    pub fn normalize_decorations(&mut self) {
        for team in self.deco_sequence.teams() {
            self.decorations.entry(team.clone()).or_default();
        }
        let sequence = self.deco_sequence.clone();
        self.decorations.retain(|team, _| {
            let keep = sequence.contains(team);
            if !keep {
                warn!(
                    component_id = %self.component_id,
                    team = %team,
                    "dropping decoration record for team outside the sequence"
                );
            }
            keep
        });
    }
}
