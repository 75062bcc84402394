//! Vehicle delivery approval.
//!
//! Transport vehicles carry the undecorated glass to the first decoration
//! team. Confirming their delivery is that team's exclusive responsibility;
//! every other team only ever observes the outcome. All checks recompute
//! from the current component snapshot, nothing is cached.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::component::Component;
use crate::models::vehicle::VehicleRecord;
use crate::sequence::TeamId;

/// Delivery confirmation state of a component's transport vehicles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleApproval {
    /// No vehicle records exist yet.
    NoVehicles,
    /// At least one vehicle has not been confirmed delivered.
    Pending,
    /// Every vehicle is delivered or receipt-confirmed.
    Approved,
    /// Shown to downstream teams while the first team has not yet confirmed.
    WaitingForFirstTeam,
    /// Shown to downstream teams once confirmation is done.
    NotResponsible,
}

/// Raw delivery state across the component's recorded vehicles.
pub fn vehicle_approval_status(component: &Component) -> VehicleApproval {
    if component.vehicle_details.is_empty() {
        return VehicleApproval::NoVehicles;
    }
    if component
        .vehicle_details
        .iter()
        .all(VehicleRecord::is_delivered)
    {
        VehicleApproval::Approved
    } else {
        VehicleApproval::Pending
    }
}

/// Per-team display view of the approval state. Only the first team in the
/// sequence performs the real check; downstream teams see whether they are
/// still waiting on it.
pub fn vehicle_approval_for_team(component: &Component, team: &TeamId) -> VehicleApproval {
    if component.deco_sequence.is_first(team) {
        vehicle_approval_status(component)
    } else {
        match vehicle_approval_status(component) {
            VehicleApproval::Approved => VehicleApproval::NotResponsible,
            _ => VehicleApproval::WaitingForFirstTeam,
        }
    }
}

/// Vehicle approval responsibility belongs exclusively to the first team
/// named in the decoration sequence.
pub fn can_approve_vehicles(component: &Component, team: &TeamId) -> bool {
    component.deco_sequence.is_first(team)
}
