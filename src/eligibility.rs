//! Eligibility evaluation for team dashboards.
//!
//! Pure decisions over a component snapshot: may a given team currently edit
//! production quantities, or is it still waiting on transport or an upstream
//! team? The pipeline is strict: work unlocks team-by-team only after the
//! upstream team dispatches, while the very first team is gated on vehicle
//! delivery instead of an upstream team.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::component::{Component, DecorationStatus};
use crate::sequence::TeamId;
use crate::vehicles::{self, VehicleApproval};

/// Why an edit was refused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenyReason {
    /// The team does not appear in this component's decoration sequence.
    NotInSequence,
    /// `is_deco_approved` is false; this gate applies to every team.
    NotApproved,
    /// First team only: no vehicle records exist yet.
    NoVehicles,
    /// First team only: at least one vehicle is still in transit.
    VehiclesPending,
    /// The immediately preceding team has not dispatched yet.
    AwaitingUpstream { team: TeamId },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInSequence => {
                write!(f, "team is not part of this component's decoration sequence")
            }
            Self::NotApproved => write!(f, "decoration not approved"),
            Self::NoVehicles => write!(f, "no vehicle details recorded"),
            Self::VehiclesPending => write!(f, "vehicle delivery not yet confirmed"),
            Self::AwaitingUpstream { team } => write!(f, "waiting for {team} to dispatch"),
        }
    }
}

/// Outcome of an eligibility check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct EditDecision {
    pub allowed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl EditDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    /// Human-readable refusal message, if refused.
    pub fn message(&self) -> Option<String> {
        self.reason.as_ref().map(ToString::to_string)
    }
}

/// Hard edit gate for a team's production controls.
///
/// Gates are checked in order: membership in the sequence, the component's
/// decoration approval flag, then transport arrival (first team) or the
/// immediate predecessor's dispatch (every later team).
pub fn can_edit(component: &Component, team: &TeamId) -> EditDecision {
    if component.decoration(team).is_none() || !component.deco_sequence.contains(team) {
        return EditDecision::deny(DenyReason::NotInSequence);
    }
    if !component.is_deco_approved {
        return EditDecision::deny(DenyReason::NotApproved);
    }
    sequence_gate(component, team)
}

/// Same pipeline gating as [`can_edit`] but without the approval flag;
/// drives the read-only "waiting" banners shown before approval lands.
pub fn can_work(component: &Component, team: &TeamId) -> EditDecision {
    if component.decoration(team).is_none() || !component.deco_sequence.contains(team) {
        return EditDecision::deny(DenyReason::NotInSequence);
    }
    sequence_gate(component, team)
}

fn sequence_gate(component: &Component, team: &TeamId) -> EditDecision {
    if component.deco_sequence.is_first(team) {
        return match vehicles::vehicle_approval_status(component) {
            VehicleApproval::NoVehicles => EditDecision::deny(DenyReason::NoVehicles),
            VehicleApproval::Pending => EditDecision::deny(DenyReason::VehiclesPending),
            _ => EditDecision::allow(),
        };
    }
    match component.deco_sequence.previous_of(team) {
        Some(previous) => {
            let status = component
                .decoration(previous)
                .map(|record| record.status)
                .unwrap_or_default();
            if status == DecorationStatus::Dispatched {
                EditDecision::allow()
            } else {
                EditDecision::deny(DenyReason::AwaitingUpstream {
                    team: previous.clone(),
                })
            }
        }
        None => EditDecision::deny(DenyReason::NotInSequence),
    }
}

/// Progress line for a team's dashboard card: "Completed" once the team has
/// dispatched, otherwise which upstream team is still pending, or
/// "Awaiting <team>" when the team is first in line.
pub fn waiting_message(component: &Component, team: &TeamId) -> String {
    if let Some(record) = component.decoration(team) {
        if record.status == DecorationStatus::Dispatched {
            return "Completed".to_string();
        }
    }
    let Some(position) = component.deco_sequence.position_of(team) else {
        return "Not part of this decoration sequence".to_string();
    };
    for upstream in &component.deco_sequence.teams()[..position] {
        let status = component
            .decoration(upstream)
            .map(|record| record.status)
            .unwrap_or_default();
        if status != DecorationStatus::Dispatched {
            return format!("Waiting for {upstream} to dispatch");
        }
    }
    format!("Awaiting {team}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::component::TeamDecorationRecord;
    use crate::models::vehicle::{VehicleRecord, VehicleStatus};
    use crate::sequence::DecoSequence;

    fn component(sequence: &str) -> Component {
        let mut component = Component {
            component_id: "c1".into(),
            deco_sequence: DecoSequence::parse(sequence),
            is_deco_approved: true,
            ..Default::default()
        };
        component.normalize_decorations();
        component
    }

    fn set_status(component: &mut Component, team: &str, status: DecorationStatus) {
        component.decorations.insert(
            TeamId::from(team),
            TeamDecorationRecord {
                qty: 100,
                completed_qty: 0,
                status,
            },
        );
    }

    fn delivered_vehicle() -> VehicleRecord {
        VehicleRecord {
            vehicle_plate: "MH14KL4321".into(),
            status: VehicleStatus::Delivered,
            received: true,
            ..Default::default()
        }
    }

    #[test]
    fn approval_flag_gates_every_team() {
        let mut c = component("printing_coating");
        set_status(&mut c, "printing", DecorationStatus::Dispatched);
        c.is_deco_approved = false;

        for team in ["printing", "coating"] {
            let decision = can_edit(&c, &TeamId::from(team));
            assert!(!decision.allowed, "{team} should be blocked");
            assert_eq!(decision.reason, Some(DenyReason::NotApproved));
        }
    }

    #[test]
    fn first_team_blocked_without_vehicles() {
        let mut c = component("printing_coating");
        set_status(&mut c, "printing", DecorationStatus::Dispatched);
        set_status(&mut c, "coating", DecorationStatus::Pending);

        let printing = can_edit(&c, &TeamId::from("printing"));
        assert!(!printing.allowed);
        assert_eq!(printing.reason, Some(DenyReason::NoVehicles));

        // downstream team is unlocked by the upstream dispatch regardless
        let coating = can_edit(&c, &TeamId::from("coating"));
        assert!(coating.allowed);
    }

    #[test]
    fn first_team_blocked_while_vehicles_in_transit() {
        let mut c = component("printing_coating");
        c.vehicle_details.push(VehicleRecord {
            vehicle_plate: "MH14KL4321".into(),
            ..Default::default()
        });
        let decision = can_edit(&c, &TeamId::from("printing"));
        assert_eq!(decision.reason, Some(DenyReason::VehiclesPending));
    }

    #[test]
    fn first_team_allowed_once_vehicles_delivered() {
        let mut c = component("printing_coating");
        c.vehicle_details.push(delivered_vehicle());
        assert!(can_edit(&c, &TeamId::from("printing")).allowed);
    }

    #[test]
    fn later_team_waits_for_predecessor_dispatch() {
        let mut c = component("printing_coating_foiling");
        c.vehicle_details.push(delivered_vehicle());
        set_status(&mut c, "printing", DecorationStatus::ReadyToDispatch);

        let decision = can_edit(&c, &TeamId::from("coating"));
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason,
            Some(DenyReason::AwaitingUpstream {
                team: TeamId::from("printing")
            })
        );

        set_status(&mut c, "printing", DecorationStatus::Dispatched);
        assert!(can_edit(&c, &TeamId::from("coating")).allowed);

        // foiling is gated on coating, not printing
        let foiling = can_edit(&c, &TeamId::from("foiling"));
        assert_eq!(
            foiling.reason,
            Some(DenyReason::AwaitingUpstream {
                team: TeamId::from("coating")
            })
        );
    }

    #[test]
    fn unknown_team_is_not_in_sequence() {
        let c = component("printing_coating");
        let decision = can_edit(&c, &TeamId::from("frosting"));
        assert_eq!(decision.reason, Some(DenyReason::NotInSequence));
    }

    #[test]
    fn can_work_ignores_approval_flag() {
        let mut c = component("printing_coating");
        c.is_deco_approved = false;
        c.vehicle_details.push(delivered_vehicle());

        assert!(can_work(&c, &TeamId::from("printing")).allowed);
        assert!(!can_edit(&c, &TeamId::from("printing")).allowed);
    }

    #[test]
    fn waiting_messages() {
        let mut c = component("printing_coating_foiling");
        assert_eq!(
            waiting_message(&c, &TeamId::from("printing")),
            "Awaiting printing"
        );
        assert_eq!(
            waiting_message(&c, &TeamId::from("foiling")),
            "Waiting for printing to dispatch"
        );

        set_status(&mut c, "printing", DecorationStatus::Dispatched);
        assert_eq!(
            waiting_message(&c, &TeamId::from("printing")),
            "Completed"
        );
        assert_eq!(
            waiting_message(&c, &TeamId::from("foiling")),
            "Waiting for coating to dispatch"
        );
    }
}
