use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Delivery status of a transport vehicle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    #[default]
    InTransit,
    Delivered,
}

/// A transport vehicle carrying undecorated glass to the first team.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VehicleRecord {
    /// Registration plate; identifies the vehicle within a component.
    pub vehicle_plate: String,

    #[serde(default)]
    pub destination: Option<String>,

    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: VehicleStatus,

    /// Receipt confirmation recorded by the first team. Either this flag or
    /// `status == Delivered` counts as delivered.
    #[serde(default)]
    pub received: bool,
}

impl VehicleRecord {
    pub fn is_delivered(&self) -> bool {
        self.received || self.status == VehicleStatus::Delivered
    }

    /// Flips the record to its delivered state.
    pub fn mark_delivered(&mut self) {
        self.status = VehicleStatus::Delivered;
        self.received = true;
    }
}
