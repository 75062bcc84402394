pub mod events;
pub mod health;
pub mod orders;
pub mod stock;
pub mod vehicles;

use serde::Serialize;
use utoipa::ToSchema;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

use crate::propagator::AppliedUpdate;
use crate::store::Bucket;

/// Outcome of a state-changing action, as returned to dashboards.
#[derive(Clone, Copy, Debug, Serialize, ToSchema)]
pub struct UpdateOutcome {
    /// Bucket the order sits in after the action.
    pub bucket: Bucket,
    /// Whether the order changed bucket.
    pub moved: bool,
    /// Store version after the write.
    pub version: u64,
}

impl From<AppliedUpdate> for UpdateOutcome {
    fn from(applied: AppliedUpdate) -> Self {
        Self {
            bucket: applied.bucket,
            moved: applied.moved,
            version: applied.version,
        }
    }
}
