use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::component::Component;

/// A manufactured product line within an order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub item_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub components: Vec<Component>,
}

impl Item {
    pub fn component(&self, component_id: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.component_id == component_id)
    }

    pub fn component_mut(&mut self, component_id: &str) -> Option<&mut Component> {
        self.components
            .iter_mut()
            .find(|c| c.component_id == component_id)
    }
}
