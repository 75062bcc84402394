// Core domain models
pub mod component;
pub mod item;
pub mod order;
pub mod stock;
pub mod vehicle;

pub use component::{
    Component, ComponentKind, DecorationStatus, TeamDecorationRecord, TrackingEntry,
};
pub use item::Item;
pub use order::Order;
pub use stock::{MasterStockKey, StockAdjustment, StockAdjustmentError};
pub use vehicle::{VehicleRecord, VehicleStatus};
