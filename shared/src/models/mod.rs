//! Domain models

pub mod dine_in;
pub mod order;
pub mod restaurant;
pub mod waiter_call;

pub use dine_in::ActiveDineIn;
pub use order::{AcceptOrder, Order, OrderItem, OrderStatus, OrderStatusFilter, RejectOrder};
pub use restaurant::{
    DineInAvailabilityUpdate, Restaurant, RestaurantStatus, RestaurantStatusUpdate,
};
pub use waiter_call::{WaiterCall, WaiterCallStatus, WaiterCallStatusUpdate};
