//! Pure order-domain types shared across the Swiftbite client crates.
//!
//! These are the wire shapes the backend speaks plus the few derived helpers
//! the tracking layer needs (countdown eligibility, terminal detection,
//! address display normalization). No I/O, no async — every other crate
//! depends on this one, never the reverse.

mod order;

pub use order::{
    DeliveryAddress, DeliveryPartner, Order, OrderItem, OrderPricing, OrderStatus,
};
