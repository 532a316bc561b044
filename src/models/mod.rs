//! Data models for `EcoVoyage`
//!
//! This module contains the destination records decoded from the search
//! index and the turns of a conversation.

pub mod conversation;
pub mod destination;

pub use conversation::{Role, Turn};
pub use destination::{
    Accommodation, DESTINATION_ATTRIBUTES, Destination, PriceRange, TransportMode,
    TransportOption,
};
