//! Room simulation.
//!
//! A `Room` is a plain struct advanced one tick at a time by its owning
//! worker. Every command handler validates its own preconditions and returns
//! `None` (or an empty `Vec`) when it has no observable effect.

pub mod ai;
pub mod combat;
pub mod identity;
pub mod perks;
pub mod progression;
pub mod room;
pub mod spawn;
pub mod survival;

pub use room::{apply_item, Room, Seat};
