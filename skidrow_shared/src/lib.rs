//! `skidrow_shared`
//!
//! Types shared by the simulation server and anything that talks to it.
//!
//! Design goals:
//! - Closed enums for every stat table, resolved with exhaustive matches.
//! - Wire types are plain serde records; snapshots are full replacements.
//! - Deterministic helpers only; no wall-clock reads.
//! - No `unsafe`.

pub mod chat;
pub mod config;
pub mod event;
pub mod lobby;
pub mod math;
pub mod model;
pub mod net;
pub mod tables;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::event::*;
    pub use crate::math::*;
    pub use crate::model::*;
    pub use crate::net::*;
    pub use crate::tables::*;
}
