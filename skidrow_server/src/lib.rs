//! `skidrow_server`
//!
//! Server-side systems:
//! - Fixed-rate room simulation (`sim`)
//! - One worker task per running room
//! - Lobby and room bookkeeping on a single host task
//! - Sends `Snapshot`s and `GameEvent`s to room members
//!
//! Networking model:
//! - TCP only: length-prefixed JSON frames, one reliable channel per client.

pub mod registry;
pub mod server;
pub mod sim;
pub mod worker;

pub use server::GameServer;
pub use sim::{Room, Seat};
