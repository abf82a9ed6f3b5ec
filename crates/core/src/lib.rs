//! Teamup domain core.
//!
//! Pure, I/O-free building blocks for the project/membership workflow:
//!
//! - [`project`] — lifecycle states and member roles.
//! - [`positions`] — the position ledger (open vs. filled slot counts).
//! - [`roster`] — the membership roster (members, applicants) and the
//!   mutation rules gating who may join, leave, and approve.
//! - [`avatar`] — picture validation and thumbnailing.
//!
//! Persistence, transport, and external services live in the sibling
//! crates; everything here operates on in-memory snapshots.

pub mod avatar;
pub mod error;
pub mod positions;
pub mod project;
pub mod roster;
pub mod types;
