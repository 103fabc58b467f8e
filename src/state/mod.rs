//! State management module.
//!
//! Contains the Registry (room state) and the record types it owns.

mod banned;
mod participant;
mod registry;

pub use banned::{BanDetails, BanId, BannedParticipant, RequestId};
pub use participant::{Handle, Participant, ParticipantFlags, ParticipantProfile};
pub use registry::{Registry, SharedParticipant};
