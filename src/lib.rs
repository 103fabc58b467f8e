//! roomstate - in-memory chat-room participant and ban registry.
//!
//! Holds the live state of one chat room for a bot client: who is present
//! (keyed by the platform-assigned session handle) and who is banned
//! (keyed by ban id). The external chat-protocol client feeds join, leave,
//! ban and unban events into the [`state::Registry`]; this crate does no
//! network I/O and persists nothing.
//!
//! Lookup misses are `None`, never an error; adding an already-known
//! handle or ban id hands back the existing record unchanged.

pub mod config;
pub mod state;

pub use config::{ConfigError, RegistryConfig};
pub use state::{
    BanDetails, BanId, BannedParticipant, Handle, Participant, ParticipantFlags,
    ParticipantProfile, Registry, RequestId, SharedParticipant,
};
