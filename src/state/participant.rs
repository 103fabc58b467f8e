//! Participant-related types.

/// Session handle assigned by the external chat platform.
///
/// Present in nearly every event the platform emits, which makes it the
/// primary key for the registry.
pub type Handle = u64;

/// A connected room participant.
#[derive(Debug, Clone)]
pub struct Participant {
    pub handle: Handle,
    pub nick: String,
    /// Linked account name. Empty means the participant is anonymous.
    pub account: String,
    pub gift_points: u64,
    /// Subscription tier (0 = none).
    pub subscription: u32,
    pub achievement_url: String,
    pub avatar_url: String,
    /// Status flags.
    pub flags: ParticipantFlags,
    /// Permission level. The platform default is 5.
    pub level: u8,
    /// Unix timestamp when this participant joined the room.
    pub joined_at: i64,
    /// External platform identifier, if the platform reported one.
    pub platform_id: Option<String>,
    /// Unix timestamp of the account's last login, if known.
    pub last_login: Option<i64>,
    /// Text of the most recent message, if any.
    pub last_message: Option<String>,
    /// Unix timestamp of the most recent message (0 = never spoke).
    pub last_message_at: i64,
}

/// Participant status flags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParticipantFlags {
    pub featured: bool,     // featured by the room
    pub lurker: bool,       // present without an outgoing stream
    pub moderator: bool,    // room moderator
    pub owner: bool,        // room owner
    pub broadcasting: bool, // currently transmitting audio/video
    pub waiting: bool,      // waiting for broadcast approval
}

impl ParticipantFlags {
    /// Compact flag summary like "+ml", for log lines.
    pub fn summary(&self) -> String {
        let mut s = String::from("+");
        if self.featured {
            s.push('f');
        }
        if self.lurker {
            s.push('l');
        }
        if self.moderator {
            s.push('m');
        }
        if self.owner {
            s.push('o');
        }
        if self.broadcasting {
            s.push('b');
        }
        if self.waiting {
            s.push('w');
        }
        s
    }

    /// True when the participant is neither a moderator nor a lurker.
    ///
    /// Owner and broadcasting status deliberately do not matter here.
    pub fn is_regular(&self) -> bool {
        !self.moderator && !self.lurker
    }
}

/// Fields supplied by the external client when a join event is parsed.
///
/// Every field is optional and defaults to empty/zero/false; the handle is
/// mandatory and passed separately to [`crate::state::Registry::add`].
/// `broadcasting` and `waiting` are intentionally absent: they always start
/// false and are flipped later by the client.
#[derive(Debug, Default, Clone)]
pub struct ParticipantProfile {
    pub nick: String,
    pub account: String,
    pub gift_points: u64,
    pub subscription: u32,
    pub achievement_url: String,
    pub avatar_url: String,
    pub featured: bool,
    pub lurker: bool,
    pub moderator: bool,
    pub owner: bool,
    pub platform_id: Option<String>,
    pub last_login: Option<i64>,
}

impl Participant {
    /// Create a new participant from a join-event profile.
    ///
    /// `level` is the configured default permission level; `joined_at` is
    /// stamped with the current time.
    pub fn new(handle: Handle, profile: ParticipantProfile, level: u8) -> Self {
        let ParticipantProfile {
            nick,
            account,
            gift_points,
            subscription,
            achievement_url,
            avatar_url,
            featured,
            lurker,
            moderator,
            owner,
            platform_id,
            last_login,
        } = profile;

        Self {
            handle,
            nick,
            account,
            gift_points,
            subscription,
            achievement_url,
            avatar_url,
            flags: ParticipantFlags {
                featured,
                lurker,
                moderator,
                owner,
                broadcasting: false,
                waiting: false,
            },
            level,
            joined_at: chrono::Utc::now().timestamp(),
            platform_id,
            last_login,
            last_message: None,
            last_message_at: 0,
        }
    }

    /// True when the participant is signed in to a linked account.
    pub fn is_signed_in(&self) -> bool {
        !self.account.is_empty()
    }
}
