//! Ban record types.

/// Primary key for the ban registry.
pub type BanId = u64;

/// Correlation id accompanying a ban action, used for secondary lookup.
pub type RequestId = u64;

/// A banned participant.
///
/// Immutable once constructed; unbanning removes the record rather than
/// mutating it.
#[derive(Debug, Clone)]
pub struct BannedParticipant {
    pub ban_id: BanId,
    pub nick: String,
    /// Request id of the ban action that produced this record.
    pub request_id: RequestId,
    /// Whether the platform reported the ban as successful.
    pub success: bool,
    /// Linked account name. Empty means the banned user was anonymous.
    pub account: String,
    /// Moderator who issued the ban.
    pub banned_by: String,
    pub reason: String,
    /// Unix timestamp when this record was created.
    pub banned_at: i64,
}

/// Fields supplied by the external client when a ban event is parsed.
///
/// Every field defaults to empty/zero/false; the ban id is mandatory and
/// passed separately to [`crate::state::Registry::add_ban`].
#[derive(Debug, Default, Clone)]
pub struct BanDetails {
    pub nick: String,
    pub request_id: RequestId,
    pub success: bool,
    pub account: String,
    pub banned_by: String,
    pub reason: String,
}

impl BannedParticipant {
    /// Create a new ban record, stamping `banned_at` with the current time.
    pub fn new(ban_id: BanId, details: BanDetails) -> Self {
        let BanDetails {
            nick,
            request_id,
            success,
            account,
            banned_by,
            reason,
        } = details;

        Self {
            ban_id,
            nick,
            request_id,
            success,
            account,
            banned_by,
            reason,
            banned_at: chrono::Utc::now().timestamp(),
        }
    }

    /// True when the ban targets a signed-in account rather than an
    /// anonymous session.
    pub fn has_account(&self) -> bool {
        !self.account.is_empty()
    }
}
