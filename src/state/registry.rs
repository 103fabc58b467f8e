//! The participant registry.
//!
//! This module contains the `Registry` struct, which owns all room state:
//! the table of connected participants and the parallel ban list.

use crate::config::RegistryConfig;
use crate::state::{BanDetails, BanId, BannedParticipant, RequestId};
use crate::state::{Handle, Participant, ParticipantProfile};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared handle to a participant entry.
///
/// Participants are mutated in place by the external client as room events
/// arrive, so entries are lock-wrapped. The registry remains authoritative:
/// holders of a `SharedParticipant` can update fields but insertion and
/// removal go through the registry.
pub type SharedParticipant = Arc<RwLock<Participant>>;

/// Registry of room participants and banned users.
///
/// Backed by two concurrent maps so that an event loop feeding joins,
/// leaves and bans from several tasks never observes a half-applied
/// mutation. Ban records are immutable once created, so they are shared
/// without a lock.
///
/// Scan results and views clone the shared handles out of the map; no
/// internal guard outlives the call that produced it.
pub struct Registry {
    participants: DashMap<Handle, SharedParticipant>,
    bans: DashMap<BanId, Arc<BannedParticipant>>,
    config: RegistryConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            participants: DashMap::new(),
            bans: DashMap::new(),
            config,
        }
    }

    // ========================================================================
    // Participants
    // ========================================================================

    /// Add a participant for a join event.
    ///
    /// If the handle is already present the existing entry is returned
    /// unchanged and `profile` is ignored; callers cannot tell the two
    /// cases apart from the return value. Insert-or-lookup is atomic, so a
    /// concurrent `get` never sees a partially constructed participant.
    pub fn add(&self, handle: Handle, profile: ParticipantProfile) -> SharedParticipant {
        let entry = self
            .participants
            .entry(handle)
            .or_insert_with(|| {
                let participant = Participant::new(handle, profile, self.config.defaults.level);
                debug!(
                    handle,
                    nick = %participant.nick,
                    flags = %participant.flags.summary(),
                    "participant joined"
                );
                Arc::new(RwLock::new(participant))
            })
            .clone();

        // Expected room sizes are tens to low hundreds; crossing the
        // threshold is worth a warning but never rejects the add.
        let count = self.participants.len();
        if count > self.config.limits.participant_warn_threshold {
            warn!(
                count,
                threshold = self.config.limits.participant_warn_threshold,
                "participant count above configured threshold"
            );
        }

        entry
    }

    /// Add a participant, replacing any existing entry for the handle.
    ///
    /// The overwrite counterpart to [`Registry::add`], for callers that
    /// need a stale record refreshed rather than preserved.
    pub fn insert_or_replace(
        &self,
        handle: Handle,
        profile: ParticipantProfile,
    ) -> SharedParticipant {
        let participant = Participant::new(handle, profile, self.config.defaults.level);
        debug!(
            handle,
            nick = %participant.nick,
            flags = %participant.flags.summary(),
            "participant replaced"
        );
        let shared = Arc::new(RwLock::new(participant));
        self.participants.insert(handle, shared.clone());
        shared
    }

    /// Remove a participant for a leave event.
    ///
    /// Returns the removed entry, or `None` if the handle was not present.
    pub fn remove(&self, handle: Handle) -> Option<SharedParticipant> {
        let removed = self.participants.remove(&handle).map(|(_, p)| p);
        if let Some(participant) = &removed {
            debug!(handle, nick = %participant.read().nick, "participant left");
        }
        removed
    }

    /// Remove all participants. The ban list is untouched.
    pub fn clear(&self) {
        debug!(count = self.participants.len(), "participant table cleared");
        self.participants.clear();
    }

    /// Look up a participant by handle.
    ///
    /// The primary lookup path, since the handle accompanies nearly every
    /// event the platform emits.
    pub fn get(&self, handle: Handle) -> Option<SharedParticipant> {
        self.participants.get(&handle).map(|p| p.value().clone())
    }

    /// Find the first participant with exactly this nickname.
    ///
    /// Linear scan; when several participants share a nickname the winner
    /// follows map iteration order, which is unspecified.
    pub fn find_by_nick(&self, nick: &str) -> Option<SharedParticipant> {
        self.participants
            .iter()
            .find(|p| p.value().read().nick == nick)
            .map(|p| p.value().clone())
    }

    /// Find every participant whose nickname contains the given fragment
    /// (case-sensitive).
    pub fn find_containing(&self, fragment: &str) -> Vec<SharedParticipant> {
        self.participants
            .iter()
            .filter(|p| p.value().read().nick.contains(fragment))
            .map(|p| p.value().clone())
            .collect()
    }

    /// Number of participants in the room.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// True when no participants are present.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    // ========================================================================
    // Views (computed fresh on each call)
    // ========================================================================

    /// Every participant.
    pub fn all(&self) -> Vec<SharedParticipant> {
        self.participants
            .iter()
            .map(|p| p.value().clone())
            .collect()
    }

    /// Participants with the moderator flag set.
    pub fn moderators(&self) -> Vec<SharedParticipant> {
        self.filtered(|p| p.flags.moderator)
    }

    /// Participants signed in to a linked account.
    pub fn signed_in(&self) -> Vec<SharedParticipant> {
        self.filtered(Participant::is_signed_in)
    }

    /// Participants with the lurker flag set.
    pub fn lurkers(&self) -> Vec<SharedParticipant> {
        self.filtered(|p| p.flags.lurker)
    }

    /// Participants that are neither moderators nor lurkers.
    ///
    /// Owner and broadcasting status do not exclude a participant from
    /// this view.
    pub fn regulars(&self) -> Vec<SharedParticipant> {
        self.filtered(|p| p.flags.is_regular())
    }

    /// Participants currently broadcasting.
    pub fn broadcasters(&self) -> Vec<SharedParticipant> {
        self.filtered(|p| p.flags.broadcasting)
    }

    fn filtered(&self, pred: impl Fn(&Participant) -> bool) -> Vec<SharedParticipant> {
        self.participants
            .iter()
            .filter(|p| pred(&p.value().read()))
            .map(|p| p.value().clone())
            .collect()
    }

    // ========================================================================
    // Ban list
    // ========================================================================

    /// Record a ban event.
    ///
    /// If the ban id is already present the existing record is returned
    /// unchanged and `details` is ignored, mirroring [`Registry::add`].
    pub fn add_ban(&self, ban_id: BanId, details: BanDetails) -> Arc<BannedParticipant> {
        self.bans
            .entry(ban_id)
            .or_insert_with(|| {
                let ban = BannedParticipant::new(ban_id, details);
                debug!(
                    ban_id,
                    nick = %ban.nick,
                    banned_by = %ban.banned_by,
                    "ban recorded"
                );
                Arc::new(ban)
            })
            .clone()
    }

    /// Remove a ban record for an unban event.
    ///
    /// Returns the removed record, or `None` if the ban id was not present.
    pub fn remove_ban(&self, ban_id: BanId) -> Option<Arc<BannedParticipant>> {
        let removed = self.bans.remove(&ban_id).map(|(_, b)| b);
        if let Some(ban) = &removed {
            debug!(ban_id, nick = %ban.nick, "ban lifted");
        }
        removed
    }

    /// Remove all ban records. The participant table is untouched.
    pub fn clear_bans(&self) {
        debug!(count = self.bans.len(), "ban list cleared");
        self.bans.clear();
    }

    /// Look up a ban record by ban id.
    pub fn get_ban(&self, ban_id: BanId) -> Option<Arc<BannedParticipant>> {
        self.bans.get(&ban_id).map(|b| b.value().clone())
    }

    /// Find the first ban record created by the given request id.
    pub fn find_ban_by_request(&self, request_id: RequestId) -> Option<Arc<BannedParticipant>> {
        self.bans
            .iter()
            .find(|b| b.value().request_id == request_id)
            .map(|b| b.value().clone())
    }

    /// Find the first ban record with exactly this nickname.
    ///
    /// Exact match, like [`Registry::find_by_nick`].
    pub fn find_ban_by_nick(&self, nick: &str) -> Option<Arc<BannedParticipant>> {
        self.bans
            .iter()
            .find(|b| b.value().nick == nick)
            .map(|b| b.value().clone())
    }

    /// Ban records that target a signed-in account.
    pub fn banned_accounts(&self) -> Vec<Arc<BannedParticipant>> {
        self.bans
            .iter()
            .filter(|b| b.value().has_account())
            .map(|b| b.value().clone())
            .collect()
    }

    /// Number of ban records.
    pub fn ban_count(&self) -> usize {
        self.bans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(nick: &str) -> ParticipantProfile {
        ParticipantProfile {
            nick: nick.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn add_then_get_returns_supplied_fields_and_defaults() {
        let registry = Registry::new();
        let profile = ParticipantProfile {
            nick: "alice".to_string(),
            account: "alice_acct".to_string(),
            gift_points: 10,
            moderator: true,
            ..Default::default()
        };
        registry.add(1, profile);

        let found = registry.get(1).expect("participant should be present");
        let p = found.read();
        assert_eq!(p.handle, 1);
        assert_eq!(p.nick, "alice");
        assert_eq!(p.account, "alice_acct");
        assert_eq!(p.gift_points, 10);
        assert!(p.flags.moderator);
        // Omitted fields take their documented defaults.
        assert_eq!(p.subscription, 0);
        assert_eq!(p.level, 5);
        assert!(!p.flags.broadcasting);
        assert_eq!(p.last_message, None);
    }

    #[test]
    fn duplicate_add_returns_existing_entry_unchanged() {
        let registry = Registry::new();
        let first = registry.add(1, profile("alice"));
        let second = registry.add(1, profile("impostor"));

        assert!(Arc::ptr_eq(&first, &second), "same shared entry both times");
        assert_eq!(second.read().nick, "alice");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn insert_or_replace_overwrites() {
        let registry = Registry::new();
        let first = registry.add(1, profile("alice"));
        let replaced = registry.insert_or_replace(1, profile("alice2"));

        assert!(!Arc::ptr_eq(&first, &replaced));
        assert_eq!(registry.get(1).unwrap().read().nick, "alice2");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_present_then_get_misses() {
        let registry = Registry::new();
        registry.add(1, profile("alice"));

        let removed = registry.remove(1).expect("should remove");
        assert_eq!(removed.read().nick, "alice");
        assert!(registry.get(1).is_none());
    }

    #[test]
    fn remove_absent_returns_none_without_mutating() {
        let registry = Registry::new();
        registry.add(1, profile("alice"));

        assert!(registry.remove(2).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_leaves_ban_list_untouched() {
        let registry = Registry::new();
        registry.add(1, profile("alice"));
        registry.add(2, profile("bob"));
        registry.add_ban(7, BanDetails::default());

        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.all().is_empty());
        assert_eq!(registry.ban_count(), 1);
    }

    #[test]
    fn regulars_are_exactly_non_mod_non_lurker() {
        let registry = Registry::new();
        for (handle, moderator, lurker) in [
            (1, false, false),
            (2, true, false),
            (3, false, true),
            (4, true, true),
        ] {
            registry.add(
                handle,
                ParticipantProfile {
                    nick: format!("user{handle}"),
                    moderator,
                    lurker,
                    ..Default::default()
                },
            );
        }

        let regulars = registry.regulars();
        assert_eq!(regulars.len(), 1);
        assert_eq!(regulars[0].read().handle, 1);
        assert_eq!(registry.moderators().len(), 2);
        assert_eq!(registry.lurkers().len(), 2);
    }

    #[test]
    fn regulars_keep_owners_and_broadcasters() {
        let registry = Registry::new();
        let owner = registry.add(
            1,
            ParticipantProfile {
                nick: "owner".to_string(),
                owner: true,
                ..Default::default()
            },
        );
        owner.write().flags.broadcasting = true;

        assert_eq!(registry.regulars().len(), 1);
        assert_eq!(registry.broadcasters().len(), 1);
    }

    #[test]
    fn signed_in_requires_account() {
        let registry = Registry::new();
        registry.add(
            1,
            ParticipantProfile {
                nick: "anon".to_string(),
                ..Default::default()
            },
        );
        registry.add(
            2,
            ParticipantProfile {
                nick: "alice".to_string(),
                account: "alice_acct".to_string(),
                ..Default::default()
            },
        );

        let signed_in = registry.signed_in();
        assert_eq!(signed_in.len(), 1);
        assert_eq!(signed_in[0].read().handle, 2);
    }

    #[test]
    fn find_by_nick_is_exact() {
        let registry = Registry::new();
        registry.add(1, profile("alice"));
        registry.add(2, profile("alicia"));

        let found = registry.find_by_nick("alice").expect("exact match");
        assert_eq!(found.read().handle, 1);
        assert!(registry.find_by_nick("alic").is_none());
    }

    #[test]
    fn find_containing_matches_substring_case_sensitively() {
        let registry = Registry::new();
        registry.add(1, profile("abcd"));
        registry.add(2, profile("xabcy"));
        registry.add(3, profile("xyz"));

        let hits = registry.find_containing("abc");
        let mut handles: Vec<_> = hits.iter().map(|p| p.read().handle).collect();
        handles.sort_unstable();
        assert_eq!(handles, vec![1, 2]);
        assert!(registry.find_containing("ABC").is_empty());
    }

    #[test]
    fn views_are_computed_fresh() {
        let registry = Registry::new();
        registry.add(1, profile("alice"));
        assert_eq!(registry.all().len(), 1);

        registry.add(2, profile("bob"));
        assert_eq!(registry.all().len(), 2);
    }

    #[test]
    fn duplicate_ban_keeps_original_record() {
        let registry = Registry::new();
        let first = registry.add_ban(
            1,
            BanDetails {
                nick: "troll".to_string(),
                request_id: 55,
                reason: "spam".to_string(),
                ..Default::default()
            },
        );
        let second = registry.add_ban(
            1,
            BanDetails {
                reason: "different reason".to_string(),
                ..Default::default()
            },
        );

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.reason, "spam");

        let by_request = registry
            .find_ban_by_request(55)
            .expect("found by request id");
        assert_eq!(by_request.ban_id, 1);
    }

    #[test]
    fn remove_ban_by_id() {
        let registry = Registry::new();
        registry.add_ban(
            1,
            BanDetails {
                nick: "troll".to_string(),
                ..Default::default()
            },
        );

        let removed = registry.remove_ban(1).expect("should remove");
        assert_eq!(removed.nick, "troll");
        assert!(registry.get_ban(1).is_none());
        assert!(registry.remove_ban(1).is_none());
    }

    #[test]
    fn clear_bans_leaves_participants_untouched() {
        let registry = Registry::new();
        registry.add(1, profile("alice"));
        registry.add_ban(7, BanDetails::default());

        registry.clear_bans();

        assert_eq!(registry.ban_count(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn find_ban_by_nick_is_exact() {
        let registry = Registry::new();
        registry.add_ban(
            1,
            BanDetails {
                nick: "troll".to_string(),
                ..Default::default()
            },
        );

        assert!(registry.find_ban_by_nick("troll").is_some());
        assert!(registry.find_ban_by_nick("trol").is_none());
    }

    #[test]
    fn banned_accounts_requires_account() {
        let registry = Registry::new();
        registry.add_ban(
            1,
            BanDetails {
                nick: "anon_troll".to_string(),
                ..Default::default()
            },
        );
        registry.add_ban(
            2,
            BanDetails {
                nick: "troll".to_string(),
                account: "troll_acct".to_string(),
                ..Default::default()
            },
        );

        let accounts = registry.banned_accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].ban_id, 2);
    }

    #[test]
    fn configured_default_level_applies() {
        let mut config = RegistryConfig::default();
        config.defaults.level = 3;
        let registry = Registry::with_config(config);

        let p = registry.add(1, profile("alice"));
        assert_eq!(p.read().level, 3);
    }
}
