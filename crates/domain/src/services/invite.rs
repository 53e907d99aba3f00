//! Invite-graph engine.
//!
//! Validates invite codes, links invitees to inviters, and lists followers.
//! The inviter link is write-once: once a profile records who invited it,
//! nothing overwrites that.

use tracing::debug;

use crate::error::AuthError;
use crate::models::Profile;
use crate::store::ProfileStore;

/// Invite code validation and attachment over a [`ProfileStore`].
pub struct InviteEngine<S> {
    store: S,
}

impl<S: ProfileStore> InviteEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns true iff some profile owns the given invite code.
    pub async fn validate(&self, code: &str) -> Result<bool, AuthError> {
        Ok(self.store.invite_code_exists(code).await?)
    }

    /// Records `code` as the profile's inviter.
    ///
    /// Attaching the code already recorded is an idempotent no-op; a
    /// different code on an already-invited profile fails, as does the
    /// profile's own code or a code no profile owns.
    pub async fn attach(&self, profile: &Profile, code: &str) -> Result<(), AuthError> {
        if code == profile.invite_code {
            return Err(AuthError::SelfInvite);
        }
        if let Some(existing) = profile.inviter() {
            if existing == code {
                return Ok(());
            }
            return Err(AuthError::AlreadyInvited);
        }
        if !self.store.invite_code_exists(code).await? {
            return Err(AuthError::InvalidInviteCode);
        }

        // The conditional write loses to a concurrent attacher.
        if !self.store.set_invited_by(profile.account_id, code).await? {
            return Err(AuthError::AlreadyInvited);
        }

        debug!(account_id = %profile.account_id, code, "inviter recorded");
        Ok(())
    }

    /// Phones of every account invited by the given code, in profile
    /// creation order.
    pub async fn followers(&self, invite_code: &str) -> Result<Vec<String>, AuthError> {
        Ok(self.store.list_followers(invite_code).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    async fn engine_with_profiles(phones: &[&str]) -> InviteEngine<MemoryStore> {
        let store = MemoryStore::new();
        for phone in phones {
            store.create_account_with_profile(phone, None).await.unwrap();
        }
        InviteEngine::new(store)
    }

    #[tokio::test]
    async fn test_validate_reflects_existing_codes() {
        let engine = engine_with_profiles(&["9001112233"]).await;
        let code = engine.store().profile("9001112233").unwrap().invite_code;

        assert!(engine.validate(&code).await.unwrap());
        assert!(!engine.validate("zzzzzz").await.unwrap());
    }

    #[tokio::test]
    async fn test_attach_own_code_is_self_invite() {
        let engine = engine_with_profiles(&["9001112233"]).await;
        let profile = engine.store().profile("9001112233").unwrap();

        let err = engine
            .attach(&profile, &profile.invite_code)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SelfInvite));
        assert_eq!(
            engine.store().profile("9001112233").unwrap().invited_by_code,
            None
        );
    }

    #[tokio::test]
    async fn test_attach_unknown_code_fails() {
        let engine = engine_with_profiles(&["9001112233"]).await;
        let profile = engine.store().profile("9001112233").unwrap();

        let err = engine.attach(&profile, "zzzzzz").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInviteCode));
    }

    #[tokio::test]
    async fn test_attach_records_inviter_once() {
        let engine = engine_with_profiles(&["9001112233", "9005556677"]).await;
        let inviter_code = engine.store().profile("9001112233").unwrap().invite_code;
        let invitee = engine.store().profile("9005556677").unwrap();

        engine.attach(&invitee, &inviter_code).await.unwrap();
        assert_eq!(
            engine
                .store()
                .profile("9005556677")
                .unwrap()
                .invited_by_code
                .as_deref(),
            Some(inviter_code.as_str())
        );

        // Re-attaching the same code is a no-op.
        let invitee = engine.store().profile("9005556677").unwrap();
        engine.attach(&invitee, &inviter_code).await.unwrap();
    }

    #[tokio::test]
    async fn test_attach_different_code_after_set_fails() {
        let engine =
            engine_with_profiles(&["9001112233", "9002223344", "9005556677"]).await;
        let first = engine.store().profile("9001112233").unwrap().invite_code;
        let second = engine.store().profile("9002223344").unwrap().invite_code;

        let invitee = engine.store().profile("9005556677").unwrap();
        engine.attach(&invitee, &first).await.unwrap();

        let invitee = engine.store().profile("9005556677").unwrap();
        let err = engine.attach(&invitee, &second).await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyInvited));
        assert_eq!(
            engine
                .store()
                .profile("9005556677")
                .unwrap()
                .invited_by_code
                .as_deref(),
            Some(first.as_str())
        );
    }

    #[tokio::test]
    async fn test_attach_with_stale_profile_loses_race() {
        let engine = engine_with_profiles(&["9001112233", "9002223344", "9005556677"]).await;
        let first = engine.store().profile("9001112233").unwrap().invite_code;
        let second = engine.store().profile("9002223344").unwrap().invite_code;

        // Snapshot before anyone attaches, then attach through a fresh read.
        let stale = engine.store().profile("9005556677").unwrap();
        let fresh = engine.store().profile("9005556677").unwrap();
        engine.attach(&fresh, &first).await.unwrap();

        // The stale snapshot still thinks nothing is attached; the
        // conditional write catches it.
        let err = engine.attach(&stale, &second).await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyInvited));
    }

    #[tokio::test]
    async fn test_followers_in_creation_order() {
        let engine =
            engine_with_profiles(&["9001112233", "9005556677", "9002223344", "9003334455"])
                .await;
        let code = engine.store().profile("9001112233").unwrap().invite_code;

        for phone in ["9005556677", "9002223344"] {
            let profile = engine.store().profile(phone).unwrap();
            engine.attach(&profile, &code).await.unwrap();
        }

        assert_eq!(
            engine.followers(&code).await.unwrap(),
            vec!["9005556677".to_string(), "9002223344".to_string()]
        );
        assert!(engine.followers("zzzzzz").await.unwrap().is_empty());
    }
}
