//! Authorization Registry
//!
//! Whitelist of responder identities. Only the administrator changes it;
//! anyone may look an identity up.

use std::collections::HashMap;

use askmarket_types::{AccountId, MarketEvent, Result};

use crate::market::{Committed, Marketplace};

/// Responder identity → authorized flag
///
/// Absence and `false` both mean "not authorized".
#[derive(Debug, Default)]
pub(crate) struct AuthorizationRegistry {
    entries: HashMap<AccountId, bool>,
}

impl AuthorizationRegistry {
    /// Set the flag; returns whether it changed
    pub(crate) fn set(&mut self, responder: &AccountId, authorized: bool) -> bool {
        let previous = self.entries.insert(responder.clone(), authorized);
        previous.unwrap_or(false) != authorized
    }

    pub(crate) fn is_authorized(&self, responder: &AccountId) -> bool {
        self.entries.get(responder).copied().unwrap_or(false)
    }

    /// Authorized identities, sorted
    pub(crate) fn authorized(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self
            .entries
            .iter()
            .filter(|(_, authorized)| **authorized)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl Marketplace {
    /// Add a responder to the whitelist (administrator only, idempotent)
    pub async fn authorize(&self, caller: &AccountId, responder: &AccountId) -> Result<()> {
        let mut state = self.state.lock().await;
        let outcome = self.set_authorization(&mut state.registry, caller, responder, true);
        self.settle("authorize", caller, outcome)
    }

    /// Remove a responder from the whitelist (administrator only, idempotent)
    pub async fn revoke(&self, caller: &AccountId, responder: &AccountId) -> Result<()> {
        let mut state = self.state.lock().await;
        let outcome = self.set_authorization(&mut state.registry, caller, responder, false);
        self.settle("revoke", caller, outcome)
    }

    /// Check whether an identity may answer requests
    pub async fn is_authorized(&self, responder: &AccountId) -> bool {
        self.state.lock().await.registry.is_authorized(responder)
    }

    /// All currently authorized responders, sorted
    pub async fn authorized_responders(&self) -> Vec<AccountId> {
        self.state.lock().await.registry.authorized()
    }

    fn set_authorization(
        &self,
        registry: &mut AuthorizationRegistry,
        caller: &AccountId,
        responder: &AccountId,
        authorized: bool,
    ) -> Result<Committed<()>> {
        let action = if authorized {
            "authorize responders"
        } else {
            "revoke responders"
        };
        self.ensure_admin(caller, action)?;

        let changed = registry.set(responder, authorized);
        let timestamp = self.clock.now();
        tracing::info!(responder = %responder, authorized, changed, "responder authorization set");

        let event = if authorized {
            MarketEvent::ResponderAuthorized {
                responder: responder.clone(),
                timestamp,
            }
        } else {
            MarketEvent::ResponderRevoked {
                responder: responder.clone(),
                timestamp,
            }
        };
        Ok(Committed::new((), vec![event]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_not_authorized() {
        let registry = AuthorizationRegistry::default();
        assert!(!registry.is_authorized(&AccountId::new("bot")));
        assert!(registry.authorized().is_empty());
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut registry = AuthorizationRegistry::default();
        let bot = AccountId::new("bot");

        assert!(registry.set(&bot, true));
        assert!(!registry.set(&bot, true));
        assert!(registry.is_authorized(&bot));

        assert!(registry.set(&bot, false));
        assert!(!registry.set(&bot, false));
        assert!(!registry.is_authorized(&bot));
    }

    #[test]
    fn test_revoking_unknown_is_noop() {
        let mut registry = AuthorizationRegistry::default();
        assert!(!registry.set(&AccountId::new("ghost"), false));
        assert!(registry.authorized().is_empty());
    }

    #[test]
    fn test_authorized_list_is_sorted() {
        let mut registry = AuthorizationRegistry::default();
        for id in ["zeta", "alpha", "mid"] {
            registry.set(&AccountId::new(id), true);
        }
        registry.set(&AccountId::new("mid"), false);
        assert_eq!(
            registry.authorized(),
            vec![AccountId::new("alpha"), AccountId::new("zeta")]
        );
    }
}
