//! Session state: who is signed in, and whether we know yet.
//!
//! [`SessionStore`] owns the answer. It queries the identity provider once at
//! startup, then consumes the provider's event stream in emit order and
//! republishes [`SessionState`] through a `watch` channel. Consumers (the
//! authorization gate, UI shells, tests) read or await that state; nothing
//! else in the system touches the provider's session surface directly.
//!
//! Profile resolutions run concurrently with the event loop and are tagged
//! with a generation counter: only the resolution belonging to the *latest*
//! identity is ever applied, so a slow lookup for a previous user can never
//! surface that user's role after a rapid sign-out/sign-in.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, watch};

use crate::error::ProviderError;
use crate::profile::{Profile, ProfileResolver};
use crate::roles::Role;
use crate::types::DbId;

/// Externally managed authenticated account reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: DbId,
    pub email: String,
}

/// Change events pushed by the identity provider, in emit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Identity),
    TokenRefreshed(Identity),
    SignedOut,
}

/// The identity provider surface this core consumes.
///
/// Every operation fails with an opaque [`ProviderError`] whose message is
/// propagated verbatim; there is no core-level recovery beyond re-prompting.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// One-shot query for the currently authenticated identity, if any.
    async fn current_session(&self) -> Result<Option<Identity>, ProviderError>;

    /// Subscribe to provider-pushed change events (sign-in, sign-out,
    /// token refresh).
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Identity, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    async fn request_password_reset(&self, email: &str) -> Result<(), ProviderError>;
}

/// Snapshot of the session as currently known.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// True while the initial provider query or a profile resolution is in
    /// flight. Callers must treat a resolving state as deny-by-default,
    /// never as any affirmative role.
    pub resolving: bool,
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
}

impl SessionState {
    /// State before the provider has answered anything.
    pub fn start() -> Self {
        Self {
            resolving: true,
            identity: None,
            profile: None,
        }
    }

    /// Settled state with no identity.
    pub fn anonymous() -> Self {
        Self {
            resolving: false,
            identity: None,
            profile: None,
        }
    }

    /// The effective role for authorization decisions. A missing profile is
    /// `Unassigned`, which authorizes nothing.
    pub fn role(&self) -> Role {
        self.profile.as_ref().map_or(Role::Unassigned, |p| p.role)
    }
}

/// Explicitly owned, lifecycle-scoped session store.
///
/// Created at application start with [`SessionStore::spawn`]; dropping the
/// store aborts the driver task. State is observed via [`SessionStore::state`]
/// or [`SessionStore::subscribe`].
pub struct SessionStore {
    state_rx: watch::Receiver<SessionState>,
    driver: tokio::task::JoinHandle<()>,
}

impl SessionStore {
    /// Start the store: query the provider once, then follow its events.
    ///
    /// The event subscription is taken before this function returns, so no
    /// event emitted afterwards can be missed.
    pub fn spawn(provider: Arc<dyn IdentityProvider>, resolver: Arc<dyn ProfileResolver>) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::start());
        let events = provider.subscribe();
        let driver = tokio::spawn(drive(provider, resolver, events, state_tx));
        Self { state_rx, driver }
    }

    /// Current snapshot.
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Watch the state for changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Wait until the state is no longer resolving, up to `max_wait`.
    ///
    /// On timeout the current (still-resolving) state is returned; callers
    /// must treat it as degraded-but-safe and deny admission.
    pub async fn settled(&self, max_wait: Duration) -> SessionState {
        let mut rx = self.state_rx.clone();
        let _ = tokio::time::timeout(max_wait, async {
            while rx.borrow_and_update().resolving {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;
        self.state()
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Outcome of one profile resolution, tagged with the generation it was
/// started for.
type Resolution = (u64, Option<Profile>);

async fn drive(
    provider: Arc<dyn IdentityProvider>,
    resolver: Arc<dyn ProfileResolver>,
    mut events: broadcast::Receiver<SessionEvent>,
    state_tx: watch::Sender<SessionState>,
) {
    let (done_tx, mut done_rx) = mpsc::channel::<Resolution>(8);
    let mut generation: u64 = 0;

    match provider.current_session().await {
        Ok(Some(identity)) => {
            generation += 1;
            start_resolution(&resolver, &done_tx, generation, identity.id);
            state_tx.send_replace(SessionState {
                resolving: true,
                identity: Some(identity),
                profile: None,
            });
        }
        Ok(None) => {
            state_tx.send_replace(SessionState::anonymous());
        }
        Err(err) => {
            // Degraded-but-safe: the state stays `resolving`, so every gate
            // keeps answering Pending and nothing is admitted.
            tracing::warn!(error = %err, "identity provider unavailable at startup");
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SessionEvent::SignedIn(identity))
                | Ok(SessionEvent::TokenRefreshed(identity)) => {
                    generation += 1;
                    // Keep the profile only when the identity is unchanged
                    // (token refresh); a different user starts from nothing.
                    let same_user = state_tx
                        .borrow()
                        .identity
                        .as_ref()
                        .is_some_and(|current| current.id == identity.id);
                    let profile = if same_user {
                        state_tx.borrow().profile.clone()
                    } else {
                        None
                    };
                    start_resolution(&resolver, &done_tx, generation, identity.id);
                    state_tx.send_replace(SessionState {
                        resolving: true,
                        identity: Some(identity),
                        profile,
                    });
                }
                Ok(SessionEvent::SignedOut) => {
                    // Bumping the generation discards any in-flight
                    // resolution; identity and profile clear together.
                    generation += 1;
                    state_tx.send_replace(SessionState::anonymous());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session event stream lagged, re-syncing");
                    generation += 1;
                    match provider.current_session().await {
                        Ok(Some(identity)) => {
                            start_resolution(&resolver, &done_tx, generation, identity.id);
                            state_tx.send_replace(SessionState {
                                resolving: true,
                                identity: Some(identity),
                                profile: None,
                            });
                        }
                        Ok(None) => {
                            state_tx.send_replace(SessionState::anonymous());
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "session re-sync failed");
                        }
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some((done_generation, profile)) = done_rx.recv() => {
                if done_generation != generation {
                    // Stale resolution for a superseded identity; discard.
                    continue;
                }
                state_tx.send_modify(|state| {
                    state.profile = profile;
                    state.resolving = false;
                });
            }
        }
    }
}

fn start_resolution(
    resolver: &Arc<dyn ProfileResolver>,
    done: &mpsc::Sender<Resolution>,
    generation: u64,
    identity_id: DbId,
) {
    let resolver = Arc::clone(resolver);
    let done = done.clone();
    tokio::spawn(async move {
        let profile = match resolver.resolve(identity_id).await {
            Ok(profile) => profile,
            Err(err) => {
                // Failed resolution leaves the actor anonymous, never a
                // fallback role.
                tracing::warn!(identity_id, error = %err, "profile resolution failed");
                None
            }
        };
        let _ = done.send((generation, profile)).await;
    });
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;
    use crate::roles::Role;

    fn identity(id: DbId) -> Identity {
        Identity {
            id,
            email: format!("user{id}@example.test"),
        }
    }

    fn profile(id: DbId, role: Role) -> Profile {
        Profile {
            id,
            full_name: Some(format!("User {id}")),
            role,
            company: None,
            avatar_url: None,
            created_at: chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Provider test double: a fixed answer to `current_session` plus a
    /// broadcast channel the test feeds events into.
    struct FakeProvider {
        initial: Mutex<Option<Result<Option<Identity>, ProviderError>>>,
        events: broadcast::Sender<SessionEvent>,
    }

    impl FakeProvider {
        fn new(initial: Result<Option<Identity>, ProviderError>) -> Arc<Self> {
            let (events, _) = broadcast::channel(16);
            Arc::new(Self {
                initial: Mutex::new(Some(initial)),
                events,
            })
        }

        fn emit(&self, event: SessionEvent) {
            self.events.send(event).expect("store must be subscribed");
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn current_session(&self) -> Result<Option<Identity>, ProviderError> {
            self.initial
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Ok(None))
        }

        fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
            self.events.subscribe()
        }

        async fn sign_in(&self, _: &str, _: &str) -> Result<Identity, ProviderError> {
            Err(ProviderError::new("not wired in tests"))
        }

        async fn sign_up(&self, _: &str, _: &str, _: &str) -> Result<Identity, ProviderError> {
            Err(ProviderError::new("not wired in tests"))
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn request_password_reset(&self, _: &str) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    /// Resolver test double with per-identity latency.
    struct FakeResolver {
        profiles: HashMap<DbId, Profile>,
        delays: HashMap<DbId, Duration>,
    }

    impl FakeResolver {
        fn new(entries: Vec<(Profile, Duration)>) -> Arc<Self> {
            let mut profiles = HashMap::new();
            let mut delays = HashMap::new();
            for (profile, delay) in entries {
                delays.insert(profile.id, delay);
                profiles.insert(profile.id, profile);
            }
            Arc::new(Self { profiles, delays })
        }
    }

    #[async_trait]
    impl ProfileResolver for FakeResolver {
        async fn resolve(&self, identity_id: DbId) -> Result<Option<Profile>, ProviderError> {
            if let Some(delay) = self.delays.get(&identity_id) {
                tokio::time::sleep(*delay).await;
            }
            Ok(self.profiles.get(&identity_id).cloned())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_session_resolves_profile() {
        let provider = FakeProvider::new(Ok(Some(identity(1))));
        let resolver = FakeResolver::new(vec![(profile(1, Role::Admin), Duration::from_millis(5))]);
        let store = SessionStore::spawn(provider, resolver);

        let state = store.settled(Duration::from_secs(1)).await;
        assert!(!state.resolving);
        assert_eq!(state.identity, Some(identity(1)));
        assert_eq!(state.role(), Role::Admin);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_session_settles_anonymous() {
        let provider = FakeProvider::new(Ok(None));
        let resolver = FakeResolver::new(vec![]);
        let store = SessionStore::spawn(provider, resolver);

        let state = store.settled(Duration::from_secs(1)).await;
        assert_eq!(state, SessionState::anonymous());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_identity_wins_despite_slow_resolution() {
        let provider = FakeProvider::new(Ok(None));
        let resolver = FakeResolver::new(vec![
            // The first user's profile resolves much slower than the second's.
            (profile(1, Role::Admin), Duration::from_millis(500)),
            (profile(2, Role::Client), Duration::from_millis(10)),
        ]);
        let store = SessionStore::spawn(provider.clone(), resolver);
        store.settled(Duration::from_secs(1)).await;

        provider.emit(SessionEvent::SignedIn(identity(1)));
        provider.emit(SessionEvent::SignedIn(identity(2)));
        // Let the driver drain both events before awaiting settlement.
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = store.settled(Duration::from_secs(2)).await;
        assert_eq!(state.identity, Some(identity(2)));
        assert_eq!(state.role(), Role::Client);

        // Let the stale resolution for user 1 land; it must be discarded.
        tokio::time::sleep(Duration::from_millis(600)).await;
        let state = store.state();
        assert_eq!(state.identity, Some(identity(2)));
        assert_eq!(state.role(), Role::Client, "slow stale resolution leaked through");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_clears_identity_and_profile() {
        let provider = FakeProvider::new(Ok(Some(identity(1))));
        let resolver = FakeResolver::new(vec![(profile(1, Role::Admin), Duration::ZERO)]);
        let store = SessionStore::spawn(provider.clone(), resolver);
        let state = store.settled(Duration::from_secs(1)).await;
        assert_eq!(state.role(), Role::Admin);

        provider.emit(SessionEvent::SignedOut);
        tokio::time::sleep(Duration::from_millis(1)).await;
        let state = store.settled(Duration::from_secs(1)).await;
        assert_eq!(state, SessionState::anonymous());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_discards_in_flight_resolution() {
        let provider = FakeProvider::new(Ok(None));
        let resolver = FakeResolver::new(vec![(profile(1, Role::Admin), Duration::from_millis(200))]);
        let store = SessionStore::spawn(provider.clone(), resolver);
        store.settled(Duration::from_secs(1)).await;

        provider.emit(SessionEvent::SignedIn(identity(1)));
        provider.emit(SessionEvent::SignedOut);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = store.settled(Duration::from_secs(1)).await;
        assert_eq!(state, SessionState::anonymous());

        // The admin profile finishing late must not resurrect the session.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.state(), SessionState::anonymous());
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_unavailable_stays_resolving() {
        let provider = FakeProvider::new(Err(ProviderError::new("connection refused")));
        let resolver = FakeResolver::new(vec![]);
        let store = SessionStore::spawn(provider, resolver);

        let state = store.settled(Duration::from_millis(100)).await;
        assert!(state.resolving, "provider outage must not settle the session");
        assert_eq!(state.identity, None);
        assert_eq!(state.role(), Role::Unassigned);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_profile_row_settles_anonymous_role() {
        let provider = FakeProvider::new(Ok(Some(identity(7))));
        let resolver = FakeResolver::new(vec![]);
        let store = SessionStore::spawn(provider, resolver);

        let state = store.settled(Duration::from_secs(1)).await;
        assert!(!state.resolving);
        assert_eq!(state.identity, Some(identity(7)));
        assert_eq!(state.profile, None);
        assert_eq!(state.role(), Role::Unassigned);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_refresh_keeps_profile_for_same_user() {
        let provider = FakeProvider::new(Ok(Some(identity(1))));
        let resolver =
            FakeResolver::new(vec![(profile(1, Role::Creative), Duration::from_millis(50))]);
        let store = SessionStore::spawn(provider.clone(), resolver);
        store.settled(Duration::from_secs(1)).await;

        provider.emit(SessionEvent::TokenRefreshed(identity(1)));
        tokio::time::sleep(Duration::from_millis(1)).await;
        // Even mid-resolution the previous profile stays visible, so the UI
        // never flashes unauthenticated on a routine refresh.
        let state = store.state();
        assert_eq!(state.role(), Role::Creative);

        let state = store.settled(Duration::from_secs(1)).await;
        assert_eq!(state.role(), Role::Creative);
    }
}
