//! Data-integrity reconciliation.
//!
//! One [`IntegrityStrategy`] per cached entity kind. A strategy fetches the
//! authoritative snapshot, compares it with the cache using its own
//! equality rule, and on divergence resyncs: the stream for its kind is
//! cancelled, the cache replaced, and a fresh stream opened with the same
//! scope.
//!
//! [`IntegrityCheck`] is the closed set of strategies, dispatched by `match`.

pub mod balances;
pub mod guard;
pub mod orders;
pub mod positions;

use crate::context::AppContext;
use crate::domain::snapshot::{SharedSnapshot, SnapshotEntity};
use crate::error::SdkError;
use crate::shared::{MarketId, SubaccountId};
use crate::source::SnapshotSource;
use crate::stream::{StreamHandle, StreamKind};
use async_trait::async_trait;
use std::collections::HashSet;
use std::hash::Hash;

pub use balances::BalanceIntegrity;
pub use orders::OrderIntegrity;
pub use positions::PositionIntegrity;

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why a validation exited without comparing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    WalletDisconnected,
    NoSubaccount,
    EmptyCache,
    /// Another validation of the same kind is running.
    InFlight,
    /// The backend returned nothing; not treated as corruption.
    EmptyRemote,
    /// The active subaccount changed while the fetch was pending.
    ScopeChanged,
    /// The cache was replaced or cleared while the fetch was pending.
    CacheReplaced,
}

/// Result of one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Skipped(SkipReason),
    /// Cache matches the backend; nothing was mutated.
    Verified,
    /// Cache diverged and was replaced; `stream` is the newly opened stream.
    Resynced { replaced: usize, stream: StreamHandle },
}

impl ValidationOutcome {
    pub fn is_resynced(&self) -> bool {
        matches!(self, ValidationOutcome::Resynced { .. })
    }
}

// ─── Strategy ────────────────────────────────────────────────────────────────

#[async_trait]
pub trait IntegrityStrategy: Send + Sync {
    /// Scope selector the strategy was built with.
    type Args: Send + Sync;
    type Entity: SnapshotEntity;

    /// Stream kind restarted on divergence.
    const KIND: StreamKind;

    fn args(&self) -> &Self::Args;

    /// The cached store this strategy guards.
    fn cache<'c>(&self, ctx: &'c AppContext) -> &'c SharedSnapshot<Self::Entity>;

    /// Fetch the authoritative snapshot for `subaccount_id` within scope.
    async fn fetch_data(
        &self,
        source: &dyn SnapshotSource,
        subaccount_id: &SubaccountId,
    ) -> Result<Vec<Self::Entity>, SdkError>;

    /// Whether `cached` is still consistent with `fresh`.
    fn verify_data(&self, cached: &[Self::Entity], fresh: &[Self::Entity]) -> bool;

    /// Whether a cached entity falls under this strategy's scope selector.
    fn in_scope(&self, _entity: &Self::Entity) -> bool {
        true
    }

    /// Market the restarted stream is scoped to.
    fn stream_market(&self) -> Option<MarketId> {
        None
    }

    async fn validate(&self, ctx: &AppContext) -> Result<ValidationOutcome, SdkError> {
        run_validation(self, ctx).await
    }
}

/// `true` iff every element of `cached` has an element of `fresh` with the
/// same key. Order is irrelevant; an empty `cached` is trivially contained.
pub fn is_subset_by<T, K, F>(cached: &[T], fresh: &[T], key: F) -> bool
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    if cached.is_empty() {
        return true;
    }
    let fresh_keys: HashSet<K> = fresh.iter().map(&key).collect();
    cached.iter().all(|c| fresh_keys.contains(&key(c)))
}

/// The reconciliation flow shared by every strategy.
pub async fn run_validation<S>(strategy: &S, ctx: &AppContext) -> Result<ValidationOutcome, SdkError>
where
    S: IntegrityStrategy + ?Sized,
{
    let kind = S::KIND;

    if !ctx.session().is_connected() {
        return Ok(skip(kind, SkipReason::WalletDisconnected));
    }
    let Some(subaccount_id) = ctx.session().subaccount_id() else {
        return Ok(skip(kind, SkipReason::NoSubaccount));
    };
    let generation = {
        let cache = strategy.cache(ctx).read();
        if cache.is_empty() {
            return Ok(skip(kind, SkipReason::EmptyCache));
        }
        cache.generation()
    };
    let Some(_guard) = ctx.in_flight().try_acquire(kind) else {
        return Ok(skip(kind, SkipReason::InFlight));
    };

    let fresh = strategy.fetch_data(ctx.source(), &subaccount_id).await?;

    if fresh.is_empty() {
        return Ok(skip(kind, SkipReason::EmptyRemote));
    }

    // Held until the new stream is registered. Subaccount switches clear this
    // cache before cancelling streams, so they either show up in the checks
    // below or cancel the stream opened here.
    let mut cache = strategy.cache(ctx).write();

    if ctx.session().subaccount_id().as_ref() != Some(&subaccount_id) {
        return Ok(skip(kind, SkipReason::ScopeChanged));
    }
    if cache.generation() != generation {
        return Ok(skip(kind, SkipReason::CacheReplaced));
    }

    let (in_scope, out_of_scope): (Vec<_>, Vec<_>) = cache
        .entries()
        .iter()
        .cloned()
        .partition(|e| strategy.in_scope(e));

    if strategy.verify_data(&in_scope, &fresh) {
        tracing::debug!(kind = %kind, cached = in_scope.len(), "Cache verified");
        return Ok(ValidationOutcome::Verified);
    }

    tracing::info!(
        kind = %kind,
        subaccount = %subaccount_id,
        cached = in_scope.len(),
        fresh = fresh.len(),
        "Cache diverged from backend, resyncing"
    );

    let replaced = fresh.len();
    cache.mark_diverged();
    ctx.streams().cancel_if_exists(kind);

    let mut next = out_of_scope;
    next.extend(fresh);
    cache.replace(next);

    let stream = ctx.open_stream(kind, strategy.stream_market(), Some(subaccount_id))?;
    drop(cache);

    Ok(ValidationOutcome::Resynced { replaced, stream })
}

fn skip(kind: StreamKind, reason: SkipReason) -> ValidationOutcome {
    tracing::debug!(kind = %kind, reason = ?reason, "Validation skipped");
    ValidationOutcome::Skipped(reason)
}

// ─── Closed set of strategies ────────────────────────────────────────────────

/// One strategy per entity kind, dispatched explicitly.
#[derive(Debug, Clone)]
pub enum IntegrityCheck {
    Positions(PositionIntegrity),
    Balances(BalanceIntegrity),
    Orders(OrderIntegrity),
}

impl IntegrityCheck {
    /// Unscoped checks for every entity kind.
    pub fn all() -> Vec<IntegrityCheck> {
        vec![
            IntegrityCheck::Positions(PositionIntegrity::default()),
            IntegrityCheck::Balances(BalanceIntegrity::default()),
            IntegrityCheck::Orders(OrderIntegrity::default()),
        ]
    }

    pub fn kind(&self) -> StreamKind {
        match self {
            IntegrityCheck::Positions(_) => PositionIntegrity::KIND,
            IntegrityCheck::Balances(_) => BalanceIntegrity::KIND,
            IntegrityCheck::Orders(_) => OrderIntegrity::KIND,
        }
    }

    pub async fn validate(&self, ctx: &AppContext) -> Result<ValidationOutcome, SdkError> {
        match self {
            IntegrityCheck::Positions(s) => s.validate(ctx).await,
            IntegrityCheck::Balances(s) => s.validate(ctx).await,
            IntegrityCheck::Orders(s) => s.validate(ctx).await,
        }
    }
}
