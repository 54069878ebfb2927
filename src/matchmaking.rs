//! Match ranking & replacement: score the candidate pool, filter, rank,
//! truncate, and atomically replace the requester's persisted match set.

use crate::errors::{AppError, ResultExt};
use crate::match_storage::MatchStorage;
use crate::models::{Profile, ScoredCandidate};
use crate::scoring::CompatibilityScorer;
use sqlx::PgPool;
use std::time::Duration;

/// Candidates scoring at or below this are discarded. Policy constant, not
/// configuration.
pub const MIN_SCORE_THRESHOLD: u32 = 30;

/// At most this many ranked candidates survive a rebuild.
pub const MAX_MATCHES: usize = 10;

/// Upper bound on one full rebuild (pool fetch + scoring + replace).
pub const REBUILD_TIMEOUT: Duration = Duration::from_secs(30);

/// Score, filter, rank, and truncate a fully materialized candidate pool.
///
/// Pure: the requester is excluded defensively, survivors score strictly
/// above [`MIN_SCORE_THRESHOLD`], and ties are broken by candidate id
/// ascending so the result never depends on pool fetch order.
pub fn select_matches(
    scorer: &CompatibilityScorer,
    requester: &Profile,
    pool: &[Profile],
) -> Vec<ScoredCandidate> {
    let mut selected: Vec<ScoredCandidate> = pool
        .iter()
        .filter(|candidate| candidate.user_id != requester.user_id)
        .map(|candidate| scorer.score(requester, candidate))
        .filter(|scored| scored.score > MIN_SCORE_THRESHOLD)
        .collect();

    selected.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    selected.truncate(MAX_MATCHES);
    selected
}

/// Orchestrates one rebuild per requester: fetch pool, score, replace.
///
/// Invoked per profile-change trigger; there is no internal scheduler.
/// Same-requester invocations serialize on the storage layer's advisory
/// lock, different requesters run fully in parallel.
pub struct MatchmakingService {
    storage: MatchStorage,
    scorer: CompatibilityScorer,
}

impl MatchmakingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            storage: MatchStorage::new(pool),
            scorer: CompatibilityScorer::new(),
        }
    }

    /// Rebuild the requester's active match set, returning how many match
    /// rows were written. Zero survivors is a valid terminal outcome, not an
    /// error.
    ///
    /// The whole call is bounded by [`REBUILD_TIMEOUT`]; on expiry the
    /// transaction never committed and the previous match set is intact.
    pub async fn rebuild(
        &self,
        requester_id: &str,
        requester: &Profile,
    ) -> Result<usize, AppError> {
        tokio::time::timeout(REBUILD_TIMEOUT, self.rebuild_inner(requester_id, requester))
            .await
            .map_err(|_| {
                AppError::InternalError(format!(
                    "Match rebuild timed out after {}s for user {}",
                    REBUILD_TIMEOUT.as_secs(),
                    requester_id
                ))
            })?
    }

    async fn rebuild_inner(
        &self,
        requester_id: &str,
        requester: &Profile,
    ) -> Result<usize, AppError> {
        tracing::info!("Starting match rebuild for user {}", requester_id);

        // The pool is fully materialized in memory for scoring; for very
        // large pools this is the scalability ceiling of the design.
        let pool = self
            .storage
            .fetch_candidate_pool(requester_id)
            .await
            .context(format!("Fetching candidate pool for user {}", requester_id))?;
        tracing::debug!(
            "Fetched {} candidate(s) for user {}",
            pool.len(),
            requester_id
        );

        let selected = select_matches(&self.scorer, requester, &pool);
        tracing::info!(
            "Selected {} of {} candidate(s) for user {} (threshold {}, cap {})",
            selected.len(),
            pool.len(),
            requester_id,
            MIN_SCORE_THRESHOLD,
            MAX_MATCHES
        );
        for scored in &selected {
            tracing::debug!(
                "  {} scored {}: {}",
                scored.user_id,
                scored.score,
                scored.display_reasons().join("; ")
            );
        }

        self.storage
            .replace_active_matches(requester_id, &selected)
            .await
            .context(format!("Replacing match set for user {}", requester_id))?;

        Ok(selected.len())
    }
}
