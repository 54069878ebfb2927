use crate::errors::AppError;
use crate::models::{MatchPair, MatchRecord, Preferences, Profile, ScoredCandidate};
use sqlx::{FromRow, PgPool};

/// Storage layer for profiles (read-only) and match rows (delete + insert
/// only).
///
/// Match rows are the engine's single persistence sink: they are written
/// exclusively through [`replace_active_matches`](Self::replace_active_matches),
/// one batch per requester, inside one transaction. No other table is
/// touched and nothing here emits events.
pub struct MatchStorage {
    pool: PgPool,
}

/// Flat row shape of `core.profiles`; NULLs anywhere are expected and map to
/// zero-credit factors during scoring.
#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: String,
    age: Option<i32>,
    gender: Option<String>,
    location: Option<String>,
    interests: Option<Vec<String>>,
    values_text: Option<String>,
    relationship_goal: Option<String>,
    pref_age_min: Option<i32>,
    pref_age_max: Option<i32>,
    pref_gender: Option<String>,
    pref_goal: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            age: row.age,
            gender: row.gender,
            location: row.location,
            interests: row.interests.unwrap_or_default(),
            values: row.values_text.unwrap_or_default(),
            relationship_goal: row.relationship_goal.unwrap_or_default(),
            preferences: Preferences {
                age_min: row.pref_age_min,
                age_max: row.pref_age_max,
                gender: row.pref_gender,
                relationship_goal: row.pref_goal,
            },
        }
    }
}

impl MatchStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch every profile except the requester's own.
    pub async fn fetch_candidate_pool(&self, requester_id: &str) -> Result<Vec<Profile>, AppError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, age, gender, location, interests, values_text,
                   relationship_goal, pref_age_min, pref_age_max, pref_gender, pref_goal
            FROM core.profiles
            WHERE user_id <> $1
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    /// Fetch a single stored profile, for manually triggered rebuilds.
    pub async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, age, gender, location, interests, values_text,
                   relationship_goal, pref_age_min, pref_age_max, pref_gender, pref_goal
            FROM core.profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Atomically supersede the requester's active match set.
    ///
    /// One transaction: take a per-requester advisory lock (serializes
    /// overlapping rebuilds for the same user), clear every active row where
    /// the requester appears in either canonical position, then insert one
    /// canonical row per survivor. A failure anywhere rolls the whole thing
    /// back, so a mid-failure can never leave the requester matchless when
    /// they previously had valid matches.
    pub async fn replace_active_matches(
        &self,
        requester_id: &str,
        selected: &[ScoredCandidate],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(requester_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM core.match_records
            WHERE active AND (user_a = $1 OR user_b = $1)
            "#,
        )
        .bind(requester_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let now = chrono::Utc::now();
        for candidate in selected {
            let pair = MatchPair::new(requester_id, &candidate.user_id);
            sqlx::query(
                r#"
                INSERT INTO core.match_records (user_a, user_b, score, created_at, active)
                VALUES ($1, $2, $3, $4, true)
                "#,
            )
            .bind(&pair.first)
            .bind(&pair.second)
            .bind(candidate.score as i32)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Replaced match set for user {}: {} row(s) cleared, {} written",
            requester_id,
            deleted,
            selected.len()
        );
        Ok(())
    }

    /// Active match rows for a user, best score first.
    pub async fn fetch_active_matches(&self, user_id: &str) -> Result<Vec<MatchRecord>, AppError> {
        let records = sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT user_a, user_b, score, created_at, active
            FROM core.match_records
            WHERE active AND (user_a = $1 OR user_b = $1)
            ORDER BY score DESC, user_a, user_b
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
