//! PostgreSQL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::errors::{StorageError, StorageResult};
use super::repository::{MatchRepository, TournamentRepository};
use crate::matches::models::{EventId, Match, MatchId, NewMatch, NewScoreEvent, ScoreEvent};
use crate::sport::SportConfig;
use crate::tournament::models::{
    Group, NewGroup, NewTeam, NewTournament, Schedule, SeedUpdate, Team, Tournament,
    TournamentId,
};

const MATCH_COLUMNS: &str = "id, tournament_id, home_team_id, away_team_id, home_score, away_score,
     home_period_scores, away_period_scores, current_period, stage, round, match_number,
     group_id, status, winner_id, is_bye, started_at, ended_at";

const EVENT_COLUMNS: &str = "id, match_id, team_side, points, period, action, undone, created_at";

/// Counts are stored as INTEGER
fn to_db(value: u32, column: &'static str) -> StorageResult<i32> {
    i32::try_from(value).map_err(|_| StorageError::OutOfRange { column, value })
}

fn from_db(value: i32, column: &str) -> StorageResult<u32> {
    u32::try_from(value).map_err(|_| StorageError::Corrupt(format!("negative {column}: {value}")))
}

fn parse<T: std::str::FromStr<Err = String>>(raw: &str) -> StorageResult<T> {
    raw.parse().map_err(StorageError::Corrupt)
}

fn period_scores(raw: Vec<i32>, column: &str) -> StorageResult<Vec<u32>> {
    raw.into_iter().map(|v| from_db(v, column)).collect()
}

fn map_tournament(row: &PgRow) -> StorageResult<Tournament> {
    let format: String = row.try_get("format")?;
    let Json(sport): Json<SportConfig> = row.try_get("sport")?;
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        format: parse(&format)?,
        sport,
        created_at: row.try_get("created_at")?,
    })
}

fn map_team(row: &PgRow) -> StorageResult<Team> {
    Ok(Team {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        name: row.try_get("name")?,
        short_name: row.try_get("short_name")?,
        seed: row.try_get("seed")?,
        group_id: row.try_get("group_id")?,
    })
}

fn map_group(row: &PgRow) -> StorageResult<Group> {
    Ok(Group {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        name: row.try_get("name")?,
        team_ids: row.try_get("team_ids")?,
    })
}

fn map_match(row: &PgRow) -> StorageResult<Match> {
    let stage: String = row.try_get("stage")?;
    let status: String = row.try_get("status")?;
    Ok(Match {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        home_team_id: row.try_get("home_team_id")?,
        away_team_id: row.try_get("away_team_id")?,
        home_score: from_db(row.try_get("home_score")?, "home_score")?,
        away_score: from_db(row.try_get("away_score")?, "away_score")?,
        home_period_scores: period_scores(row.try_get("home_period_scores")?, "home_period_scores")?,
        away_period_scores: period_scores(row.try_get("away_period_scores")?, "away_period_scores")?,
        current_period: from_db(row.try_get("current_period")?, "current_period")?,
        stage: parse(&stage)?,
        round: from_db(row.try_get("round")?, "round")?,
        match_number: from_db(row.try_get("match_number")?, "match_number")?,
        group_id: row.try_get("group_id")?,
        status: parse(&status)?,
        winner_id: row.try_get("winner_id")?,
        is_bye: row.try_get("is_bye")?,
        started_at: row.try_get::<Option<DateTime<Utc>>, _>("started_at")?,
        ended_at: row.try_get::<Option<DateTime<Utc>>, _>("ended_at")?,
    })
}

fn map_event(row: &PgRow) -> StorageResult<ScoreEvent> {
    let side: String = row.try_get("team_side")?;
    Ok(ScoreEvent {
        id: row.try_get("id")?,
        match_id: row.try_get("match_id")?,
        team_side: parse(&side)?,
        points: from_db(row.try_get("points")?, "points")?,
        period: from_db(row.try_get("period")?, "period")?,
        action: row.try_get("action")?,
        undone: row.try_get("undone")?,
        created_at: row.try_get("created_at")?,
    })
}

fn period_column(scores: &[u32], column: &'static str) -> StorageResult<Vec<i32>> {
    scores.iter().map(|&v| to_db(v, column)).collect()
}

/// Write the mutable columns of `m` through any executor
async fn write_match<'e, E>(executor: E, m: &Match) -> StorageResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE matches
        SET home_score = $2, away_score = $3, home_period_scores = $4, away_period_scores = $5,
            current_period = $6, status = $7, winner_id = $8, started_at = $9, ended_at = $10
        WHERE id = $1
        "#,
    )
    .bind(m.id)
    .bind(to_db(m.home_score, "home_score")?)
    .bind(to_db(m.away_score, "away_score")?)
    .bind(period_column(&m.home_period_scores, "home_period_scores")?)
    .bind(period_column(&m.away_period_scores, "away_period_scores")?)
    .bind(to_db(m.current_period, "current_period")?)
    .bind(m.status.as_str())
    .bind(m.winner_id)
    .bind(m.started_at)
    .bind(m.ended_at)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Match", m.id));
    }
    Ok(())
}

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn create_tournament(&self, tournament: &NewTournament) -> StorageResult<Tournament> {
        let row = sqlx::query(
            r#"
            INSERT INTO tournaments (name, format, sport)
            VALUES ($1, $2, $3)
            RETURNING id, name, format, sport, created_at
            "#,
        )
        .bind(&tournament.name)
        .bind(tournament.format.as_str())
        .bind(Json(&tournament.sport))
        .fetch_one(&self.pool)
        .await?;

        map_tournament(&row)
    }

    async fn get_tournament(&self, id: TournamentId) -> StorageResult<Option<Tournament>> {
        let row = sqlx::query(
            "SELECT id, name, format, sport, created_at FROM tournaments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_tournament).transpose()
    }

    async fn list_tournaments(&self) -> StorageResult<Vec<Tournament>> {
        let rows =
            sqlx::query("SELECT id, name, format, sport, created_at FROM tournaments ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(map_tournament).collect()
    }

    async fn add_team(&self, tournament_id: TournamentId, team: &NewTeam) -> StorageResult<Team> {
        if self.get_tournament(tournament_id).await?.is_none() {
            return Err(StorageError::not_found("Tournament", tournament_id));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO teams (tournament_id, name, short_name, seed)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tournament_id, name, short_name, seed, group_id
            "#,
        )
        .bind(tournament_id)
        .bind(&team.name)
        .bind(&team.short_name)
        .bind(team.seed)
        .fetch_one(&self.pool)
        .await?;

        map_team(&row)
    }

    async fn list_teams(&self, tournament_id: TournamentId) -> StorageResult<Vec<Team>> {
        let rows = sqlx::query(
            "SELECT id, tournament_id, name, short_name, seed, group_id
             FROM teams WHERE tournament_id = $1 ORDER BY id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_team).collect()
    }

    async fn update_seeds(
        &self,
        tournament_id: TournamentId,
        updates: &[SeedUpdate],
    ) -> StorageResult<Vec<Team>> {
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let result =
                sqlx::query("UPDATE teams SET seed = $1 WHERE id = $2 AND tournament_id = $3")
                    .bind(update.seed)
                    .bind(update.team_id)
                    .bind(tournament_id)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(StorageError::not_found("Team", update.team_id));
            }
        }

        tx.commit().await?;
        self.list_teams(tournament_id).await
    }

    async fn list_groups(&self, tournament_id: TournamentId) -> StorageResult<Vec<Group>> {
        let rows = sqlx::query(
            "SELECT id, tournament_id, name, team_ids FROM tournament_groups WHERE tournament_id = $1 ORDER BY id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_group).collect()
    }

    async fn replace_schedule(
        &self,
        tournament_id: TournamentId,
        groups: Vec<NewGroup>,
        matches: Vec<NewMatch>,
    ) -> StorageResult<Schedule> {
        let mut tx = self.pool.begin().await?;

        // Lock the tournament row so concurrent regenerations serialize
        let exists = sqlx::query("SELECT id FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StorageError::not_found("Tournament", tournament_id));
        }

        // Score events go with their matches (ON DELETE CASCADE)
        sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE teams SET group_id = NULL WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tournament_groups WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        let mut schedule = Schedule::default();
        for group in groups {
            let row = sqlx::query(
                r#"
                INSERT INTO tournament_groups (tournament_id, name, team_ids)
                VALUES ($1, $2, $3)
                RETURNING id, tournament_id, name, team_ids
                "#,
            )
            .bind(tournament_id)
            .bind(&group.name)
            .bind(&group.team_ids)
            .fetch_one(&mut *tx)
            .await?;
            let stored = map_group(&row)?;

            sqlx::query("UPDATE teams SET group_id = $1 WHERE id = ANY($2)")
                .bind(stored.id)
                .bind(&stored.team_ids)
                .execute(&mut *tx)
                .await?;
            schedule.groups.push(stored);
        }

        for new_match in matches {
            let group_id = new_match
                .group_index
                .and_then(|i| schedule.groups.get(i))
                .map(|g| g.id);
            let row = sqlx::query(&format!(
                r#"
                INSERT INTO matches (tournament_id, home_team_id, away_team_id, stage, round,
                                     match_number, group_id, is_bye)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {MATCH_COLUMNS}
                "#
            ))
            .bind(tournament_id)
            .bind(new_match.home_team_id)
            .bind(new_match.away_team_id)
            .bind(new_match.stage.as_str())
            .bind(to_db(new_match.round, "round")?)
            .bind(to_db(new_match.match_number, "match_number")?)
            .bind(group_id)
            .bind(new_match.is_bye)
            .fetch_one(&mut *tx)
            .await?;
            schedule.matches.push(map_match(&row)?);
        }

        tx.commit().await?;
        Ok(schedule)
    }
}

#[async_trait]
impl MatchRepository for PgStore {
    async fn get_match(&self, id: MatchId) -> StorageResult<Option<Match>> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_match).transpose()
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> StorageResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 ORDER BY match_number, id"
        ))
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_match).collect()
    }

    async fn sport_for_match(&self, id: MatchId) -> StorageResult<Option<SportConfig>> {
        let row = sqlx::query(
            "SELECT t.sport FROM matches m JOIN tournaments t ON t.id = m.tournament_id WHERE m.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let Json(sport): Json<SportConfig> = row.try_get("sport")?;
                Ok(Some(sport))
            }
            None => Ok(None),
        }
    }

    async fn update_match(&self, m: &Match) -> StorageResult<()> {
        write_match(&self.pool, m).await
    }

    async fn record_score(&self, m: &Match, event: NewScoreEvent) -> StorageResult<ScoreEvent> {
        let mut tx = self.pool.begin().await?;

        write_match(&mut *tx, m).await?;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO score_events (match_id, team_side, points, period, action)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.match_id)
        .bind(event.team_side.as_str())
        .bind(to_db(event.points, "points")?)
        .bind(to_db(event.period, "period")?)
        .bind(&event.action)
        .fetch_one(&mut *tx)
        .await?;
        let stored = map_event(&row)?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn latest_active_event(&self, match_id: MatchId) -> StorageResult<Option<ScoreEvent>> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM score_events
             WHERE match_id = $1 AND NOT undone ORDER BY id DESC LIMIT 1"
        ))
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_event).transpose()
    }

    async fn undo_event(&self, m: &Match, event_id: EventId) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        let flagged = sqlx::query("UPDATE score_events SET undone = TRUE WHERE id = $1 AND match_id = $2")
            .bind(event_id)
            .bind(m.id)
            .execute(&mut *tx)
            .await?;
        if flagged.rows_affected() == 0 {
            return Err(StorageError::not_found("Score event", event_id));
        }
        write_match(&mut *tx, m).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_events(&self, match_id: MatchId) -> StorageResult<Vec<ScoreEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM score_events WHERE match_id = $1 ORDER BY id"
        ))
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_event).collect()
    }

    async fn delete_match(&self, id: MatchId) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Match", id));
        }
        Ok(())
    }
}
