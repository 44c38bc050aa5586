//! Seed the catalog from a JSON file.
//!
//! Leagues, teams and jersey types are upserted by name, so re-running a
//! file is safe. Jerseys are always inserted.
//!
//! # Usage
//!
//! ```bash
//! js-cli seed crates/cli/fixtures/demo_catalog.json
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use jersey_shop_cart_api::db;
use jersey_shop_core::Price;

use super::{CommandError, database_url};

#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    pub leagues: Vec<SeedLeague>,
    pub jersey_types: Vec<SeedJerseyType>,
    pub jerseys: Vec<SeedJersey>,
}

#[derive(Debug, Deserialize)]
pub struct SeedLeague {
    pub name: String,
    pub teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedJerseyType {
    pub name: String,
    pub original_price: Price,
    pub current_price: Price,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedJersey {
    pub team: String,
    pub season: String,
    pub jersey_type: String,
    pub main_color: String,
    pub description: Option<String>,
}

impl SeedCatalog {
    /// Check that every jersey names a known team and jersey type.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let teams: Vec<&str> = self
            .leagues
            .iter()
            .flat_map(|l| l.teams.iter().map(String::as_str))
            .collect();
        let types: Vec<&str> = self.jersey_types.iter().map(|t| t.name.as_str()).collect();

        let mut errors = Vec::new();
        for (i, jersey) in self.jerseys.iter().enumerate() {
            if !teams.contains(&jersey.team.as_str()) {
                errors.push(format!("jerseys[{i}]: unknown team '{}'", jersey.team));
            }
            if !types.contains(&jersey.jersey_type.as_str()) {
                errors.push(format!(
                    "jerseys[{i}]: unknown jersey type '{}'",
                    jersey.jersey_type
                ));
            }
        }
        for jersey_type in &self.jersey_types {
            if jersey_type.current_price.amount().is_sign_negative() {
                errors.push(format!("jersey type '{}': negative price", jersey_type.name));
            }
        }
        errors
    }
}

/// Seed the catalog from `file_path`.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or if a database
/// operation fails.
pub async fn catalog(file_path: &Path) -> Result<(), CommandError> {
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|e| CommandError::Invalid(format!("{}: {e}", file_path.display())))?;
    let catalog: SeedCatalog = serde_json::from_str(&content)
        .map_err(|e| CommandError::Invalid(format!("{}: {e}", file_path.display())))?;

    let errors = catalog.validate();
    if !errors.is_empty() {
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(CommandError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }

    let pool = db::create_pool(&database_url()?).await?;
    info!("Connected to database");

    let inserted = insert_catalog(&pool, &catalog).await?;
    info!(
        leagues = catalog.leagues.len(),
        jersey_types = catalog.jersey_types.len(),
        jerseys = inserted,
        "Seeding complete!"
    );
    Ok(())
}

async fn insert_catalog(pool: &PgPool, catalog: &SeedCatalog) -> Result<usize, CommandError> {
    let mut tx = pool.begin().await?;

    let mut team_ids: HashMap<&str, i32> = HashMap::new();
    for league in &catalog.leagues {
        let league_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO catalog.league (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(&league.name)
        .fetch_one(&mut *tx)
        .await?;

        for team in &league.teams {
            let team_id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO catalog.team (name, league_id) VALUES ($1, $2)
                ON CONFLICT (name) DO UPDATE SET league_id = EXCLUDED.league_id
                RETURNING id
                ",
            )
            .bind(team)
            .bind(league_id)
            .fetch_one(&mut *tx)
            .await?;
            team_ids.insert(team.as_str(), team_id);
        }
    }

    let mut type_ids: HashMap<&str, i32> = HashMap::new();
    for jersey_type in &catalog.jersey_types {
        let type_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO catalog.jersey_type (name, original_price, current_price, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE SET
                original_price = EXCLUDED.original_price,
                current_price = EXCLUDED.current_price,
                description = EXCLUDED.description
            RETURNING id
            ",
        )
        .bind(&jersey_type.name)
        .bind(jersey_type.original_price)
        .bind(jersey_type.current_price)
        .bind(&jersey_type.description)
        .fetch_one(&mut *tx)
        .await?;
        type_ids.insert(jersey_type.name.as_str(), type_id);
    }

    for jersey in &catalog.jerseys {
        // validate() guarantees both lookups succeed
        let (Some(team_id), Some(type_id)) = (
            team_ids.get(jersey.team.as_str()),
            type_ids.get(jersey.jersey_type.as_str()),
        ) else {
            continue;
        };
        sqlx::query(
            r"
            INSERT INTO catalog.jersey (team_id, season, jersey_type_id, main_color, description)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(team_id)
        .bind(&jersey.season)
        .bind(type_id)
        .bind(&jersey.main_color)
        .bind(&jersey.description)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(catalog.jerseys.len())
}
