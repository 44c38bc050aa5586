//! Catalog reads.
//!
//! Jerseys are assembled from a joined row (team name, jersey type) plus a
//! second query for their images, which keeps the row count at one per
//! jersey.

use std::collections::HashMap;

use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use jersey_shop_core::{
    Jersey, JerseyId, JerseyImage, JerseyType, JerseyTypeId, LeagueId, Price, TeamId,
};

use super::RepositoryError;

const JERSEY_SELECT: &str = r"
    SELECT j.id, j.team_id, t.name AS team_name, j.season, j.jersey_type_id,
           jt.name AS type_name, jt.original_price, jt.current_price,
           jt.description AS type_description,
           j.main_color, j.description
    FROM catalog.jersey j
    LEFT JOIN catalog.team t ON t.id = j.team_id
    LEFT JOIN catalog.jersey_type jt ON jt.id = j.jersey_type_id
";

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JerseySort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

/// Filters for [`CatalogRepository::list_jerseys`].
#[derive(Debug, Clone, Default)]
pub struct JerseyFilter {
    /// Matches team name, season or description, case-insensitively.
    pub search: Option<String>,
    pub team_id: Option<TeamId>,
    pub league_id: Option<LeagueId>,
    pub jersey_type_id: Option<JerseyTypeId>,
    /// Exact match.
    pub main_color: Option<String>,
    pub sort: JerseySort,
}

#[derive(FromRow)]
struct JerseyRow {
    id: JerseyId,
    team_id: TeamId,
    team_name: Option<String>,
    season: String,
    jersey_type_id: JerseyTypeId,
    type_name: Option<String>,
    original_price: Option<Price>,
    current_price: Option<Price>,
    type_description: Option<String>,
    main_color: String,
    description: Option<String>,
}

impl JerseyRow {
    fn into_jersey(self, images: Vec<JerseyImage>) -> Jersey {
        let jersey_type = match (self.type_name, self.original_price, self.current_price) {
            (Some(name), Some(original_price), Some(current_price)) => Some(JerseyType {
                id: Some(self.jersey_type_id),
                name,
                original_price,
                current_price,
                description: self.type_description,
            }),
            _ => None,
        };

        Jersey {
            id: self.id,
            team_id: self.team_id,
            team_name: self.team_name,
            season: self.season,
            jersey_type_id: self.jersey_type_id,
            jersey_type,
            main_color: self.main_color,
            description: self.description,
            images,
        }
    }
}

#[derive(FromRow)]
struct ImageRow {
    jersey_id: JerseyId,
    image_base64: String,
    is_main: bool,
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get one jersey with its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_jersey(&self, id: JerseyId) -> Result<Option<Jersey>, RepositoryError> {
        Ok(self.get_jerseys(&[id]).await?.remove(&id))
    }

    /// Get several jerseys by id. Missing ids are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_jerseys(
        &self,
        ids: &[JerseyId],
    ) -> Result<HashMap<JerseyId, Jersey>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let raw_ids: Vec<i32> = ids.iter().map(JerseyId::as_i32).collect();

        let rows: Vec<JerseyRow> =
            sqlx::query_as(&format!("{JERSEY_SELECT} WHERE j.id = ANY($1)"))
                .bind(&raw_ids)
                .fetch_all(self.pool)
                .await?;

        let mut images = self.images_for(&raw_ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                (id, row.into_jersey(images.remove(&id).unwrap_or_default()))
            })
            .collect())
    }

    /// List jerseys matching `filter`, one page at a time.
    ///
    /// Returns the page and the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_jerseys(
        &self,
        filter: &JerseyFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Jersey>, u64), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM catalog.jersey j \
             LEFT JOIN catalog.team t ON t.id = j.team_id \
             LEFT JOIN catalog.jersey_type jt ON jt.id = j.jersey_type_id",
        );
        push_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(JERSEY_SELECT);
        push_filters(&mut query, filter);
        query.push(match filter.sort {
            JerseySort::Newest => " ORDER BY j.created_at DESC, j.id DESC",
            JerseySort::PriceAsc => " ORDER BY jt.current_price ASC, j.id",
            JerseySort::PriceDesc => " ORDER BY jt.current_price DESC, j.id",
        });
        query
            .push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(page.saturating_sub(1)) * i64::from(limit));

        let rows = query.build_query_as::<JerseyRow>().fetch_all(self.pool).await?;
        let raw_ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let mut images = self.images_for(&raw_ids).await?;

        let jerseys = rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_jersey(images.remove(&id).unwrap_or_default())
            })
            .collect();

        let total = u64::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative count {total}")))?;
        Ok((jerseys, total))
    }

    async fn images_for(
        &self,
        raw_ids: &[i32],
    ) -> Result<HashMap<JerseyId, Vec<JerseyImage>>, RepositoryError> {
        if raw_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT jersey_id, image_base64, is_main
            FROM catalog.jersey_image
            WHERE jersey_id = ANY($1)
            ORDER BY jersey_id, is_main DESC, id
            ",
        )
        .bind(raw_ids)
        .fetch_all(self.pool)
        .await?;

        let mut images: HashMap<JerseyId, Vec<JerseyImage>> = HashMap::new();
        for row in rows {
            images.entry(row.jersey_id).or_default().push(JerseyImage {
                image_base64: row.image_base64,
                is_main: row.is_main,
            });
        }
        Ok(images)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &JerseyFilter) {
    query.push(" WHERE TRUE");
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        query
            .push(" AND (t.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.season ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(team_id) = filter.team_id {
        query.push(" AND j.team_id = ").push_bind(team_id.as_i32());
    }
    if let Some(league_id) = filter.league_id {
        query.push(" AND t.league_id = ").push_bind(league_id.as_i32());
    }
    if let Some(jersey_type_id) = filter.jersey_type_id {
        query
            .push(" AND j.jersey_type_id = ")
            .push_bind(jersey_type_id.as_i32());
    }
    if let Some(main_color) = filter.main_color.as_deref().filter(|c| !c.is_empty()) {
        query.push(" AND j.main_color = ").push_bind(main_color.to_owned());
    }
}
