//! Public catalog reads.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use jersey_shop_core::{Jersey, JerseyId, JerseyTypeId, LeagueId, Page, TeamId};

use crate::db::catalog::JerseySort;
use crate::db::{CatalogRepository, JerseyFilter};
use crate::error::{AppError, Result};
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// Query string for the jersey listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub team_id: Option<TeamId>,
    pub league_id: Option<LeagueId>,
    pub jersey_type_id: Option<JerseyTypeId>,
    pub main_color: Option<String>,
    #[serde(default, rename = "sort_by")]
    pub sort: JerseySort,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListParams {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    fn filter(&self) -> JerseyFilter {
        JerseyFilter {
            search: self.search.clone(),
            team_id: self.team_id,
            league_id: self.league_id,
            jersey_type_id: self.jersey_type_id,
            main_color: self.main_color.clone(),
            sort: self.sort,
        }
    }
}

fn total_pages(total: u64, limit: u32) -> u32 {
    u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
}

/// List jerseys, one page at a time.
#[instrument(skip(state))]
pub async fn list_jerseys(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Jersey>>> {
    let (page, limit) = (params.page(), params.limit());
    let (data, total) = CatalogRepository::new(state.pool())
        .list_jerseys(&params.filter(), page, limit)
        .await?;

    Ok(Json(Page {
        data,
        total,
        page,
        total_pages: total_pages(total, limit),
    }))
}

/// Get one jersey.
#[instrument(skip(state))]
pub async fn get_jersey(
    State(state): State<AppState>,
    Path(id): Path<JerseyId>,
) -> Result<Json<Jersey>> {
    CatalogRepository::new(state.pool())
        .get_jersey(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Jersey not found".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults_and_bounds() {
        let params = ListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_LIMIT);

        let params = ListParams {
            page: Some(0),
            limit: Some(5000),
            ..ListParams::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_LIMIT);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }
}
