// src/db/report_repo.rs

use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    db::report_query::period_query,
    models::{
        period::PeriodFilter,
        report::{ReportDefinition, ReportFilters, RollupRow},
    },
};

// Read-only access to the reporting tables.
#[derive(Clone)]
pub struct ReportRepository {
    pool: MySqlPool,
}

impl ReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// One period's rows at kabupaten grain, with ancestor totals.
    pub async fn fetch_period(
        &self,
        definition: &ReportDefinition,
        period: &PeriodFilter,
        filters: &ReportFilters,
    ) -> Result<Vec<RollupRow>, AppError> {
        let mut query = period_query(definition, period, filters);

        let rows = query
            .build_query_as::<RollupRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
