// src/services/report_service.rs

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::{
        period::{PeriodWindow, ReportPeriod},
        report::{
            ReportData, ReportFilters, ReportKind, ReportResponse, ReportSummary, ReportView, RollupRow,
        },
    },
    services::{period, rollup},
};

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    pub fn catalog(&self) -> Vec<ReportSummary> {
        ReportKind::ALL
            .iter()
            .map(|kind| ReportSummary::from(kind.definition()))
            .collect()
    }

    /// Runs the six period queries concurrently and merges them into one
    /// report. The first database error aborts the whole report.
    pub async fn build(
        &self,
        kind: ReportKind,
        reference_date: NaiveDate,
        filters: ReportFilters,
        view: ReportView,
    ) -> Result<ReportResponse, AppError> {
        let definition = kind.definition();
        let window = period::resolve(reference_date);

        tracing::info!(
            report = kind.slug(),
            date = %reference_date,
            filters = ?filters,
            "building report"
        );

        let fetch = |period: ReportPeriod| {
            let filter = window.filter_for(period);
            let filters = &filters;
            async move {
                let rows = self.repo.fetch_period(definition, &filter, filters).await?;
                tracing::debug!(period = period.label(), rows = rows.len(), "period fetched");
                Ok::<_, AppError>((period, rows))
            }
        };

        let (target, mtd, prev_month, prev_year, ytd, prev_ytd) = tokio::try_join!(
            fetch(ReportPeriod::Target),
            fetch(ReportPeriod::Mtd),
            fetch(ReportPeriod::PrevMonth),
            fetch(ReportPeriod::PrevYear),
            fetch(ReportPeriod::Ytd),
            fetch(ReportPeriod::PrevYtd),
        )?;

        let sets = vec![target, mtd, prev_month, prev_year, ytd, prev_ytd];
        let row_count: usize = sets.iter().map(|(_, rows)| rows.len()).sum();
        let data = assemble(sets, &window, view);

        tracing::info!(report = kind.slug(), rows = row_count, "report merged");

        Ok(ReportResponse {
            report: kind,
            title: definition.title.to_string(),
            unit: definition.unit,
            period: window,
            filters,
            data,
        })
    }
}

/// Merges the fetched result sets and renders them in the requested view.
pub fn assemble(
    sets: Vec<(ReportPeriod, Vec<RollupRow>)>,
    window: &PeriodWindow,
    view: ReportView,
) -> ReportData {
    let tree = rollup::merge(sets, window);
    match view {
        ReportView::Tree => ReportData::Tree(tree),
        ReportView::Flat => ReportData::Flat(rollup::flatten(&tree)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geo::GeoLevel;
    use rust_decimal::Decimal;

    fn row(kabupaten: &str, cluster: &str, value: i64) -> RollupRow {
        let value = Some(Decimal::from(value));
        RollupRow {
            regional: "PUMA".into(),
            branch: "TIMIKA".into(),
            subbranch: "MERAUKE".into(),
            cluster: cluster.into(),
            kabupaten: kabupaten.into(),
            kabupaten_value: value,
            cluster_value: value,
            subbranch_value: value,
            branch_value: value,
            regional_value: value,
        }
    }

    // One distinct value per period so a crossed wire shows up.
    fn six_sets() -> Vec<(ReportPeriod, Vec<RollupRow>)> {
        vec![
            (ReportPeriod::Target, vec![row("ASMAT", "MERAUKE", 1000)]),
            (ReportPeriod::Mtd, vec![row("ASMAT", "MERAUKE", 600)]),
            (ReportPeriod::PrevMonth, vec![row("ASMAT", "MERAUKE", 500)]),
            (ReportPeriod::PrevYear, vec![row("ASMAT", "MERAUKE", 400)]),
            (ReportPeriod::Ytd, vec![row("ASMAT", "MERAUKE", 3000)]),
            (ReportPeriod::PrevYtd, vec![row("ASMAT", "MERAUKE", 2500)]),
        ]
    }

    fn window() -> PeriodWindow {
        period::resolve(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn tree_view_places_each_period_in_its_own_field() {
        let ReportData::Tree(tree) = assemble(six_sets(), &window(), ReportView::Tree) else {
            panic!("expected tree view");
        };

        assert_eq!(tree.len(), 1);
        let metrics = &tree[0].metrics;
        assert_eq!(metrics.target, Decimal::from(1000));
        assert_eq!(metrics.mtd, Decimal::from(600));
        assert_eq!(metrics.prev_month, Decimal::from(500));
        assert_eq!(metrics.prev_year, Decimal::from(400));
        assert_eq!(metrics.ytd, Decimal::from(3000));
        assert_eq!(metrics.prev_ytd, Decimal::from(2500));
        assert_eq!(metrics.achievement, Decimal::from(60));
        assert_eq!(metrics.mom, Decimal::from(20));
        assert_eq!(metrics.yoy, Decimal::from(50));
        assert_eq!(metrics.ytd_growth, Decimal::from(20));
        assert_eq!(tree[0].children[0].name, "TIMIKA");
    }

    #[test]
    fn flat_view_lists_every_level_depth_first() {
        let ReportData::Flat(rows) = assemble(six_sets(), &window(), ReportView::Flat) else {
            panic!("expected flat view");
        };

        let levels: Vec<_> = rows.iter().map(|r| r.level).collect();
        assert_eq!(levels, GeoLevel::ALL);
        let kabupaten = &rows[4];
        assert_eq!(kabupaten.kabupaten.as_deref(), Some("ASMAT"));
        assert_eq!(kabupaten.cluster.as_deref(), Some("MERAUKE"));
        assert_eq!(kabupaten.metrics.prev_year, Decimal::from(400));
        assert_eq!(kabupaten.metrics.target, Decimal::from(1000));
    }

    #[test]
    fn empty_result_sets_render_empty_views() {
        let empty: Vec<_> = six_sets().into_iter().map(|(period, _)| (period, Vec::new())).collect();
        assert!(matches!(
            assemble(empty, &window(), ReportView::Flat),
            ReportData::Flat(rows) if rows.is_empty()
        ));
    }
}
