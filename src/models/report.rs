// src/models/report.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::{geo::GeoLevel, period::PeriodWindow};

// =========================================================================
//  CATALOG
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    RevenueSa,
    RevenueSaByu,
    RevenueCvm,
    TrxSa,
    TrxSaByu,
    TrxCvm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricUnit {
    Idr,
    Trx,
}

/// Where a report reads its actuals and targets from. Every identifier here
/// is spliced into SQL, so definitions only ever come from the static
/// catalog below.
#[derive(Debug)]
pub struct ReportDefinition {
    pub kind: ReportKind,
    pub title: &'static str,
    pub unit: MetricUnit,
    pub source_table: &'static str,
    pub date_column: &'static str,
    pub kabupaten_column: &'static str,
    pub value_expression: &'static str,
    pub predicate: Option<&'static str>,
    pub target_table: &'static str,
    pub target_month_column: &'static str,
    pub target_column: &'static str,
}

const BYU_PREDICATE: &str = "brand = 'byU'";

static REVENUE_SA: ReportDefinition = ReportDefinition {
    kind: ReportKind::RevenueSa,
    title: "Revenue Sales Acquisition",
    unit: MetricUnit::Idr,
    source_table: "sa_detil",
    date_column: "event_date",
    kabupaten_column: "kabupaten",
    value_expression: "rev",
    predicate: None,
    target_table: "target_puma",
    target_month_column: "periode",
    target_column: "rev_sa",
};

static REVENUE_SA_BYU: ReportDefinition = ReportDefinition {
    kind: ReportKind::RevenueSaByu,
    title: "Revenue Sales Acquisition byU",
    unit: MetricUnit::Idr,
    source_table: "sa_detil",
    date_column: "event_date",
    kabupaten_column: "kabupaten",
    value_expression: "rev",
    predicate: Some(BYU_PREDICATE),
    target_table: "target_puma",
    target_month_column: "periode",
    target_column: "rev_sa_byu",
};

static REVENUE_CVM: ReportDefinition = ReportDefinition {
    kind: ReportKind::RevenueCvm,
    title: "Revenue CVM",
    unit: MetricUnit::Idr,
    source_table: "cvm_detil",
    date_column: "event_date",
    kabupaten_column: "kabupaten",
    value_expression: "rev",
    predicate: None,
    target_table: "target_puma",
    target_month_column: "periode",
    target_column: "rev_cvm",
};

static TRX_SA: ReportDefinition = ReportDefinition {
    kind: ReportKind::TrxSa,
    title: "Transaction Sales Acquisition",
    unit: MetricUnit::Trx,
    source_table: "sa_detil",
    date_column: "event_date",
    kabupaten_column: "kabupaten",
    value_expression: "trx",
    predicate: None,
    target_table: "target_puma",
    target_month_column: "periode",
    target_column: "trx_sa",
};

static TRX_SA_BYU: ReportDefinition = ReportDefinition {
    kind: ReportKind::TrxSaByu,
    title: "Transaction Sales Acquisition byU",
    unit: MetricUnit::Trx,
    source_table: "sa_detil",
    date_column: "event_date",
    kabupaten_column: "kabupaten",
    value_expression: "trx",
    predicate: Some(BYU_PREDICATE),
    target_table: "target_puma",
    target_month_column: "periode",
    target_column: "trx_sa_byu",
};

static TRX_CVM: ReportDefinition = ReportDefinition {
    kind: ReportKind::TrxCvm,
    title: "Transaction CVM",
    unit: MetricUnit::Trx,
    source_table: "cvm_detil",
    date_column: "event_date",
    kabupaten_column: "kabupaten",
    value_expression: "trx",
    predicate: None,
    target_table: "target_puma",
    target_month_column: "periode",
    target_column: "trx_cvm",
};

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::RevenueSa,
        ReportKind::RevenueSaByu,
        ReportKind::RevenueCvm,
        ReportKind::TrxSa,
        ReportKind::TrxSaByu,
        ReportKind::TrxCvm,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::RevenueSa => "revenue-sa",
            ReportKind::RevenueSaByu => "revenue-sa-byu",
            ReportKind::RevenueCvm => "revenue-cvm",
            ReportKind::TrxSa => "trx-sa",
            ReportKind::TrxSaByu => "trx-sa-byu",
            ReportKind::TrxCvm => "trx-cvm",
        }
    }

    pub fn from_slug(slug: &str) -> Option<ReportKind> {
        let slug = slug.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    pub fn definition(self) -> &'static ReportDefinition {
        match self {
            ReportKind::RevenueSa => &REVENUE_SA,
            ReportKind::RevenueSaByu => &REVENUE_SA_BYU,
            ReportKind::RevenueCvm => &REVENUE_CVM,
            ReportKind::TrxSa => &TRX_SA,
            ReportKind::TrxSaByu => &TRX_SA_BYU,
            ReportKind::TrxCvm => &TRX_CVM,
        }
    }
}

// Entry of GET /api/reports
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub kind: ReportKind,
    pub title: String,
    pub unit: MetricUnit,
    pub path: String,
}

impl From<&ReportDefinition> for ReportSummary {
    fn from(definition: &ReportDefinition) -> Self {
        Self {
            kind: definition.kind,
            title: definition.title.to_string(),
            unit: definition.unit,
            path: format!("/api/{}", definition.kind.slug()),
        }
    }
}

// =========================================================================
//  QUERY ROWS
// =========================================================================

// One kabupaten row of a period query, carrying the window-function totals
// of its ancestors.
#[derive(Debug, Clone, Default, FromRow)]
pub struct RollupRow {
    pub regional: String,
    pub branch: String,
    pub subbranch: String,
    pub cluster: String,
    pub kabupaten: String,
    pub kabupaten_value: Option<Decimal>,
    pub cluster_value: Option<Decimal>,
    pub subbranch_value: Option<Decimal>,
    pub branch_value: Option<Decimal>,
    pub regional_value: Option<Decimal>,
}

impl RollupRow {
    pub fn name_at(&self, level: GeoLevel) -> &str {
        match level {
            GeoLevel::Regional => &self.regional,
            GeoLevel::Branch => &self.branch,
            GeoLevel::Subbranch => &self.subbranch,
            GeoLevel::Cluster => &self.cluster,
            GeoLevel::Kabupaten => &self.kabupaten,
        }
    }

    pub fn value_at(&self, level: GeoLevel) -> Decimal {
        match level {
            GeoLevel::Regional => self.regional_value,
            GeoLevel::Branch => self.branch_value,
            GeoLevel::Subbranch => self.subbranch_value,
            GeoLevel::Cluster => self.cluster_value,
            GeoLevel::Kabupaten => self.kabupaten_value,
        }
        .unwrap_or(Decimal::ZERO)
    }
}

// =========================================================================
//  OUTPUT
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub target: Decimal,
    pub mtd: Decimal,
    pub prev_month: Decimal,
    pub prev_year: Decimal,
    pub ytd: Decimal,
    pub prev_ytd: Decimal,
    // Derived, in percent except `drr` and `gap`
    pub achievement: Decimal,
    pub drr: Decimal,
    pub achievement_drr: Decimal,
    pub gap: Decimal,
    pub mom: Decimal,
    pub yoy: Decimal,
    pub ytd_growth: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RollupNode {
    pub name: String,
    pub level: GeoLevel,
    #[serde(flatten)]
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(no_recursion)]
    pub children: Vec<RollupNode>,
}

// Depth-first row of the `view=flat` rendition.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlatRollupRow {
    pub level: GeoLevel,
    pub regional: String,
    pub branch: Option<String>,
    pub subbranch: Option<String>,
    pub cluster: Option<String>,
    pub kabupaten: Option<String>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ReportData {
    Tree(Vec<RollupNode>),
    Flat(Vec<FlatRollupRow>),
}

// Canonical geographic filters applied to a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub branch: Option<String>,
    pub subbranch: Option<String>,
    pub cluster: Option<String>,
    pub kabupaten: Option<String>,
}

impl ReportFilters {
    /// Filters as (level, value) pairs, coarsest first.
    pub fn active(&self) -> Vec<(GeoLevel, &str)> {
        [
            (GeoLevel::Branch, self.branch.as_deref()),
            (GeoLevel::Subbranch, self.subbranch.as_deref()),
            (GeoLevel::Cluster, self.cluster.as_deref()),
            (GeoLevel::Kabupaten, self.kabupaten.as_deref()),
        ]
        .into_iter()
        .filter_map(|(level, value)| value.map(|v| (level, v)))
        .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report: ReportKind,
    pub title: String,
    pub unit: MetricUnit,
    pub period: PeriodWindow,
    pub filters: ReportFilters,
    pub data: ReportData,
}

// =========================================================================
//  REQUEST
// =========================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportView {
    #[default]
    Tree,
    Flat,
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    if chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_err() {
        return Err(ValidationError::new("invalid_date"));
    }
    Ok(())
}

fn validate_view(value: &str) -> Result<(), ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "tree" | "flat" => Ok(()),
        _ => Err(ValidationError::new("invalid_view")),
    }
}

fn known_at(level: GeoLevel, value: &str) -> Result<(), ValidationError> {
    if crate::services::geography::contains(level, value) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_location"))
    }
}

fn validate_branch(value: &str) -> Result<(), ValidationError> {
    known_at(GeoLevel::Branch, value)
}

fn validate_subbranch(value: &str) -> Result<(), ValidationError> {
    known_at(GeoLevel::Subbranch, value)
}

fn validate_cluster(value: &str) -> Result<(), ValidationError> {
    known_at(GeoLevel::Cluster, value)
}

fn validate_kabupaten(value: &str) -> Result<(), ValidationError> {
    known_at(GeoLevel::Kabupaten, value)
}

/// Query string of every report route. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// Reference date (YYYY-MM-DD); defaults to yesterday
    #[validate(custom(function = "validate_date"))]
    pub date: Option<String>,

    #[validate(custom(function = "validate_branch"))]
    pub branch: Option<String>,

    #[validate(custom(function = "validate_subbranch"))]
    pub subbranch: Option<String>,

    #[validate(custom(function = "validate_cluster"))]
    pub cluster: Option<String>,

    #[validate(custom(function = "validate_kabupaten"))]
    pub kabupaten: Option<String>,

    /// `tree` (default) or `flat`
    #[validate(custom(function = "validate_view"))]
    pub view: Option<String>,
}

impl ReportParams {
    pub fn reference_date(&self) -> Option<chrono::NaiveDate> {
        self.date
            .as_deref()
            .and_then(|value| chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
    }

    pub fn view(&self) -> ReportView {
        match self.view.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "flat" => ReportView::Flat,
            _ => ReportView::Tree,
        }
    }

    /// Filters rewritten to their canonical footprint spelling. Call after
    /// `validate()`; unknown names are dropped.
    pub fn filters(&self) -> ReportFilters {
        use crate::services::geography::canonical_name;

        let canonical = |level: GeoLevel, value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .and_then(|v| canonical_name(level, v))
                .map(str::to_string)
        };

        ReportFilters {
            branch: canonical(GeoLevel::Branch, &self.branch),
            subbranch: canonical(GeoLevel::Subbranch, &self.subbranch),
            cluster: canonical(GeoLevel::Cluster, &self.cluster),
            kabupaten: canonical(GeoLevel::Kabupaten, &self.kabupaten),
        }
    }

    /// Cross-field rules: the date may not be after the business "today" and
    /// every finer filter must lie inside the coarser ones.
    pub fn validate_consistency(&self, today: chrono::NaiveDate) -> Result<(), validator::ValidationErrors> {
        use crate::services::geography::is_within;

        let mut errors = validator::ValidationErrors::new();

        if let Some(date) = self.reference_date() {
            if date > today {
                errors.add("date", ValidationError::new("date_in_future"));
            }
        }

        let filters = self.filters();
        let active = filters.active();
        for (i, (child_level, child)) in active.iter().enumerate() {
            let outside = active[..i]
                .iter()
                .any(|(ancestor_level, ancestor)| !is_within(*child_level, child, *ancestor_level, ancestor));
            if outside {
                errors.add(child_level.column(), ValidationError::new("filter_mismatch"));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params() -> ReportParams {
        ReportParams::default()
    }

    #[test]
    fn resolves_report_slugs() {
        assert_eq!(ReportKind::from_slug("revenue-sa"), Some(ReportKind::RevenueSa));
        assert_eq!(ReportKind::from_slug("TRX-SA-BYU"), Some(ReportKind::TrxSaByu));
        assert_eq!(ReportKind::from_slug("revenue-xyz"), None);
        for kind in ReportKind::ALL {
            assert_eq!(kind.definition().kind, kind);
            assert_eq!(ReportKind::from_slug(kind.slug()), Some(kind));
        }
    }

    #[test]
    fn byu_reports_filter_on_brand() {
        assert_eq!(ReportKind::TrxSaByu.definition().predicate, Some("brand = 'byU'"));
        assert_eq!(ReportKind::TrxSa.definition().predicate, None);
        assert_eq!(ReportKind::RevenueCvm.definition().source_table, "cvm_detil");
    }

    #[test]
    fn rejects_malformed_dates_and_unknown_locations() {
        let mut p = params();
        p.date = Some("2024-13-01".into());
        p.branch = Some("BALI".into());
        p.view = Some("pie".into());

        let errors = p.validate().expect_err("invalid params");
        let fields = errors.field_errors();
        assert_eq!(fields["date"][0].code, "invalid_date");
        assert_eq!(fields["branch"][0].code, "unknown_location");
        assert_eq!(fields["view"][0].code, "invalid_view");
    }

    #[test]
    fn accepts_case_insensitive_filters_and_canonicalizes_them() {
        let mut p = params();
        p.branch = Some("sorong".into());
        p.kabupaten = Some("kab. raja ampat".into());
        assert!(p.validate().is_ok());

        let filters = p.filters();
        assert_eq!(filters.branch.as_deref(), Some("SORONG"));
        assert_eq!(filters.kabupaten.as_deref(), Some("RAJA AMPAT"));
        assert!(p.validate_consistency(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_ok());
    }

    #[test]
    fn flags_filters_outside_their_parent() {
        let mut p = params();
        p.branch = Some("AMBON".into());
        p.cluster = Some("WAMENA".into());

        let errors = p
            .validate_consistency(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .expect_err("mismatch");
        assert_eq!(errors.field_errors()["cluster"][0].code, "filter_mismatch");
    }

    #[test]
    fn flags_future_dates() {
        let mut p = params();
        p.date = Some("2024-06-02".into());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let errors = p.validate_consistency(today).expect_err("future");
        assert_eq!(errors.field_errors()["date"][0].code, "date_in_future");

        p.date = Some("2024-06-01".into());
        assert!(p.validate_consistency(today).is_ok());
    }

    #[test]
    fn defaults_to_tree_view() {
        let mut p = params();
        assert_eq!(p.view(), ReportView::Tree);
        p.view = Some("FLAT".into());
        assert_eq!(p.view(), ReportView::Flat);
    }
}
