// src/db/report_query.rs

//! SQL for one (report, period) aggregate.
//!
//! Rows come back at kabupaten grain; window functions add the cluster,
//! subbranch, branch and regional totals to every row so the merger never
//! has to sum anything itself.

use sqlx::{MySql, QueryBuilder};

use crate::{
    models::{
        geo::GeoLevel,
        period::PeriodFilter,
        report::{ReportDefinition, ReportFilters},
    },
    services::geography::sql_case_expression,
};

const VALUE_TYPE: &str = "DECIMAL(24,2)";

// Partition keys of each roll-up level.
fn partition(level: GeoLevel) -> &'static str {
    match level {
        GeoLevel::Regional => "`regional`",
        GeoLevel::Branch => "`regional`, `branch`",
        GeoLevel::Subbranch => "`regional`, `branch`, `subbranch`",
        GeoLevel::Cluster => "`regional`, `branch`, `subbranch`, `cluster`",
        GeoLevel::Kabupaten => "`regional`, `branch`, `subbranch`, `cluster`, `kabupaten`",
    }
}

fn push_source(
    query: &mut QueryBuilder<'static, MySql>,
    definition: &ReportDefinition,
    period: &PeriodFilter,
) {
    let (table, value, kabupaten_column) = match period {
        PeriodFilter::Range(_) => (
            definition.source_table,
            definition.value_expression,
            definition.kabupaten_column,
        ),
        PeriodFilter::Month(_) => (
            definition.target_table,
            definition.target_column,
            definition.kabupaten_column,
        ),
    };

    query.push("SELECT ");
    for level in GeoLevel::ALL {
        query
            .push(sql_case_expression(kabupaten_column, level))
            .push(" AS `")
            .push(level.column())
            .push("`, ");
    }
    query
        .push("COALESCE(")
        .push(value)
        .push(", 0) AS metric FROM ")
        .push(table)
        .push(" WHERE ");

    match period {
        PeriodFilter::Range(range) => {
            query
                .push(definition.date_column)
                .push(" BETWEEN ")
                .push_bind(range.start)
                .push(" AND ")
                .push_bind(range.end);
            if let Some(predicate) = definition.predicate {
                query.push(" AND (").push(predicate).push(")");
            }
        }
        PeriodFilter::Month(month) => {
            query
                .push(definition.target_month_column)
                .push(" = ")
                .push_bind(month.clone());
        }
    }
}

/// Aggregate query of `definition` over `period`, restricted to `filters`.
pub fn period_query(
    definition: &ReportDefinition,
    period: &PeriodFilter,
    filters: &ReportFilters,
) -> QueryBuilder<'static, MySql> {
    let mut query = QueryBuilder::<MySql>::new("SELECT `regional`, `branch`, `subbranch`, `cluster`, `kabupaten`");

    for level in GeoLevel::ALL.iter().rev() {
        query.push(", CAST(");
        if *level == GeoLevel::Kabupaten {
            query.push("SUM(metric)");
        } else {
            query
                .push("SUM(SUM(metric)) OVER (PARTITION BY ")
                .push(partition(*level))
                .push(")");
        }
        query
            .push(" AS ")
            .push(VALUE_TYPE)
            .push(") AS ")
            .push(level.column())
            .push("_value");
    }

    query.push(" FROM (");
    push_source(&mut query, definition, period);
    query.push(") src WHERE `branch` IS NOT NULL");

    for (level, value) in filters.active() {
        query
            .push(" AND `")
            .push(level.column())
            .push("` = ")
            .push_bind(value.to_string());
    }

    query
        .push(" GROUP BY ")
        .push(partition(GeoLevel::Kabupaten))
        .push(" ORDER BY `branch`, `subbranch`, `cluster`, `kabupaten`");

    query
}
