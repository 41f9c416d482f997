// src/services/rollup.rs

//! Folds the per-period result sets into one regional → kabupaten tree.
//!
//! Every (regional, branch, subbranch, cluster, kabupaten) tuple seen in any
//! result set becomes a node; each pass only overwrites the field of its own
//! period, so fields never written stay zero.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    models::{
        geo::GeoLevel,
        period::{PeriodWindow, ReportPeriod},
        report::{FlatRollupRow, Metrics, RollupNode, RollupRow},
    },
    services::geography::order_index,
};

#[derive(Debug, Default)]
struct NodeBuilder {
    metrics: Metrics,
    children: HashMap<String, NodeBuilder>,
}

#[derive(Debug, Default)]
pub struct RollupTree {
    roots: HashMap<String, NodeBuilder>,
}

fn set_period_value(metrics: &mut Metrics, period: ReportPeriod, value: Decimal) {
    let field = match period {
        ReportPeriod::Target => &mut metrics.target,
        ReportPeriod::Mtd => &mut metrics.mtd,
        ReportPeriod::PrevMonth => &mut metrics.prev_month,
        ReportPeriod::PrevYear => &mut metrics.prev_year,
        ReportPeriod::Ytd => &mut metrics.ytd,
        ReportPeriod::PrevYtd => &mut metrics.prev_ytd,
    };
    *field = value;
}

impl RollupTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one result set into the tree. Ancestor nodes take the
    /// window-function totals carried by the row; later writes win.
    pub fn apply(&mut self, period: ReportPeriod, rows: &[RollupRow]) {
        for row in rows {
            let mut level = GeoLevel::Regional;
            let mut node = self
                .roots
                .entry(row.name_at(level).to_string())
                .or_default();
            set_period_value(&mut node.metrics, period, row.value_at(level));

            while let Some(child) = level.child() {
                level = child;
                node = node
                    .children
                    .entry(row.name_at(level).to_string())
                    .or_default();
                set_period_value(&mut node.metrics, period, row.value_at(level));
            }
        }
    }

    /// Computes the derived ratios and orders every level the way the
    /// dashboard presents it.
    pub fn finish(self, window: &PeriodWindow) -> Vec<RollupNode> {
        build_nodes(self.roots, GeoLevel::Regional, window)
    }
}

fn build_nodes(
    builders: HashMap<String, NodeBuilder>,
    level: GeoLevel,
    window: &PeriodWindow,
) -> Vec<RollupNode> {
    let mut nodes: Vec<RollupNode> = builders
        .into_iter()
        .map(|(name, builder)| {
            let children = match level.child() {
                Some(child_level) => build_nodes(builder.children, child_level, window),
                None => Vec::new(),
            };
            let mut metrics = builder.metrics;
            derive_metrics(&mut metrics, window);
            RollupNode { name, level, metrics, children }
        })
        .collect();

    // Footprint order first; names the footprint does not know go last.
    nodes.sort_by(|a, b| {
        let rank = |node: &RollupNode| order_index(level, &node.name).unwrap_or(usize::MAX);
        rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
    });
    nodes
}

fn percent(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    (numerator / denominator * Decimal::ONE_HUNDRED).round_dp(2)
}

fn growth(current: Decimal, previous: Decimal) -> Decimal {
    percent(current - previous, previous)
}

pub fn derive_metrics(metrics: &mut Metrics, window: &PeriodWindow) {
    metrics.drr = if window.day_of_month == 0 {
        Decimal::ZERO
    } else {
        (metrics.mtd / Decimal::from(window.day_of_month) * Decimal::from(window.days_in_month))
            .round_dp(2)
    };
    metrics.achievement = percent(metrics.mtd, metrics.target);
    metrics.achievement_drr = percent(metrics.drr, metrics.target);
    metrics.gap = metrics.mtd - metrics.target;
    metrics.mom = growth(metrics.mtd, metrics.prev_month);
    metrics.yoy = growth(metrics.mtd, metrics.prev_year);
    metrics.ytd_growth = growth(metrics.ytd, metrics.prev_ytd);
}

/// Runs every result set through one tree. Sets are applied in order, so a
/// later set for the same period overrides an earlier one.
pub fn merge(sets: Vec<(ReportPeriod, Vec<RollupRow>)>, window: &PeriodWindow) -> Vec<RollupNode> {
    let mut tree = RollupTree::new();
    for (period, rows) in &sets {
        tree.apply(*period, rows);
    }
    tree.finish(window)
}

/// Depth-first rows for table rendering, each node followed by its
/// children.
pub fn flatten(nodes: &[RollupNode]) -> Vec<FlatRollupRow> {
    let mut rows = Vec::new();
    let mut path: Vec<&str> = Vec::new();
    for node in nodes {
        flatten_into(node, &mut path, &mut rows);
    }
    rows
}

fn flatten_into<'a>(node: &'a RollupNode, path: &mut Vec<&'a str>, rows: &mut Vec<FlatRollupRow>) {
    path.push(&node.name);

    let at = |depth: usize| path.get(depth).map(|name| name.to_string());
    rows.push(FlatRollupRow {
        level: node.level,
        regional: at(0).unwrap_or_default(),
        branch: at(1),
        subbranch: at(2),
        cluster: at(3),
        kabupaten: at(4),
        metrics: node.metrics.clone(),
    });

    for child in &node.children {
        flatten_into(child, path, rows);
    }
    path.pop();
}
