// src/models/geo.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Levels of the PUMA geographic hierarchy, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GeoLevel {
    Regional,
    Branch,
    Subbranch,
    Cluster,
    Kabupaten,
}

impl GeoLevel {
    pub const ALL: [GeoLevel; 5] = [
        GeoLevel::Regional,
        GeoLevel::Branch,
        GeoLevel::Subbranch,
        GeoLevel::Cluster,
        GeoLevel::Kabupaten,
    ];

    /// Column alias used for this level in the generated report SQL.
    pub fn column(self) -> &'static str {
        match self {
            GeoLevel::Regional => "regional",
            GeoLevel::Branch => "branch",
            GeoLevel::Subbranch => "subbranch",
            GeoLevel::Cluster => "cluster",
            GeoLevel::Kabupaten => "kabupaten",
        }
    }

    pub fn child(self) -> Option<GeoLevel> {
        match self {
            GeoLevel::Regional => Some(GeoLevel::Branch),
            GeoLevel::Branch => Some(GeoLevel::Subbranch),
            GeoLevel::Subbranch => Some(GeoLevel::Cluster),
            GeoLevel::Cluster => Some(GeoLevel::Kabupaten),
            GeoLevel::Kabupaten => None,
        }
    }
}

// Full location of one kabupaten in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPath {
    pub regional: String,
    pub branch: String,
    pub subbranch: String,
    pub cluster: String,
    pub kabupaten: String,
}

// Node of the filter-options tree (GET /api/geo/hierarchy)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoNode {
    pub name: String,
    pub level: GeoLevel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(no_recursion)]
    pub children: Vec<GeoNode>,
}
