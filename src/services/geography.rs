// src/services/geography.rs

//! Static kabupaten → cluster → subbranch → branch mapping of the PUMA
//! footprint.
//!
//! The table is the single source of the geographic classification: the
//! report SQL is generated from it (`sql_case_expression`) and request
//! filters are validated against it.

use crate::models::geo::{GeoLevel, GeoNode, GeoPath};

pub const REGIONAL: &str = "PUMA";

struct ClusterEntry {
    branch: &'static str,
    subbranch: &'static str,
    cluster: &'static str,
    kabupaten: &'static [&'static str],
}

// Presentation order of the dashboard.
const FOOTPRINT: &[ClusterEntry] = &[
    // --- AMBON ---
    ClusterEntry {
        branch: "AMBON",
        subbranch: "AMBON",
        cluster: "AMBON",
        kabupaten: &["KOTA AMBON"],
    },
    ClusterEntry {
        branch: "AMBON",
        subbranch: "AMBON",
        cluster: "MASOHI",
        kabupaten: &["MALUKU TENGAH", "SERAM BAGIAN BARAT", "SERAM BAGIAN TIMUR"],
    },
    ClusterEntry {
        branch: "AMBON",
        subbranch: "AMBON",
        cluster: "BURU",
        kabupaten: &["BURU", "BURU SELATAN"],
    },
    ClusterEntry {
        branch: "AMBON",
        subbranch: "TUAL",
        cluster: "TUAL",
        kabupaten: &["KOTA TUAL", "MALUKU TENGGARA", "KEPULAUAN ARU"],
    },
    ClusterEntry {
        branch: "AMBON",
        subbranch: "TUAL",
        cluster: "SAUMLAKI",
        kabupaten: &["KEPULAUAN TANIMBAR", "MALUKU BARAT DAYA"],
    },
    ClusterEntry {
        branch: "AMBON",
        subbranch: "TERNATE",
        cluster: "TERNATE",
        kabupaten: &["KOTA TERNATE", "KOTA TIDORE KEPULAUAN", "HALMAHERA BARAT"],
    },
    ClusterEntry {
        branch: "AMBON",
        subbranch: "TERNATE",
        cluster: "TOBELO",
        kabupaten: &["HALMAHERA UTARA", "HALMAHERA TENGAH", "HALMAHERA TIMUR", "PULAU MOROTAI"],
    },
    ClusterEntry {
        branch: "AMBON",
        subbranch: "TERNATE",
        cluster: "LABUHA",
        kabupaten: &["HALMAHERA SELATAN", "KEPULAUAN SULA", "PULAU TALIABU"],
    },
    // --- SORONG ---
    ClusterEntry {
        branch: "SORONG",
        subbranch: "SORONG",
        cluster: "SORONG",
        kabupaten: &["KOTA SORONG", "SORONG", "RAJA AMPAT"],
    },
    ClusterEntry {
        branch: "SORONG",
        subbranch: "SORONG",
        cluster: "TEMINABUAN",
        kabupaten: &["SORONG SELATAN", "MAYBRAT", "TAMBRAUW"],
    },
    ClusterEntry {
        branch: "SORONG",
        subbranch: "SORONG",
        cluster: "FAKFAK",
        kabupaten: &["FAKFAK", "KAIMANA"],
    },
    ClusterEntry {
        branch: "SORONG",
        subbranch: "MANOKWARI",
        cluster: "MANOKWARI",
        kabupaten: &["MANOKWARI", "MANOKWARI SELATAN", "PEGUNUNGAN ARFAK"],
    },
    ClusterEntry {
        branch: "SORONG",
        subbranch: "MANOKWARI",
        cluster: "BINTUNI",
        kabupaten: &["TELUK BINTUNI", "TELUK WONDAMA"],
    },
    // --- JAYAPURA ---
    ClusterEntry {
        branch: "JAYAPURA",
        subbranch: "JAYAPURA",
        cluster: "JAYAPURA",
        kabupaten: &["KOTA JAYAPURA", "JAYAPURA", "KEEROM"],
    },
    ClusterEntry {
        branch: "JAYAPURA",
        subbranch: "JAYAPURA",
        cluster: "SARMI",
        kabupaten: &["SARMI", "MAMBERAMO RAYA"],
    },
    ClusterEntry {
        branch: "JAYAPURA",
        subbranch: "BIAK",
        cluster: "BIAK",
        kabupaten: &["BIAK NUMFOR", "SUPIORI"],
    },
    ClusterEntry {
        branch: "JAYAPURA",
        subbranch: "BIAK",
        cluster: "SERUI",
        kabupaten: &["KEPULAUAN YAPEN", "WAROPEN"],
    },
    ClusterEntry {
        branch: "JAYAPURA",
        subbranch: "WAMENA",
        cluster: "WAMENA",
        kabupaten: &["JAYAWIJAYA", "LANNY JAYA", "TOLIKARA", "MAMBERAMO TENGAH", "YALIMO", "NDUGA"],
    },
    ClusterEntry {
        branch: "JAYAPURA",
        subbranch: "WAMENA",
        cluster: "DEKAI",
        kabupaten: &["YAHUKIMO", "PEGUNUNGAN BINTANG"],
    },
    // --- TIMIKA ---
    ClusterEntry {
        branch: "TIMIKA",
        subbranch: "TIMIKA",
        cluster: "TIMIKA",
        kabupaten: &["MIMIKA", "PUNCAK", "PUNCAK JAYA", "INTAN JAYA"],
    },
    ClusterEntry {
        branch: "TIMIKA",
        subbranch: "NABIRE",
        cluster: "NABIRE",
        kabupaten: &["NABIRE", "PANIAI", "DOGIYAI", "DEIYAI"],
    },
    ClusterEntry {
        branch: "TIMIKA",
        subbranch: "MERAUKE",
        cluster: "MERAUKE",
        kabupaten: &["MERAUKE", "BOVEN DIGOEL", "MAPPI", "ASMAT"],
    },
];

// Legacy or abbreviated spellings found in the source tables.
const ALIASES: &[(&str, &str)] = &[
    ("AMBON", "KOTA AMBON"),
    ("TUAL", "KOTA TUAL"),
    ("TERNATE", "KOTA TERNATE"),
    ("TIDORE", "KOTA TIDORE KEPULAUAN"),
    ("TIDORE KEPULAUAN", "KOTA TIDORE KEPULAUAN"),
    ("MALUKU TENGGARA BARAT", "KEPULAUAN TANIMBAR"),
    ("FAK FAK", "FAKFAK"),
    ("BIAK", "BIAK NUMFOR"),
    ("YAPEN", "KEPULAUAN YAPEN"),
    ("YAPEN WAROPEN", "KEPULAUAN YAPEN"),
    ("SULA", "KEPULAUAN SULA"),
    ("ARU", "KEPULAUAN ARU"),
    ("MOROTAI", "PULAU MOROTAI"),
    ("TALIABU", "PULAU TALIABU"),
    ("TIMIKA", "MIMIKA"),
    ("WAMENA", "JAYAWIJAYA"),
];

const ADMIN_PREFIXES: &[&str] = &["KABUPATEN ", "KAB. ", "KAB "];

/// Upper-cases, trims, collapses whitespace and drops the administrative
/// `KABUPATEN`/`KAB.` prefix. `KOTA` is significant and stays.
pub fn normalize_kabupaten(raw: &str) -> String {
    let upper = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    ADMIN_PREFIXES
        .iter()
        .find_map(|prefix| upper.strip_prefix(prefix))
        .map(|rest| rest.trim().to_string())
        .unwrap_or(upper)
}

fn canonical_kabupaten(raw: &str) -> Option<&'static str> {
    let name = normalize_kabupaten(raw);
    let name = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(name);

    kabupaten_entries()
        .map(|(_, kabupaten)| kabupaten)
        .find(|kabupaten| *kabupaten == name)
}

fn kabupaten_entries() -> impl Iterator<Item = (&'static ClusterEntry, &'static str)> {
    FOOTPRINT
        .iter()
        .flat_map(|entry| entry.kabupaten.iter().map(move |kabupaten| (entry, *kabupaten)))
}

fn name_at(entry: &ClusterEntry, kabupaten: &'static str, level: GeoLevel) -> &'static str {
    match level {
        GeoLevel::Regional => REGIONAL,
        GeoLevel::Branch => entry.branch,
        GeoLevel::Subbranch => entry.subbranch,
        GeoLevel::Cluster => entry.cluster,
        GeoLevel::Kabupaten => kabupaten,
    }
}

/// Resolves a raw kabupaten/city name to its full hierarchy path.
pub fn classify(raw: &str) -> Option<GeoPath> {
    let canonical = canonical_kabupaten(raw)?;
    let (entry, kabupaten) = kabupaten_entries().find(|&(_, k)| k == canonical)?;

    Some(GeoPath {
        regional: REGIONAL.to_string(),
        branch: entry.branch.to_string(),
        subbranch: entry.subbranch.to_string(),
        cluster: entry.cluster.to_string(),
        kabupaten: kabupaten.to_string(),
    })
}

/// Canonical spelling of `name` at `level`, if the footprint knows it.
pub fn canonical_name(level: GeoLevel, name: &str) -> Option<&'static str> {
    if level == GeoLevel::Kabupaten {
        return canonical_kabupaten(name);
    }
    let wanted = normalize_kabupaten(name);
    kabupaten_entries()
        .map(|(entry, kabupaten)| name_at(entry, kabupaten, level))
        .find(|candidate| *candidate == wanted)
}

pub fn contains(level: GeoLevel, name: &str) -> bool {
    canonical_name(level, name).is_some()
}

/// True when `child` (at `child_level`) lies under `ancestor` (at
/// `ancestor_level`). Unknown names are never within anything.
pub fn is_within(child_level: GeoLevel, child: &str, ancestor_level: GeoLevel, ancestor: &str) -> bool {
    let (Some(child), Some(ancestor)) = (
        canonical_name(child_level, child),
        canonical_name(ancestor_level, ancestor),
    ) else {
        return false;
    };

    kabupaten_entries().any(|(entry, kabupaten)| {
        name_at(entry, kabupaten, child_level) == child
            && name_at(entry, kabupaten, ancestor_level) == ancestor
    })
}

/// Position of `name` in the presentation order of its level.
pub fn order_index(level: GeoLevel, name: &str) -> Option<usize> {
    let mut seen: Vec<&'static str> = Vec::new();
    for (entry, kabupaten) in kabupaten_entries() {
        let candidate = name_at(entry, kabupaten, level);
        if candidate == name {
            return Some(seen.len());
        }
        if !seen.contains(&candidate) {
            seen.push(candidate);
        }
    }
    None
}

// Every raw spelling that classifies to `kabupaten`, after whitespace
// collapsing and upper-casing.
fn spellings(kabupaten: &'static str) -> Vec<String> {
    let bare = std::iter::once(kabupaten).chain(
        ALIASES
            .iter()
            .filter(|(_, canonical)| *canonical == kabupaten)
            .map(|(alias, _)| *alias),
    );

    bare.flat_map(|name| {
        std::iter::once(name.to_string())
            .chain(ADMIN_PREFIXES.iter().map(move |prefix| format!("{prefix}{name}")))
    })
    .collect()
}

// SQL counterpart of the whitespace and case handling in `normalize_kabupaten`.
fn sql_normalized(column: &str) -> String {
    format!("TRIM(REGEXP_REPLACE(UPPER({column}), '[[:space:]]+', ' '))")
}

fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders the footprint as one SQL CASE expression mapping the raw
/// kabupaten column to the name at `level`. Unmapped rows yield NULL.
pub fn sql_case_expression(column: &str, level: GeoLevel) -> String {
    if level == GeoLevel::Regional {
        return sql_literal(REGIONAL);
    }

    // Group spellings by their output value, preserving table order.
    let mut groups: Vec<(&'static str, Vec<String>)> = Vec::new();
    for (entry, kabupaten) in kabupaten_entries() {
        let output = name_at(entry, kabupaten, level);
        let names = spellings(kabupaten);
        match groups.iter_mut().find(|(value, _)| *value == output) {
            Some((_, existing)) => existing.extend(names),
            None => groups.push((output, names)),
        }
    }

    let key = sql_normalized(column);
    let mut sql = String::from("CASE");
    for (output, names) in groups {
        let list = names
            .iter()
            .map(|name| sql_literal(name))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(
            " WHEN {key} IN ({list}) THEN {}",
            sql_literal(output)
        ));
    }
    sql.push_str(" ELSE NULL END");
    sql
}

/// Whole footprint as a nested tree, in presentation order.
pub fn hierarchy() -> Vec<GeoNode> {
    let mut regional = GeoNode {
        name: REGIONAL.to_string(),
        level: GeoLevel::Regional,
        children: Vec::new(),
    };

    for entry in FOOTPRINT {
        let branch = child_node(&mut regional, entry.branch, GeoLevel::Branch);
        let subbranch = child_node(branch, entry.subbranch, GeoLevel::Subbranch);
        let cluster = child_node(subbranch, entry.cluster, GeoLevel::Cluster);
        for kabupaten in entry.kabupaten {
            child_node(cluster, kabupaten, GeoLevel::Kabupaten);
        }
    }

    vec![regional]
}

fn child_node<'a>(parent: &'a mut GeoNode, name: &str, level: GeoLevel) -> &'a mut GeoNode {
    let position = match parent.children.iter().position(|c| c.name == name) {
        Some(position) => position,
        None => {
            parent.children.push(GeoNode {
                name: name.to_string(),
                level,
                children: Vec::new(),
            });
            parent.children.len() - 1
        }
    };
    &mut parent.children[position]
}

pub fn kabupaten_count() -> usize {
    kabupaten_entries().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn normalizes_administrative_prefixes_and_spacing() {
        assert_eq!(normalize_kabupaten("  kab.  maluku   tengah "), "MALUKU TENGAH");
        assert_eq!(normalize_kabupaten("Kabupaten Mimika"), "MIMIKA");
        assert_eq!(normalize_kabupaten("KAB MERAUKE"), "MERAUKE");
        assert_eq!(normalize_kabupaten("Kota Sorong"), "KOTA SORONG");
    }

    #[test]
    fn classifies_known_kabupaten() {
        let path = classify("kab. teluk bintuni").expect("known kabupaten");
        assert_eq!(path.regional, "PUMA");
        assert_eq!(path.branch, "SORONG");
        assert_eq!(path.subbranch, "MANOKWARI");
        assert_eq!(path.cluster, "BINTUNI");
        assert_eq!(path.kabupaten, "TELUK BINTUNI");
    }

    #[test]
    fn kota_and_kabupaten_with_same_name_are_distinct() {
        let city = classify("KOTA JAYAPURA").expect("city");
        let regency = classify("JAYAPURA").expect("regency");
        assert_eq!(city.kabupaten, "KOTA JAYAPURA");
        assert_eq!(regency.kabupaten, "JAYAPURA");
        assert_eq!(city.cluster, regency.cluster);
    }

    #[test]
    fn resolves_legacy_aliases() {
        assert_eq!(classify("Maluku Tenggara Barat").unwrap().kabupaten, "KEPULAUAN TANIMBAR");
        assert_eq!(classify("TIDORE").unwrap().kabupaten, "KOTA TIDORE KEPULAUAN");
        assert_eq!(classify("timika").unwrap().branch, "TIMIKA");
    }

    #[test]
    fn unknown_names_are_not_classified() {
        assert!(classify("KOTA MAKASSAR").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn every_kabupaten_appears_once() {
        let mut seen = HashSet::new();
        for (_, kabupaten) in kabupaten_entries() {
            assert!(seen.insert(kabupaten), "duplicate kabupaten {kabupaten}");
        }
        assert_eq!(seen.len(), kabupaten_count());
    }

    #[test]
    fn clusters_and_subbranches_have_a_single_parent() {
        for level in [GeoLevel::Subbranch, GeoLevel::Cluster, GeoLevel::Kabupaten] {
            for (entry, kabupaten) in kabupaten_entries() {
                let name = name_at(entry, kabupaten, level);
                let parents: HashSet<_> = kabupaten_entries()
                    .filter(|&(e, k)| name_at(e, k, level) == name)
                    .map(|(e, k)| name_at(e, k, GeoLevel::ALL[level as usize - 1]))
                    .collect();
                assert_eq!(parents.len(), 1, "{name} has several parents");
            }
        }
    }

    #[test]
    fn aliases_point_to_known_kabupaten() {
        for (alias, canonical) in ALIASES {
            assert!(
                kabupaten_entries().any(|(_, k)| k == *canonical),
                "alias {alias} points to unknown {canonical}"
            );
        }
    }

    #[test]
    fn validates_lineage_between_levels() {
        assert!(is_within(GeoLevel::Cluster, "tobelo", GeoLevel::Subbranch, "TERNATE"));
        assert!(is_within(GeoLevel::Kabupaten, "Asmat", GeoLevel::Branch, "TIMIKA"));
        assert!(!is_within(GeoLevel::Cluster, "TOBELO", GeoLevel::Branch, "SORONG"));
        assert!(!is_within(GeoLevel::Cluster, "NOWHERE", GeoLevel::Branch, "SORONG"));
        assert!(is_within(GeoLevel::Cluster, "dekai", GeoLevel::Subbranch, "WAMENA"));
        assert!(is_within(GeoLevel::Branch, "AMBON", GeoLevel::Regional, "PUMA"));
    }

    #[test]
    fn order_follows_the_table() {
        assert_eq!(order_index(GeoLevel::Branch, "AMBON"), Some(0));
        assert_eq!(order_index(GeoLevel::Branch, "SORONG"), Some(1));
        assert_eq!(order_index(GeoLevel::Branch, "TIMIKA"), Some(3));
        assert_eq!(order_index(GeoLevel::Branch, "BALI"), None);
    }

    #[test]
    fn case_expression_covers_prefixes_and_aliases() {
        let sql = sql_case_expression("t.kabupaten", GeoLevel::Cluster);
        assert!(sql.starts_with(
            "CASE WHEN TRIM(REGEXP_REPLACE(UPPER(t.kabupaten), '[[:space:]]+', ' ')) IN ("
        ));
        assert!(sql.ends_with("ELSE NULL END"));
        assert!(sql.contains("'KAB. MALUKU TENGAH'"));
        assert!(sql.contains("'MALUKU TENGGARA BARAT'"));
        assert!(sql.contains("'KAB. MALUKU TENGGARA BARAT'"));
        assert!(sql.contains("'KABUPATEN TIMIKA'"));
        assert_eq!(sql.matches(" THEN 'WAMENA'").count(), 1);

        assert_eq!(sql_case_expression("kabupaten", GeoLevel::Regional), "'PUMA'");
    }

    // What the generated SQL does to the raw column before the IN lookup.
    fn sql_key(raw: &str) -> String {
        raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
    }

    // Kabupaten whose CASE branch accepts `raw`, first match wins as in SQL.
    fn sql_match(raw: &str) -> Option<&'static str> {
        let key = sql_key(raw);
        kabupaten_entries()
            .map(|(_, kabupaten)| kabupaten)
            .find(|&kabupaten| spellings(kabupaten).contains(&key))
    }

    #[test]
    fn sql_mapping_agrees_with_classify() {
        let raw_names = [
            "KAB. MALUKU TENGGARA BARAT",
            "Kabupaten Timika",
            "KAB.  MIMIKA",
            "Kab. Fak Fak",
            "  kab   wamena ",
            "kab tidore",
            "Kota\tSorong",
            "KAB. KOTA AMBON",
            "biak",
            "Kabupaten  Teluk   Bintuni",
            "KOTA MAKASSAR",
            "KAB. BANDUNG",
            "KABUPATEN",
            "",
        ];
        for raw in raw_names {
            let classified = classify(raw).map(|path| path.kabupaten);
            assert_eq!(sql_match(raw), classified.as_deref(), "raw name {raw:?}");
        }

        let sql = sql_case_expression("k", GeoLevel::Kabupaten);
        for raw in ["KAB. MALUKU TENGGARA BARAT", "Kabupaten Timika", "KAB.  MIMIKA", "Kab. Fak Fak"] {
            assert!(sql.contains(&sql_literal(&sql_key(raw))), "{raw:?} missing from the CASE lists");
        }
    }

    #[test]
    fn every_prefixed_alias_spelling_classifies_the_same_in_sql() {
        for (alias, canonical) in ALIASES {
            for prefix in ADMIN_PREFIXES {
                let raw = format!("{prefix}{alias}");
                assert_eq!(classify(&raw).map(|p| p.kabupaten).as_deref(), Some(*canonical));
                assert_eq!(sql_match(&raw), Some(*canonical), "raw name {raw:?}");
            }
        }
    }

    #[test]
    fn no_spelling_maps_to_two_kabupaten() {
        let mut seen = HashSet::new();
        for (_, kabupaten) in kabupaten_entries() {
            for spelling in spellings(kabupaten) {
                assert!(seen.insert(spelling.clone()), "{spelling} is ambiguous");
            }
        }
    }

    #[test]
    fn hierarchy_nests_every_kabupaten() {
        let tree = hierarchy();
        assert_eq!(tree.len(), 1);
        let branches: Vec<_> = tree[0].children.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(branches, ["AMBON", "SORONG", "JAYAPURA", "TIMIKA"]);

        let leaves: usize = tree[0]
            .children
            .iter()
            .flat_map(|b| &b.children)
            .flat_map(|s| &s.children)
            .map(|c| c.children.len())
            .sum();
        assert_eq!(leaves, kabupaten_count());
    }
}
