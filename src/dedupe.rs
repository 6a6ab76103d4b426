//! Duplicate import resolution.
//!
//! Groups import specs by normalized path and, for every group with more
//! than one member, picks the surviving spec under the configured keep
//! policy. Everything else in the group is marked removed, pointing at the
//! survivor that subsumes it. Dot and blank imports never participate: a
//! dot import injects names directly into scope and a blank import exists
//! only for side effects, so either can coexist with a regular import of
//! the same path.

use crate::imports::ImportSpec;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashMap;

/// Which spec of a duplicate group survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KeepPolicy {
    /// The first spec in declaration order.
    First,
    /// The first spec with no explicit alias; falls back to the first.
    #[default]
    Unnamed,
    /// The spec with the shortest alias, earliest occurrence breaking ties;
    /// falls back to the first.
    Named,
    /// The first spec carrying a doc or trailing comment; falls back to the
    /// first.
    Comment,
}

/// Removal status for one import spec, parallel to the spec list.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub remove: bool,
    /// Index of the surviving spec that subsumes this one.
    pub subsumed_by: Option<usize>,
}

/// Marks duplicate specs for removal. The returned vector is parallel to
/// `specs`; at most one spec per duplicate group is left unmarked.
pub fn mark_duplicates(specs: &[ImportSpec], policy: KeepPolicy) -> Vec<Resolution> {
    let mut marks = vec![Resolution::default(); specs.len()];

    for group in group_by_path(specs) {
        if group.len() <= 1 {
            continue;
        }
        let keep = match policy {
            KeepPolicy::First => 0,
            KeepPolicy::Unnamed => group
                .iter()
                .position(|&i| specs[i].alias.is_none())
                .unwrap_or(0),
            KeepPolicy::Named => group
                .iter()
                .enumerate()
                .filter_map(|(pos, &i)| specs[i].alias.as_ref().map(|a| (a.len(), pos)))
                .min()
                .map(|(_, pos)| pos)
                .unwrap_or(0),
            KeepPolicy::Comment => group
                .iter()
                .position(|&i| specs[i].has_comment)
                .unwrap_or(0),
        };
        for (pos, &i) in group.iter().enumerate() {
            if pos != keep {
                marks[i] = Resolution {
                    remove: true,
                    subsumed_by: Some(group[keep]),
                };
            }
        }
    }

    marks
}

/// Groups spec indices by normalized path, in first-occurrence order,
/// skipping dot and blank imports.
fn group_by_path(specs: &[ImportSpec]) -> Vec<Vec<usize>> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, spec) in specs.iter().enumerate() {
        if spec.is_dot() || spec.is_blank() {
            continue;
        }
        match order.get(spec.path.as_str()) {
            Some(&g) => groups[g].push(i),
            None => {
                order.insert(spec.path.as_str(), groups.len());
                groups.push(vec![i]);
            }
        }
    }
    groups
}

/// One resolved duplicate group, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub path: String,
    /// Local name of the surviving spec.
    pub kept: String,
    /// Local names of the removed specs, in declaration order.
    pub removed: Vec<String>,
}

/// Summarizes the duplicate groups found by [`mark_duplicates`], in
/// first-occurrence order.
pub fn summarize(
    specs: &[ImportSpec],
    marks: &[Resolution],
    names: &HashMap<String, String>,
) -> Vec<GroupSummary> {
    let mut order: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<GroupSummary> = Vec::new();
    for (i, mark) in marks.iter().enumerate() {
        if !mark.remove {
            continue;
        }
        let Some(survivor) = mark.subsumed_by else {
            panic!("removed spec without a subsuming spec");
        };
        let g = *order.entry(survivor).or_insert_with(|| {
            groups.push(GroupSummary {
                path: specs[survivor].path.clone(),
                kept: specs[survivor].local_name(names),
                removed: Vec::new(),
            });
            groups.len() - 1
        });
        groups[g].removed.push(specs[i].local_name(names));
    }
    groups
}
