//! Column projection: which nodes of the type tree a scan must decode.
//!
//! Projection works on top-level columns only. Selecting a struct, list or map
//! column selects its whole subtree, since nested values are never decoded
//! partially.

use std::collections::BTreeSet;

use crate::error::{DwrfError, Result};
use crate::types::TypeTree;

/// Configuration key carrying the comma separated top-level column ordinals a
/// query reads.
pub const READ_COLUMN_IDS_CONF_STR: &str = "hive.io.file.readcolumn.ids";

/// Requested top-level columns, as type ids of children of the root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnProjection {
    #[default]
    All,
    Columns(BTreeSet<u32>),
    /// Columns were requested but none of them exist in this file, e.g. the
    /// table gained columns after the file was written.
    Missing,
}

impl ColumnProjection {
    /// Parse a `hive.io.file.readcolumn.ids` value (column ordinals) against
    /// the file's schema. Absent or blank means every column; ordinals past
    /// the last column are ignored.
    pub fn from_conf(value: Option<&str>, types: &TypeTree) -> Result<Self> {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return Ok(ColumnProjection::All);
        };
        let ordinals = parse_ordinals(value)?;
        Ok(Self::from_ordinals(&ordinals, types))
    }

    pub fn from_ordinals(ordinals: &BTreeSet<usize>, types: &TypeTree) -> Self {
        if ordinals.is_empty() {
            return ColumnProjection::All;
        }
        let ids: BTreeSet<u32> = types
            .columns()
            .iter()
            .enumerate()
            .filter(|(ordinal, _)| ordinals.contains(ordinal))
            .map(|(_, &id)| id)
            .collect();
        if ids.is_empty() {
            ColumnProjection::Missing
        } else {
            ColumnProjection::Columns(ids)
        }
    }
}

pub(crate) fn parse_ordinals(value: &str) -> Result<BTreeSet<usize>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>().map_err(|e| DwrfError::Config {
                key: READ_COLUMN_IDS_CONF_STR.into(),
                reason: format!("{s:?}: {e}"),
            })
        })
        .collect()
}

/// Per-node decode flags, indexed by type id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionMask(Vec<bool>);

impl InclusionMask {
    pub fn is_included(&self, id: u32) -> bool {
        self.0.get(id as usize).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// What a scan decodes: everything, or the nodes flagged in a mask.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnInclusion {
    #[default]
    All,
    Mask(InclusionMask),
}

impl ColumnInclusion {
    pub fn is_all(&self) -> bool {
        matches!(self, ColumnInclusion::All)
    }

    pub fn is_included(&self, id: u32) -> bool {
        match self {
            ColumnInclusion::All => true,
            ColumnInclusion::Mask(mask) => mask.is_included(id),
        }
    }

    pub fn mask(&self) -> Option<&InclusionMask> {
        match self {
            ColumnInclusion::All => None,
            ColumnInclusion::Mask(mask) => Some(mask),
        }
    }

    /// Flags for each top-level column, in column order.
    pub fn top_level(&self, types: &TypeTree) -> Vec<bool> {
        types.columns().iter().map(|&id| self.is_included(id)).collect()
    }
}

/// Turn a projection into the set of type nodes to decode.
///
/// The root is always included; every requested root child is included with
/// its whole subtree. Returns [`ColumnInclusion::All`] when nothing was
/// requested or when the projection ends up covering every node anyway.
/// [`ColumnProjection::Missing`] keeps only the root.
pub fn find_included_columns(types: &TypeTree, projection: &ColumnProjection) -> ColumnInclusion {
    let empty = BTreeSet::new();
    let requested = match projection {
        ColumnProjection::All => return ColumnInclusion::All,
        ColumnProjection::Columns(ids) if ids.is_empty() => return ColumnInclusion::All,
        ColumnProjection::Columns(ids) => ids,
        ColumnProjection::Missing => &empty,
    };

    let mut result = vec![false; types.len()];
    result[0] = true;
    let mut pending: Vec<u32> = types
        .columns()
        .iter()
        .copied()
        .filter(|id| requested.contains(id))
        .collect();
    while let Some(id) = pending.pop() {
        let slot = &mut result[id as usize];
        if *slot {
            continue;
        }
        *slot = true;
        if let Some(node) = types.get(id) {
            pending.extend(node.children.iter().copied());
        }
    }

    if result.iter().all(|&included| included) {
        ColumnInclusion::All
    } else {
        ColumnInclusion::Mask(InclusionMask(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, TypeKind, TypeNode};

    fn ids(v: &[u32]) -> ColumnProjection {
        ColumnProjection::Columns(v.iter().copied().collect())
    }

    fn node(id: u32, kind: TypeKind, children: &[u32]) -> TypeNode {
        let field_names = match kind {
            TypeKind::Struct => children.iter().map(|c| format!("f{c}")).collect(),
            _ => Vec::new(),
        };
        TypeNode {
            id,
            kind,
            children: children.to_vec(),
            field_names,
        }
    }

    /// root(0) -> [1: int, 2: struct(3: int, 4: string)]
    fn scalar_and_struct() -> TypeTree {
        TypeTree::from_nodes(vec![
            node(0, TypeKind::Struct, &[1, 2]),
            node(1, TypeKind::Int, &[]),
            node(2, TypeKind::Struct, &[3, 4]),
            node(3, TypeKind::Int, &[]),
            node(4, TypeKind::String, &[]),
        ])
        .unwrap()
    }

    fn really_big_row() -> TypeTree {
        let inner = DataType::Struct(vec![
            Field::new("int1", DataType::Int),
            Field::new("string1", DataType::String),
        ]);
        TypeTree::from_fields(&[
            Field::new("boolean1", DataType::Boolean),
            Field::new("long1", DataType::Long),
            Field::new("bytes1", DataType::Binary),
            Field::new(
                "middle",
                DataType::Struct(vec![Field::new("list", DataType::list(inner.clone()))]),
            ),
            Field::new("list", DataType::list(inner.clone())),
            Field::new("map", DataType::map(DataType::String, inner)),
        ])
    }

    #[test]
    fn struct_column_pulls_in_its_subtree() {
        let types = scalar_and_struct();
        let inc = find_included_columns(&types, &ids(&[2]));
        let mask = inc.mask().expect("partial projection keeps a mask");
        assert_eq!(mask.as_slice(), &[true, false, true, true, true]);
    }

    #[test]
    fn scalar_column_excludes_siblings() {
        let types = scalar_and_struct();
        let inc = find_included_columns(&types, &ids(&[1]));
        assert_eq!(
            inc.mask().map(|m| m.as_slice().to_vec()),
            Some(vec![true, true, false, false, false])
        );
        assert_eq!(inc.top_level(&types), vec![true, false]);
    }

    #[test]
    fn nothing_requested_means_no_filtering() {
        let types = scalar_and_struct();
        assert_eq!(
            find_included_columns(&types, &ColumnProjection::All),
            ColumnInclusion::All
        );
        assert_eq!(find_included_columns(&types, &ids(&[])), ColumnInclusion::All);
    }

    #[test]
    fn covering_every_column_degrades_to_no_filtering() {
        let types = scalar_and_struct();
        assert_eq!(find_included_columns(&types, &ids(&[1, 2])), ColumnInclusion::All);
    }

    #[test]
    fn nested_ids_are_not_top_level_columns() {
        let types = scalar_and_struct();
        // 3 lives inside column 2; asking for it alone selects nothing but the root
        let inc = find_included_columns(&types, &ids(&[3]));
        assert_eq!(
            inc.mask().map(|m| m.as_slice().to_vec()),
            Some(vec![true, false, false, false, false])
        );
    }

    #[test]
    fn included_set_is_ancestors_plus_subtrees() {
        let types = really_big_row();
        let columns = types.columns().to_vec();
        // every non-empty subset of the six columns
        for bits in 1u32..(1 << columns.len()) {
            let picked: Vec<u32> = (0..columns.len())
                .filter(|i| bits & (1 << i) != 0)
                .map(|i| columns[i])
                .collect();
            let inc = find_included_columns(&types, &ids(&picked));

            let mut expected = vec![false; types.len()];
            expected[0] = true;
            for &c in &picked {
                let end = columns
                    .iter()
                    .position(|&x| x == c)
                    .and_then(|p| columns.get(p + 1).copied())
                    .unwrap_or(types.len() as u32);
                for id in c..end {
                    expected[id as usize] = true;
                }
            }
            for id in 0..types.len() as u32 {
                assert_eq!(inc.is_included(id), expected[id as usize], "bits={bits:b} id={id}");
            }
            assert_eq!(inc.is_all(), expected.iter().all(|&b| b));
        }
    }

    #[test]
    fn conf_string_is_parsed_as_ordinals() {
        let types = scalar_and_struct();
        assert_eq!(
            ColumnProjection::from_conf(None, &types).unwrap(),
            ColumnProjection::All
        );
        assert_eq!(
            ColumnProjection::from_conf(Some("  "), &types).unwrap(),
            ColumnProjection::All
        );
        // ordinal 1 is the struct column, type id 2
        assert_eq!(ColumnProjection::from_conf(Some("1"), &types).unwrap(), ids(&[2]));
        assert_eq!(
            ColumnProjection::from_conf(Some("0, 1,7"), &types).unwrap(),
            ids(&[1, 2])
        );
        let err = ColumnProjection::from_conf(Some("0,x"), &types).unwrap_err();
        assert!(matches!(err, DwrfError::Config { .. }));
    }

    #[test]
    fn unknown_ordinals_keep_only_the_root() {
        let types = scalar_and_struct();
        let p = ColumnProjection::from_conf(Some("7"), &types).unwrap();
        assert_eq!(p, ColumnProjection::Missing);
        assert_eq!(
            find_included_columns(&types, &p).mask().map(|m| m.as_slice().to_vec()),
            Some(vec![true, false, false, false, false])
        );
        // a known ordinal next to an unknown one still selects the known column
        let p = ColumnProjection::from_conf(Some("7,0"), &types).unwrap();
        assert_eq!(p, ids(&[1]));
    }

    #[test]
    fn separators_only_projects_nothing() {
        let types = scalar_and_struct();
        let p = ColumnProjection::from_conf(Some(",,"), &types).unwrap();
        assert_eq!(find_included_columns(&types, &p), ColumnInclusion::All);
    }
}
