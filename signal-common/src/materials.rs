use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Built-in wall materials and their attenuation in dB.
pub const DEFAULT_MATERIALS: &[(char, u32)] = &[
    ('b', 22), // brick
    ('c', 6),  // concrete
    ('d', 4),  // drywall
    ('g', 20), // glass
    ('w', 6),  // wood
    ('n', 0),  // no wall
];

/// Maps single-character wall codes to an attenuation rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttenuationTable {
    entries: BTreeMap<char, u32>,
}

impl Default for AttenuationTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_MATERIALS.iter().copied().collect(),
        }
    }
}

impl AttenuationTable {
    /// Default table with `overrides` layered on top (new codes are added).
    pub fn with_overrides(overrides: &BTreeMap<char, u32>) -> Self {
        let mut table = Self::default();
        table.entries.extend(overrides.iter().map(|(&code, &rate)| (code, rate)));
        table
    }

    /// Attenuation for `code`, or `None` when the material is unknown.
    #[inline]
    pub fn attenuation(&self, code: char) -> Option<u32> {
        self.entries.get(&code).copied()
    }

    pub fn contains(&self, code: char) -> bool {
        self.entries.contains_key(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_builtin_materials() {
        let table = AttenuationTable::default();
        assert_eq!(table.attenuation('b'), Some(22));
        assert_eq!(table.attenuation('c'), Some(6));
        assert_eq!(table.attenuation('d'), Some(4));
        assert_eq!(table.attenuation('g'), Some(20));
        assert_eq!(table.attenuation('w'), Some(6));
        assert_eq!(table.attenuation('n'), Some(0));
    }

    #[test]
    fn unknown_code_has_no_attenuation() {
        let table = AttenuationTable::default();
        assert_eq!(table.attenuation('x'), None);
        assert_eq!(table.attenuation('B'), None);
        assert!(!table.contains('x'));
    }

    #[test]
    fn overrides_replace_and_extend() {
        let overrides: BTreeMap<char, u32> = [('b', 30), ('m', 40)].into_iter().collect();
        let table = AttenuationTable::with_overrides(&overrides);
        assert_eq!(table.attenuation('b'), Some(30));
        assert_eq!(table.attenuation('m'), Some(40));
        assert_eq!(table.attenuation('g'), Some(20));
        assert!(!table.contains('x'));
    }
}
