use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::person::ParentRole;

/// Deepest generation a tree holds (great-grandparents).
pub const MAX_GENERATION: u8 = 3;

/// Lineage a relation belongs to, seen from the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Through the principal's father.
    Paternal,
    /// Through the principal's mother.
    Maternal,
}

/// A member's ancestral path relative to the principal of a tree.
///
/// Great-grandparent variants read as `<sex><lineage><branch>`: the lineage
/// is the principal's parent the line passes through, the branch is the
/// grandparent it passes through. `GreatGrandfatherPaternalMaternal` is the
/// father's mother's father.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "principal")]
    Principal,
    #[serde(rename = "pere")]
    Father,
    #[serde(rename = "mere")]
    Mother,
    #[serde(rename = "grand-pere-paternel")]
    PaternalGrandfather,
    #[serde(rename = "grand-mere-paternelle")]
    PaternalGrandmother,
    #[serde(rename = "grand-pere-maternel")]
    MaternalGrandfather,
    #[serde(rename = "grand-mere-maternelle")]
    MaternalGrandmother,
    #[serde(rename = "arriere-grand-pere-paternel-paternel")]
    GreatGrandfatherPaternalPaternal,
    #[serde(rename = "arriere-grand-mere-paternelle-paternelle")]
    GreatGrandmotherPaternalPaternal,
    #[serde(rename = "arriere-grand-pere-paternel-maternel")]
    GreatGrandfatherPaternalMaternal,
    #[serde(rename = "arriere-grand-mere-paternelle-maternelle")]
    GreatGrandmotherPaternalMaternal,
    #[serde(rename = "arriere-grand-pere-maternel-paternel")]
    GreatGrandfatherMaternalPaternal,
    #[serde(rename = "arriere-grand-mere-maternelle-paternelle")]
    GreatGrandmotherMaternalPaternal,
    #[serde(rename = "arriere-grand-pere-maternel-maternel")]
    GreatGrandfatherMaternalMaternal,
    #[serde(rename = "arriere-grand-mere-maternelle-maternelle")]
    GreatGrandmotherMaternalMaternal,
}

impl Relation {
    /// Every relation, ordered by generation then slot.
    pub const ALL: [Relation; 15] = [
        Relation::Principal,
        Relation::Father,
        Relation::Mother,
        Relation::PaternalGrandfather,
        Relation::PaternalGrandmother,
        Relation::MaternalGrandfather,
        Relation::MaternalGrandmother,
        Relation::GreatGrandfatherPaternalPaternal,
        Relation::GreatGrandmotherPaternalPaternal,
        Relation::GreatGrandfatherPaternalMaternal,
        Relation::GreatGrandmotherPaternalMaternal,
        Relation::GreatGrandfatherMaternalPaternal,
        Relation::GreatGrandmotherMaternalPaternal,
        Relation::GreatGrandfatherMaternalMaternal,
        Relation::GreatGrandmotherMaternalMaternal,
    ];

    /// Distance from the principal along the ancestor axis.
    pub fn generation(&self) -> u8 {
        match self {
            Relation::Principal => 0,
            Relation::Father | Relation::Mother => 1,
            Relation::PaternalGrandfather
            | Relation::PaternalGrandmother
            | Relation::MaternalGrandfather
            | Relation::MaternalGrandmother => 2,
            _ => 3,
        }
    }

    /// The relation one generation up through `role`.
    ///
    /// Returns None for great-grandparents, whose parents are outside the tree.
    pub fn parent(&self, role: ParentRole) -> Option<Relation> {
        use ParentRole::{Father, Mother};

        let relation = match (self, role) {
            (Relation::Principal, Father) => Relation::Father,
            (Relation::Principal, Mother) => Relation::Mother,
            (Relation::Father, Father) => Relation::PaternalGrandfather,
            (Relation::Father, Mother) => Relation::PaternalGrandmother,
            (Relation::Mother, Father) => Relation::MaternalGrandfather,
            (Relation::Mother, Mother) => Relation::MaternalGrandmother,
            (Relation::PaternalGrandfather, Father) => Relation::GreatGrandfatherPaternalPaternal,
            (Relation::PaternalGrandfather, Mother) => Relation::GreatGrandmotherPaternalPaternal,
            (Relation::PaternalGrandmother, Father) => Relation::GreatGrandfatherPaternalMaternal,
            (Relation::PaternalGrandmother, Mother) => Relation::GreatGrandmotherPaternalMaternal,
            (Relation::MaternalGrandfather, Father) => Relation::GreatGrandfatherMaternalPaternal,
            (Relation::MaternalGrandfather, Mother) => Relation::GreatGrandmotherMaternalPaternal,
            (Relation::MaternalGrandmother, Father) => Relation::GreatGrandfatherMaternalMaternal,
            (Relation::MaternalGrandmother, Mother) => Relation::GreatGrandmotherMaternalMaternal,
            _ => return None,
        };
        Some(relation)
    }

    /// Lineage of this relation; None for the principal.
    pub fn side(&self) -> Option<Side> {
        match self {
            Relation::Principal => None,
            Relation::Father
            | Relation::PaternalGrandfather
            | Relation::PaternalGrandmother
            | Relation::GreatGrandfatherPaternalPaternal
            | Relation::GreatGrandmotherPaternalPaternal
            | Relation::GreatGrandfatherPaternalMaternal
            | Relation::GreatGrandmotherPaternalMaternal => Some(Side::Paternal),
            Relation::Mother
            | Relation::MaternalGrandfather
            | Relation::MaternalGrandmother
            | Relation::GreatGrandfatherMaternalPaternal
            | Relation::GreatGrandmotherMaternalPaternal
            | Relation::GreatGrandfatherMaternalMaternal
            | Relation::GreatGrandmotherMaternalMaternal => Some(Side::Maternal),
        }
    }

    /// Left-to-right position of this relation within its generation.
    ///
    /// Both parents of an ancestor occupy slots `2k` and `2k + 1` where `k`
    /// is that ancestor's slot, so each couple sits side by side above its
    /// child.
    pub fn slot(&self) -> usize {
        match self {
            Relation::Principal => 0,
            Relation::Father => 0,
            Relation::Mother => 1,
            Relation::PaternalGrandfather => 0,
            Relation::PaternalGrandmother => 1,
            Relation::MaternalGrandfather => 2,
            Relation::MaternalGrandmother => 3,
            Relation::GreatGrandfatherPaternalPaternal => 0,
            Relation::GreatGrandmotherPaternalPaternal => 1,
            Relation::GreatGrandfatherPaternalMaternal => 2,
            Relation::GreatGrandmotherPaternalMaternal => 3,
            Relation::GreatGrandfatherMaternalPaternal => 4,
            Relation::GreatGrandmotherMaternalPaternal => 5,
            Relation::GreatGrandfatherMaternalMaternal => 6,
            Relation::GreatGrandmotherMaternalMaternal => 7,
        }
    }

    /// Registry label, as persisted.
    pub fn label(&self) -> &'static str {
        match self {
            Relation::Principal => "principal",
            Relation::Father => "pere",
            Relation::Mother => "mere",
            Relation::PaternalGrandfather => "grand-pere-paternel",
            Relation::PaternalGrandmother => "grand-mere-paternelle",
            Relation::MaternalGrandfather => "grand-pere-maternel",
            Relation::MaternalGrandmother => "grand-mere-maternelle",
            Relation::GreatGrandfatherPaternalPaternal => "arriere-grand-pere-paternel-paternel",
            Relation::GreatGrandmotherPaternalPaternal => "arriere-grand-mere-paternelle-paternelle",
            Relation::GreatGrandfatherPaternalMaternal => "arriere-grand-pere-paternel-maternel",
            Relation::GreatGrandmotherPaternalMaternal => "arriere-grand-mere-paternelle-maternelle",
            Relation::GreatGrandfatherMaternalPaternal => "arriere-grand-pere-maternel-paternel",
            Relation::GreatGrandmotherMaternalPaternal => "arriere-grand-mere-maternelle-paternelle",
            Relation::GreatGrandfatherMaternalMaternal => "arriere-grand-pere-maternel-maternel",
            Relation::GreatGrandmotherMaternalMaternal => "arriere-grand-mere-maternelle-maternelle",
        }
    }

    /// Human-readable English name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Relation::Principal => "Principal",
            Relation::Father => "Father",
            Relation::Mother => "Mother",
            Relation::PaternalGrandfather => "Paternal grandfather",
            Relation::PaternalGrandmother => "Paternal grandmother",
            Relation::MaternalGrandfather => "Maternal grandfather",
            Relation::MaternalGrandmother => "Maternal grandmother",
            Relation::GreatGrandfatherPaternalPaternal => "Father's father's father",
            Relation::GreatGrandmotherPaternalPaternal => "Father's father's mother",
            Relation::GreatGrandfatherPaternalMaternal => "Father's mother's father",
            Relation::GreatGrandmotherPaternalMaternal => "Father's mother's mother",
            Relation::GreatGrandfatherMaternalPaternal => "Mother's father's father",
            Relation::GreatGrandmotherMaternalPaternal => "Mother's father's mother",
            Relation::GreatGrandfatherMaternalMaternal => "Mother's mother's father",
            Relation::GreatGrandmotherMaternalMaternal => "Mother's mother's mother",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown relation label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown relation label: {0}")]
pub struct UnknownRelation(pub String);

impl FromStr for Relation {
    type Err = UnknownRelation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .iter()
            .copied()
            .find(|r| r.label() == s)
            .ok_or_else(|| UnknownRelation(s.to_string()))
    }
}
