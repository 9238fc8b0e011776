//! Ancestor closure: walks parent-NIN back-references up from a principal.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::person::{ParentRole, Person};
use crate::relation::{Relation, MAX_GENERATION};

use super::TreeMember;

/// Largest possible closure: 1 + 2 + 4 + 8.
pub const MAX_MEMBERS: usize = 15;

/// Collects the principal and every resolvable ancestor up to great-grandparents.
///
/// `registry` is a full snapshot of the person records. Each resolved record
/// is copied into a [`TreeMember`] carrying its generation and relation to
/// `principal`; the records themselves are left untouched.
///
/// A parent NIN that does not resolve ends that lineage: nothing above it is
/// looked up. A record that is already part of the closure (same id) is not
/// added a second time and its parents are not walked again.
///
/// Members come out generation by generation, father before mother.
pub fn build_closure(principal: &Person, registry: &[Person]) -> Vec<TreeMember> {
    let root = TreeMember::new(principal.clone(), Relation::Principal);

    if !principal.has_parent_refs() {
        debug!(principal = %principal.id, "no parent references, closure is the principal alone");
        return vec![root];
    }

    // First record wins for a given NIN, like a linear scan would.
    let mut by_nin: HashMap<&str, &Person> = HashMap::with_capacity(registry.len());
    for person in registry {
        by_nin.entry(person.nin.as_str()).or_insert(person);
    }

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(principal.id.clone());

    let mut members = vec![root];
    let mut frontier = 0..1;

    while !frontier.is_empty() {
        let start = members.len();

        for index in frontier.clone() {
            let child = &members[index];
            if child.generation >= MAX_GENERATION {
                continue;
            }

            let mut found = Vec::with_capacity(2);
            for role in ParentRole::BOTH {
                let Some(nin) = child.person.parent_ref(role) else {
                    continue;
                };
                let Some(relation) = child.relation.parent(role) else {
                    continue;
                };
                let Some(parent) = by_nin.get(nin) else {
                    debug!(%nin, %relation, "parent reference does not resolve, branch ends");
                    continue;
                };
                if !seen.insert(parent.id.clone()) {
                    debug!(id = %parent.id, %relation, "person already in closure, skipping");
                    continue;
                }
                found.push(TreeMember::new((*parent).clone(), relation));
            }
            members.extend(found);
        }

        frontier = start..members.len();
    }

    debug!(
        principal = %principal.id,
        members = members.len(),
        "ancestor closure built"
    );
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::{NewPerson, Sex};

    fn person(id: &str, nin: &str, sex: Sex, father: Option<&str>, mother: Option<&str>) -> Person {
        let mut p = NewPerson::new(nin, format!("Surname{id}"), format!("Given{id}"), sex);
        p.father_nin = father.map(str::to_string);
        p.mother_nin = mother.map(str::to_string);
        p.with_id(id)
    }

    fn nin(n: u32) -> String {
        format!("{:015}", n)
    }

    /// Builds a complete four-generation pedigree: person k has parents 2k and 2k+1.
    fn full_pedigree() -> Vec<Person> {
        (1..=15u32)
            .map(|k| {
                let sex = if k % 2 == 0 || k == 1 { Sex::Male } else { Sex::Female };
                let (father, mother) = if k < 8 {
                    (Some(nin(2 * k)), Some(nin(2 * k + 1)))
                } else {
                    (None, None)
                };
                person(
                    &k.to_string(),
                    &nin(k),
                    sex,
                    father.as_deref(),
                    mother.as_deref(),
                )
            })
            .collect()
    }

    #[test]
    fn test_singleton_without_parent_refs() {
        let a = person("a", "111111111111111", Sex::Male, None, None);
        let members = build_closure(&a, &[a.clone()]);

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].person.id, "a");
        assert_eq!(members[0].generation, 0);
        assert_eq!(members[0].relation, Relation::Principal);
    }

    #[test]
    fn test_full_pedigree_has_fifteen_members() {
        let registry = full_pedigree();
        let members = build_closure(&registry[0], &registry);

        assert_eq!(members.len(), MAX_MEMBERS);
        let relations: HashSet<Relation> = members.iter().map(|m| m.relation).collect();
        assert_eq!(relations.len(), MAX_MEMBERS);

        let member = |id: &str| members.iter().find(|m| m.person.id == id).unwrap();
        assert_eq!(member("2").relation, Relation::Father);
        assert_eq!(member("3").relation, Relation::Mother);
        assert_eq!(member("5").relation, Relation::PaternalGrandmother);
        assert_eq!(member("6").relation, Relation::MaternalGrandfather);
        assert_eq!(member("8").relation, Relation::GreatGrandfatherPaternalPaternal);
        assert_eq!(member("11").relation, Relation::GreatGrandmotherPaternalMaternal);
        assert_eq!(member("15").relation, Relation::GreatGrandmotherMaternalMaternal);
        for m in &members {
            assert_eq!(m.generation, m.relation.generation());
        }
    }

    #[test]
    fn test_does_not_walk_past_great_grandparents() {
        let mut registry = full_pedigree();
        // Give a great-grandparent parents that exist in the registry.
        registry[7].father_nin = Some(nin(1));
        registry.push(person("x", &nin(99), Sex::Male, None, None));
        registry[8].father_nin = Some(nin(99));

        let members = build_closure(&registry[0], &registry);
        assert_eq!(members.len(), MAX_MEMBERS);
        assert!(members.iter().all(|m| m.person.id != "x"));
    }

    #[test]
    fn test_pedigree_collapse_is_deduplicated() {
        // Both parents share the same father.
        let gf = person("gf", &nin(10), Sex::Male, None, None);
        let f = person("f", &nin(2), Sex::Male, Some(&nin(10)), None);
        let m = person("m", &nin(3), Sex::Female, Some(&nin(10)), None);
        let a = person("a", &nin(1), Sex::Male, Some(&nin(2)), Some(&nin(3)));
        let registry = vec![a.clone(), f, m, gf];

        let members = build_closure(&a, &registry);
        assert_eq!(members.len(), 4);
        let gf_member = members.iter().find(|m| m.person.id == "gf").unwrap();
        assert_eq!(gf_member.relation, Relation::PaternalGrandfather);
    }

    #[test]
    fn test_registry_records_are_not_modified() {
        let registry = full_pedigree();
        let before = registry.clone();
        let _ = build_closure(&registry[1], &registry);
        assert_eq!(registry, before);
    }

    #[test]
    fn test_same_person_has_relation_per_principal() {
        let registry = full_pedigree();
        let from_root = build_closure(&registry[0], &registry);
        let from_father = build_closure(&registry[1], &registry);

        let in_root = from_root.iter().find(|m| m.person.id == "4").unwrap();
        let in_father = from_father.iter().find(|m| m.person.id == "4").unwrap();
        assert_eq!(in_root.relation, Relation::PaternalGrandfather);
        assert_eq!(in_father.relation, Relation::Father);
        assert_eq!(in_root.generation, 2);
        assert_eq!(in_father.generation, 1);
    }
}
