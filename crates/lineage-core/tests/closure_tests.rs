use std::collections::HashSet;

use lineage_core::seed::sample_family;
use lineage_core::tree::{assemble, build_closure, merge_member, MAX_MEMBERS};
use lineage_core::{NewPerson, Person, Relation, Sex};

fn person(id: &str, nin: &str, father: Option<&str>, mother: Option<&str>) -> Person {
    let mut p = NewPerson::new(nin, "Keita", id, Sex::Male);
    p.father_nin = father.map(str::to_string);
    p.mother_nin = mother.map(str::to_string);
    p.with_id(id)
}

const A: &str = "111111111111111";
const B: &str = "222222222222222";
const C: &str = "333333333333333";
const D: &str = "444444444444444";

fn family() -> (Person, Person, Person, Person) {
    (
        person("a", A, Some(B), Some(C)),
        person("b", B, Some(D), None),
        person("c", C, None, None),
        person("d", D, None, None),
    )
}

#[test]
fn test_linear_family() {
    let a = person("a", A, None, None);
    let members = build_closure(&a, &[a.clone()]);

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].person, a);
    assert_eq!(members[0].generation, 0);
    assert_eq!(members[0].relation, Relation::Principal);
}

#[test]
fn test_full_depth() {
    let (a, b, c, d) = family();
    let members = build_closure(&a, &[a.clone(), b, c, d]);

    let summary: Vec<(&str, u8, &str)> = members
        .iter()
        .map(|m| (m.person.id.as_str(), m.generation, m.relation.label()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a", 0, "principal"),
            ("b", 1, "pere"),
            ("c", 1, "mere"),
            ("d", 2, "grand-pere-paternel"),
        ]
    );
}

#[test]
fn test_missing_branch() {
    let (a, b, _c, d) = family();
    // C's parents exist, but C does not
    let c_father = person("cf", "555555555555555", None, None);
    let members = build_closure(&a, &[a.clone(), b, d, c_father]);

    let ids: Vec<&str> = members.iter().map(|m| m.person.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "d"]);
    assert!(members.iter().all(|m| m.relation.side() != Some(lineage_core::Side::Maternal)));
}

#[test]
fn test_dangling_father_cuts_paternal_side() {
    // the father is missing, yet records that would be his parents exist
    let a = person("a", A, Some(B), Some(C));
    let c = person("c", C, None, None);
    let would_be_grandfather = person("d", D, None, None);
    let orphan = person("x", "999999999999999", Some(D), None);

    let members = build_closure(&a, &[a.clone(), c, would_be_grandfather, orphan]);
    assert_eq!(members.len(), 2);
    assert!(members
        .iter()
        .all(|m| m.relation.side() != Some(lineage_core::Side::Paternal)));
}

#[test]
fn test_sample_family_closures_are_bounded() {
    let family = sample_family();
    for principal in &family {
        let members = build_closure(principal, &family);
        assert!(members.len() <= MAX_MEMBERS);
        assert_eq!(members[0].person.id, principal.id);
        assert_eq!(members[0].relation, Relation::Principal);
        assert!(members.iter().all(|m| m.generation <= 3));
    }

    let youngest = family.iter().find(|p| p.id == "1").unwrap();
    let members = build_closure(youngest, &family);
    assert_eq!(members.len(), 15);
    let relations: HashSet<Relation> = members.iter().map(|m| m.relation).collect();
    assert_eq!(relations.len(), 15);
}

#[test]
fn test_rebuild_is_idempotent() {
    let family = sample_family();
    let principal = &family[1];

    let first: HashSet<(String, Relation)> = build_closure(principal, &family)
        .into_iter()
        .map(|m| (m.person.id, m.relation))
        .collect();
    let second: HashSet<(String, Relation)> = build_closure(principal, &family)
        .into_iter()
        .map(|m| (m.person.id, m.relation))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_deeper_ancestors_are_not_followed() {
    let family = sample_family();
    // give a great-grandparent a parent of their own
    let mut extended = family.clone();
    let seydou = extended.iter_mut().find(|p| p.id == "8").unwrap();
    seydou.father_nin = Some("123456789999999".to_string());
    extended.push(person("16", "123456789999999", None, None));

    let principal = extended.iter().find(|p| p.id == "1").unwrap();
    let members = build_closure(principal, &extended);
    assert_eq!(members.len(), 15);
    assert!(members.iter().all(|m| m.person.id != "16"));
}

#[test]
fn test_merge_replaces_in_place() {
    let (a, b, c, d) = family();
    let tree = assemble(a.clone(), build_closure(&a, &[a.clone(), b.clone(), c, d]));
    let before = tree.len();

    let mut edited = b.clone();
    edited.given_name = "Ibrahim".to_string();
    let merged = merge_member(tree, edited).unwrap();

    assert_eq!(merged.len(), before);
    let member = merged.member("b").unwrap();
    assert_eq!(member.person.given_name, "Ibrahim");
    assert_eq!(member.relation, Relation::Father);
    assert_eq!(merged.principal, a);
}

#[test]
fn test_merge_updates_principal_reference() {
    let (a, b, c, d) = family();
    let tree = assemble(a.clone(), build_closure(&a, &[a.clone(), b, c, d]));

    let mut edited = a.clone();
    edited.birth_place = Some("Bamako".to_string());
    let merged = merge_member(tree, edited.clone()).unwrap();

    assert_eq!(merged.principal, edited);
    assert_eq!(merged.members[0].person, edited);
    assert_eq!(merged.members[0].relation, Relation::Principal);
}

#[test]
fn test_merge_appends_newly_registered_parent() {
    let (a, b, _c, d) = family();
    let tree = assemble(a.clone(), build_closure(&a, &[a.clone(), b, d]));
    assert_eq!(tree.len(), 3);

    let mother = person("c", C, None, None);
    let merged = merge_member(tree, mother).unwrap();
    assert_eq!(merged.len(), 4);
    let member = merged.member("c").unwrap();
    assert_eq!(member.relation, Relation::Mother);
    assert_eq!(member.generation, 1);
}

#[test]
fn test_merge_rejects_unrelated_person() {
    let (a, b, c, d) = family();
    let tree = assemble(a.clone(), build_closure(&a, &[a.clone(), b, c, d]));

    let stranger = person("z", "777777777777777", None, None);
    assert!(merge_member(tree, stranger).is_err());
}
