use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of digits in a national identification number.
pub const NIN_LENGTH: usize = 15;

/// Sex as recorded in the civil registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Single-letter registry code.
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A person record as stored in the registry.
///
/// This is the absolute, tree-independent view of a person. Anything that
/// depends on a particular tree's principal (generation, relation) lives in
/// [`TreeMember`](crate::tree::TreeMember) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Stable record identifier.
    pub id: String,
    /// National identification number (15 digits, unique).
    pub nin: String,
    pub surname: String,
    pub given_name: String,
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_surname: Option<String>,
    /// NIN of the father, used as a back-reference when building trees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_nin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_surname: Option<String>,
    /// NIN of the mother, used as a back-reference when building trees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_nin: Option<String>,
}

impl Person {
    /// Father's NIN, treating an empty string as absent.
    pub fn father_ref(&self) -> Option<&str> {
        non_empty(self.father_nin.as_deref())
    }

    /// Mother's NIN, treating an empty string as absent.
    pub fn mother_ref(&self) -> Option<&str> {
        non_empty(self.mother_nin.as_deref())
    }

    /// Returns the parent NIN for the given role.
    pub fn parent_ref(&self, role: ParentRole) -> Option<&str> {
        match role {
            ParentRole::Father => self.father_ref(),
            ParentRole::Mother => self.mother_ref(),
        }
    }

    /// Returns true if at least one parent NIN is recorded.
    pub fn has_parent_refs(&self) -> bool {
        self.father_ref().is_some() || self.mother_ref().is_some()
    }

    /// "Given Surname" display form.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.surname)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Which parent a back-reference points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRole {
    Father,
    Mother,
}

impl ParentRole {
    /// Both roles, father first.
    pub const BOTH: [ParentRole; 2] = [ParentRole::Father, ParentRole::Mother];
}

/// Input for creating a person; the registry assigns the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
    pub nin: String,
    pub surname: String,
    pub given_name: String,
    pub sex: Sex,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub father_surname: Option<String>,
    #[serde(default)]
    pub father_nin: Option<String>,
    #[serde(default)]
    pub mother_surname: Option<String>,
    #[serde(default)]
    pub mother_nin: Option<String>,
}

impl NewPerson {
    /// Creates a minimal record; optional fields can be filled in afterwards.
    pub fn new(
        nin: impl Into<String>,
        surname: impl Into<String>,
        given_name: impl Into<String>,
        sex: Sex,
    ) -> Self {
        Self {
            nin: nin.into(),
            surname: surname.into(),
            given_name: given_name.into(),
            sex,
            birth_date: None,
            birth_place: None,
            father_surname: None,
            father_nin: None,
            mother_surname: None,
            mother_nin: None,
        }
    }

    /// Attaches a freshly generated identifier.
    pub fn into_person(self) -> Person {
        self.with_id(Uuid::new_v4().to_string())
    }

    /// Attaches the given identifier.
    pub fn with_id(self, id: impl Into<String>) -> Person {
        Person {
            id: id.into(),
            nin: self.nin,
            surname: self.surname,
            given_name: self.given_name,
            sex: self.sex,
            birth_date: self.birth_date,
            birth_place: self.birth_place,
            father_surname: self.father_surname,
            father_nin: self.father_nin,
            mother_surname: self.mother_surname,
            mother_nin: self.mother_nin,
        }
    }
}

/// Search filters; every criterion that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonSearchCriteria {
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub nin: Option<String>,
    pub father_surname: Option<String>,
    pub mother_surname: Option<String>,
}

impl PersonSearchCriteria {
    /// Returns true if no criterion is set.
    pub fn is_empty(&self) -> bool {
        [
            &self.surname,
            &self.given_name,
            &self.nin,
            &self.father_surname,
            &self.mother_surname,
        ]
        .iter()
        .all(|c| c.as_deref().map_or(true, str::is_empty))
    }

    /// Checks a person against the criteria.
    ///
    /// Names match case-insensitively by substring, the NIN by plain substring.
    pub fn matches(&self, person: &Person) -> bool {
        contains_ci(Some(&person.surname), self.surname.as_deref())
            && contains_ci(Some(&person.given_name), self.given_name.as_deref())
            && self
                .nin
                .as_deref()
                .filter(|n| !n.is_empty())
                .map_or(true, |n| person.nin.contains(n))
            && contains_ci(person.father_surname.as_ref(), self.father_surname.as_deref())
            && contains_ci(person.mother_surname.as_ref(), self.mother_surname.as_deref())
    }
}

fn contains_ci(haystack: Option<&String>, needle: Option<&str>) -> bool {
    match needle.filter(|n| !n.is_empty()) {
        None => true,
        Some(needle) => haystack
            .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

fn nin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{15}$").expect("static NIN pattern"))
}

/// Returns true if `nin` is exactly 15 ASCII digits.
pub fn validate_nin(nin: &str) -> bool {
    nin_pattern().is_match(nin)
}

/// Formats a NIN for display as `123456-789012-345`.
///
/// Values that are not 15 characters long are returned unchanged.
pub fn format_nin(nin: &str) -> String {
    if nin.len() != NIN_LENGTH || !nin.is_ascii() {
        return nin.to_string();
    }
    format!("{}-{}-{}", &nin[..6], &nin[6..12], &nin[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Person {
        let mut p = NewPerson::new("123456789012345", "Keita", "Amadou", Sex::Male);
        p.father_surname = Some("Keita".to_string());
        p.mother_surname = Some("Coulibaly".to_string());
        p.with_id("1")
    }

    #[test]
    fn test_validate_nin() {
        assert!(validate_nin("123456789012345"));
        assert!(!validate_nin("12345"));
        assert!(!validate_nin("1234567890123456"));
        assert!(!validate_nin("12345678901234a"));
        assert!(!validate_nin(""));
    }

    #[test]
    fn test_format_nin() {
        assert_eq!(format_nin("123456789012345"), "123456-789012-345");
        assert_eq!(format_nin("12345"), "12345");
    }

    #[test]
    fn test_empty_parent_ref_is_absent() {
        let mut p = sample();
        p.father_nin = Some(String::new());
        p.mother_nin = Some("  ".to_string());
        assert!(p.father_ref().is_none());
        assert!(p.mother_ref().is_none());
        assert!(!p.has_parent_refs());
    }

    #[test]
    fn test_search_criteria() {
        let p = sample();

        let by_name = PersonSearchCriteria {
            surname: Some("kei".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&p));

        let by_mother = PersonSearchCriteria {
            mother_surname: Some("COUL".to_string()),
            nin: Some("6789".to_string()),
            ..Default::default()
        };
        assert!(by_mother.matches(&p));

        let miss = PersonSearchCriteria {
            given_name: Some("Fatoumata".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&p));
        assert!(PersonSearchCriteria::default().is_empty());
    }

    #[test]
    fn test_sex_serializes_as_code() {
        let json = serde_json::to_string(&Sex::Female).unwrap();
        assert_eq!(json, "\"F\"");
    }
}
