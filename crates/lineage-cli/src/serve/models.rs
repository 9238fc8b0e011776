//! API request/response types for the tree server.
//!
//! Core types (persons, trees, graphs, positioned graphs) already serialize
//! to the wire shape and are returned as-is; only query parameters, person
//! listings and errors get dedicated types here.

use serde::{Deserialize, Serialize};

use lineage_core::person::format_nin;
use lineage_core::Person;

// =============================================================================
// Person Models
// =============================================================================

/// A person record with display helpers for `/api/persons*`.
#[derive(Debug, Serialize)]
pub struct PersonView {
    #[serde(flatten)]
    pub person: Person,
    /// NIN grouped as `123456-789012-345`.
    pub nin_display: String,
    /// "Given Surname".
    pub full_name: String,
}

impl From<Person> for PersonView {
    fn from(person: Person) -> Self {
        Self {
            nin_display: format_nin(&person.nin),
            full_name: person.full_name(),
            person,
        }
    }
}

// =============================================================================
// Layout Models (for `/api/trees/{id}/layout`)
// =============================================================================

/// Query parameters for the layout endpoint; unset values use the config.
#[derive(Debug, Default, Deserialize)]
pub struct LayoutQuery {
    /// `generational` or `hierarchical`.
    pub mode: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

// =============================================================================
// Error Model
// =============================================================================

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
