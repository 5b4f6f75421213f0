//! Column-to-role resolution.
//!
//! Deliveries name the same field differently across schema versions
//! (`IDLaenge`, `Resultat_IDLaenge`, `AmpelCodePers_Resultat`, ...). Every
//! role is resolved by a case-insensitive substring match of its fragment.
//! When several columns match, the first in source order is used.

use std::collections::BTreeMap;

use erkas_model::{Role, RoleFragments};
use tracing::debug;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoleMatch {
    fragment: String,
    columns: Vec<String>,
}

/// Columns matched per role for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    matches: BTreeMap<Role, RoleMatch>,
    subset: Vec<String>,
}

fn matches_fragment(column: &str, fragment: &str) -> bool {
    column.to_lowercase().contains(&fragment.to_lowercase())
}

/// Resolves every role in [`Role::ALL`] against `columns`.
pub fn resolve_schema(columns: &[String], fragments: &RoleFragments) -> ResolvedSchema {
    let mut matches = BTreeMap::new();
    for role in Role::ALL {
        let fragment = fragments.fragment(role).trim();
        let matched: Vec<String> = columns
            .iter()
            .filter(|column| matches_fragment(column, fragment))
            .cloned()
            .collect();
        if matched.len() > 1 {
            debug!(
                role = %role,
                used = %matched[0],
                candidates = ?matched,
                "several columns match role, using the first"
            );
        }
        matches.insert(
            role,
            RoleMatch {
                fragment: fragment.to_string(),
                columns: matched,
            },
        );
    }

    let subset = columns
        .iter()
        .filter(|column| {
            matches
                .values()
                .any(|role_match| role_match.columns.contains(*column))
        })
        .cloned()
        .collect();

    ResolvedSchema { matches, subset }
}

impl ResolvedSchema {
    /// All columns matched for a role, in source order.
    pub fn columns(&self, role: Role) -> &[String] {
        self.matches
            .get(&role)
            .map(|role_match| role_match.columns.as_slice())
            .unwrap_or(&[])
    }

    /// The column used for a role, if any matched.
    pub fn primary(&self, role: Role) -> Option<&str> {
        self.columns(role).first().map(String::as_str)
    }

    /// The column used for a required role.
    pub fn require(&self, role: Role) -> Result<&str> {
        self.primary(role).ok_or_else(|| CoreError::MissingRole {
            role,
            fragment: self
                .matches
                .get(&role)
                .map(|role_match| role_match.fragment.clone())
                .unwrap_or_default(),
        })
    }

    /// Fails on the first required role without a match.
    pub fn require_all(&self) -> Result<()> {
        for role in Role::REQUIRED {
            self.require(role)?;
        }
        Ok(())
    }

    /// Union of all matched columns, deduplicated, in source order.
    pub fn subset_columns(&self) -> &[String] {
        &self.subset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erkas_model::ClassificationFamily;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_resolves_legacy_names() {
        let columns = names(&[
            "Objekt",
            "IDLaenge",
            "KBfrei",
            "AmpelCodePers",
            "AmpelCodeOFG",
            "AmpelCodeGW",
        ]);
        let schema = resolve_schema(&columns, &RoleFragments::default());
        assert_eq!(schema.primary(Role::Length), Some("IDLaenge"));
        assert_eq!(
            schema.primary(ClassificationFamily::Gw.role()),
            Some("AmpelCodeGW")
        );
        assert_eq!(schema.primary(Role::Interval), None);
        assert!(schema.require_all().is_ok());
        assert_eq!(schema.subset_columns().len(), 5);
    }

    #[test]
    fn test_resolves_qualified_names_case_insensitively() {
        let columns = names(&[
            "Resultat_IDLaenge",
            "resultat_kbfrei",
            "Resultat_AmpelcodePers",
            "Resultat_AmpelCodeOFG",
            "Resultat_AmpelCodeGW",
            "Berechnungsintervall",
        ]);
        let schema = resolve_schema(&columns, &RoleFragments::default());
        assert_eq!(schema.primary(Role::Exemption), Some("resultat_kbfrei"));
        assert_eq!(
            schema.primary(ClassificationFamily::Pers.role()),
            Some("Resultat_AmpelcodePers")
        );
        assert_eq!(schema.primary(Role::Interval), Some("Berechnungsintervall"));
        assert_eq!(schema.subset_columns().len(), 6);
    }

    #[test]
    fn test_multiple_matches_use_first() {
        let columns = names(&["IDLaenge", "IDLaenge_alt", "KBfrei"]);
        let schema = resolve_schema(&columns, &RoleFragments::default());
        assert_eq!(schema.columns(Role::Length), ["IDLaenge", "IDLaenge_alt"]);
        assert_eq!(schema.primary(Role::Length), Some("IDLaenge"));
        assert_eq!(schema.subset_columns(), ["IDLaenge", "IDLaenge_alt", "KBfrei"]);
    }

    #[test]
    fn test_missing_required_role() {
        let columns = names(&["IDLaenge", "KBfrei", "AmpelCodePers", "AmpelCodeOFG"]);
        let schema = resolve_schema(&columns, &RoleFragments::default());
        let err = schema.require_all().unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingRole {
                role: Role::Classification(ClassificationFamily::Gw),
                ..
            }
        ));
    }
}
