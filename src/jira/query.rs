use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// A rendered JQL filter and the concrete project keys it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    jql: String,
    projects: Vec<String>,
}

impl FilterExpression {
    pub fn jql(&self) -> &str {
        &self.jql
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn is_family(&self) -> bool {
        self.projects.len() > 1
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.jql)
    }
}

/// Lookup table from a logical project name to the concrete Jira keys released together.
#[derive(Debug, Clone)]
pub struct ProjectCatalog {
    families: BTreeMap<String, Vec<String>>,
}

impl ProjectCatalog {
    pub fn empty() -> Self {
        Self {
            families: BTreeMap::new(),
        }
    }

    pub fn with_family<I, S>(mut self, name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members
            .into_iter()
            .map(Into::into)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if !members.is_empty() {
            self.families.insert(normalize(name), members);
        }
        self
    }

    /// Parses `Name=KEY1|KEY2;Other=KEY3` as found in `PROJECT_FAMILIES`.
    pub fn parse(families: &str) -> Result<Self> {
        let mut catalog = Self::empty();
        for entry in families.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, members) = entry.split_once('=').ok_or_else(|| {
                Error::Config(format!("Invalid project family entry '{}'", entry))
            })?;
            if name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Project family entry '{}' has no name",
                    entry
                )));
            }
            catalog = catalog.with_family(name, members.split('|'));
        }
        Ok(catalog)
    }

    pub fn family(&self, name: &str) -> Option<&[String]> {
        self.families.get(&normalize(name)).map(Vec::as_slice)
    }

    pub fn select_filter(&self, project: &str, fix_version: &str) -> Result<FilterExpression> {
        let project = project.trim();
        let fix_version = fix_version.trim();
        if project.is_empty() {
            return Err(Error::InvalidRequest("project must not be empty".to_string()));
        }
        if fix_version.is_empty() {
            return Err(Error::InvalidRequest(
                "fix version must not be empty".to_string(),
            ));
        }

        let (project_clause, projects) = match self.family(project) {
            Some(members) => {
                let quoted: Vec<String> = members.iter().map(|m| quote(m)).collect();
                (
                    format!("project IN ({})", quoted.join(", ")),
                    members.to_vec(),
                )
            }
            None => (
                format!("project = {}", quote(project)),
                vec![project.to_string()],
            ),
        };

        let jql = format!(
            "{} AND fixVersion = {} ORDER BY key ASC",
            project_clause,
            quote(fix_version)
        );
        tracing::debug!("Selected filter for {}: {}", project, jql);

        Ok(FilterExpression { jql, projects })
    }
}

impl Default for ProjectCatalog {
    fn default() -> Self {
        Self::empty().with_family("Communicator", ["BAMA", "BIMA2", "CUU2", "COMAPI"])
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_project_filter() {
        let filter = ProjectCatalog::default()
            .select_filter("GoContact", "4.2.0")
            .unwrap();
        assert_eq!(
            filter.jql(),
            r#"project = "GoContact" AND fixVersion = "4.2.0" ORDER BY key ASC"#
        );
        assert_eq!(filter.projects(), ["GoContact".to_string()]);
        assert!(!filter.is_family());
    }

    #[test]
    fn test_family_filter_is_case_insensitive() {
        let filter = ProjectCatalog::default()
            .select_filter("  communicator ", "1.0")
            .unwrap();
        assert_eq!(
            filter.jql(),
            r#"project IN ("BAMA", "BIMA2", "CUU2", "COMAPI") AND fixVersion = "1.0" ORDER BY key ASC"#
        );
        assert!(filter.is_family());
    }

    #[test]
    fn test_injected_catalog() {
        let catalog = ProjectCatalog::empty().with_family("Portal", ["PORT", "PADM"]);
        let filter = catalog.select_filter("Portal", "7").unwrap();
        assert_eq!(filter.projects(), ["PORT".to_string(), "PADM".to_string()]);

        let fallback = catalog.select_filter("Communicator", "7").unwrap();
        assert!(fallback.jql().starts_with(r#"project = "Communicator""#));
    }

    #[test]
    fn test_values_are_escaped() {
        let filter = ProjectCatalog::empty()
            .select_filter("ACME", r#"1.0 "beta""#)
            .unwrap();
        assert!(filter.jql().contains(r#"fixVersion = "1.0 \"beta\"""#));
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let catalog = ProjectCatalog::default();
        assert!(matches!(
            catalog.select_filter("", "1.0"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            catalog.select_filter("BAMA", "  "),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_families() {
        let catalog = ProjectCatalog::parse("Communicator=BAMA|CUU2; Portal = PORT ").unwrap();
        assert_eq!(
            catalog.family("communicator"),
            Some(&["BAMA".to_string(), "CUU2".to_string()][..])
        );
        assert_eq!(catalog.family("portal"), Some(&["PORT".to_string()][..]));
        assert!(ProjectCatalog::parse("Broken").is_err());
        assert!(ProjectCatalog::parse("=KEY").is_err());
    }
}
