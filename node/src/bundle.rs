//! Record import.
//!
//! Accounts are provisioned elsewhere on the platform. The node only needs
//! a way to load them into its local repository, which is what a bundle is:
//!
//! ```json
//! { "entities": [...], "investors": [...], "projects": [...] }
//! ```
//!
//! Records are written as-is and replace any record with the same index.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use solarfund_protocol::model::{Entity, Investor, Project};
use solarfund_protocol::storage::Repository;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportBundle {
    pub entities: Vec<Entity>,
    pub investors: Vec<Investor>,
    pub projects: Vec<Project>,
}

/// Counts of records written by [`ImportBundle::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub entities: usize,
    pub investors: usize,
    pub projects: usize,
}

impl ImportBundle {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read bundle {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse bundle {}", path.display()))
    }

    /// Persist every record in the bundle.
    pub fn apply(&self, repo: &dyn Repository) -> Result<ImportSummary> {
        for entity in &self.entities {
            repo.save_entity(entity)
                .with_context(|| format!("failed to save entity {}", entity.index()))?;
        }
        for investor in &self.investors {
            repo.save_investor(investor)
                .with_context(|| format!("failed to save investor {}", investor.index()))?;
        }
        for project in &self.projects {
            repo.save_project(project)
                .with_context(|| format!("failed to save project {}", project.index))?;
        }
        Ok(ImportSummary {
            entities: self.entities.len(),
            investors: self.investors.len(),
            projects: self.projects.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solarfund_protocol::storage::SolarDb;

    const BUNDLE: &str = r#"{
        "entities": [{
            "account": {
                "index": 1, "name": "Noon Guarantee", "legal": true, "reputation": "4.5",
                "wallet": {"public_key": "aa", "encrypted_seed": {"salt": "", "sealed": ""}}
            },
            "roles": ["entity", "guarantor"],
            "first_loss_guarantee": null,
            "first_loss_guarantee_amt": "0"
        }],
        "projects": [{"index": 9, "escrow_pubkey": "bb", "stage": 2}]
    }"#;

    #[test]
    fn bundle_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, BUNDLE).unwrap();

        let db = SolarDb::open_temporary().unwrap();
        let summary = ImportBundle::read(&path).unwrap().apply(&db).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                entities: 1,
                investors: 0,
                projects: 1
            }
        );

        let entity = db.retrieve_entity(1).unwrap().unwrap();
        assert!(entity.has_role(solarfund_protocol::model::Role::Guarantor));
        assert_eq!(db.retrieve_project(9).unwrap().unwrap().stage, 2);
    }

    #[test]
    fn malformed_bundle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, r#"{"projects": [{"index": "x"}]}"#).unwrap();
        assert!(ImportBundle::read(&path).is_err());
    }
}
