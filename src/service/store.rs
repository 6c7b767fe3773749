//! JSON artifact store for claim inputs and per-run outputs
//!
//! Workspace layout:
//! ```text
//! <root>/critical_fields.json
//! <root>/claims/<claim>/extraction.json
//! <root>/claims/<claim>/coverage.json
//! <root>/claims/<claim>/line_items.json          (optional)
//! <root>/claims/<claim>/runs/<run>/reconciliation.json
//! <root>/claims/<claim>/runs/<run>/screening.json
//! <root>/claims/<claim>/runs/<run>/decision.json
//! <root>/runs/<run>/summary.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{
    CoverageAnalysis, CriticalFieldSpec, DecisionRecord, DocumentExtraction, LineItem,
    ReconciliationReport, RunSummary, ScreeningResult,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed persisted state at {path}: {cause}")]
    Malformed { path: String, cause: String },
}

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Claim ids present in the workspace, sorted
    pub fn claim_ids(&self) -> Result<Vec<String>, StoreError> {
        let claims_dir = self.root.join("claims");
        if !claims_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&claims_dir).map_err(|e| io_error(&claims_dir, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&claims_dir, e))?;
            if entry.path().is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn load_extractions(
        &self,
        claim_id: &str,
    ) -> Result<Option<Vec<DocumentExtraction>>, StoreError> {
        self.read_optional(&self.claim_dir(claim_id).join("extraction.json"))
    }

    pub fn load_coverage(&self, claim_id: &str) -> Result<Option<CoverageAnalysis>, StoreError> {
        self.read_optional(&self.claim_dir(claim_id).join("coverage.json"))
    }

    pub fn load_line_items(&self, claim_id: &str) -> Result<Option<Vec<LineItem>>, StoreError> {
        self.read_optional(&self.claim_dir(claim_id).join("line_items.json"))
    }

    /// Critical field spec is workspace-global; absent means no critical facts
    pub fn load_critical_fields(&self) -> Result<CriticalFieldSpec, StoreError> {
        Ok(self
            .read_optional(&self.root.join("critical_fields.json"))?
            .unwrap_or_default())
    }

    pub fn load_reconciliation(
        &self,
        claim_id: &str,
        run_id: &str,
    ) -> Result<Option<ReconciliationReport>, StoreError> {
        self.read_optional(&self.run_dir(claim_id, run_id).join("reconciliation.json"))
    }

    pub fn save_reconciliation(&self, report: &ReconciliationReport) -> Result<(), StoreError> {
        self.write_json(
            &self
                .run_dir(&report.claim_id, &report.run_id)
                .join("reconciliation.json"),
            report,
        )
    }

    pub fn save_screening(
        &self,
        claim_id: &str,
        run_id: &str,
        result: &ScreeningResult,
    ) -> Result<(), StoreError> {
        self.write_json(&self.run_dir(claim_id, run_id).join("screening.json"), result)
    }

    pub fn save_decision(
        &self,
        claim_id: &str,
        run_id: &str,
        decision: &DecisionRecord,
    ) -> Result<(), StoreError> {
        self.write_json(&self.run_dir(claim_id, run_id).join("decision.json"), decision)
    }

    pub fn save_summary(&self, run_id: &str, summary: &RunSummary) -> Result<(), StoreError> {
        self.write_json(
            &self.root.join("runs").join(run_id).join("summary.json"),
            summary,
        )
    }

    fn claim_dir(&self, claim_id: &str) -> PathBuf {
        self.root.join("claims").join(claim_id)
    }

    fn run_dir(&self, claim_id: &str, run_id: &str) -> PathBuf {
        self.claim_dir(claim_id).join("runs").join(run_id)
    }

    fn read_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                path: path.display().to_string(),
                cause: e.to_string(),
            })
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Malformed {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| io_error(path, e))
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FactSet, GateStatus, QualityGateResult};
    use chrono::Utc;

    fn temp_store() -> (ArtifactStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("claim-intel-test-{}", uuid::Uuid::new_v4()));
        (ArtifactStore::new(&dir), dir)
    }

    fn report(claim_id: &str, run_id: &str) -> ReconciliationReport {
        ReconciliationReport {
            claim_id: claim_id.to_string(),
            run_id: run_id.to_string(),
            facts: FactSet::default(),
            conflicts: vec![],
            gate: QualityGateResult {
                status: GateStatus::Pass,
                missing_critical_facts: vec![],
                conflict_count: 0,
                provenance_coverage: 1.0,
                estimated_tokens: 10,
                reasons: vec![],
            },
            document_runs: Default::default(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_roundtrip_reconciliation_report() {
        let (store, dir) = temp_store();

        assert!(store.load_reconciliation("c1", "r1").unwrap().is_none());
        store.save_reconciliation(&report("c1", "r1")).unwrap();

        let loaded = store.load_reconciliation("c1", "r1").unwrap().unwrap();
        assert_eq!(loaded.claim_id, "c1");
        assert_eq!(loaded.run_id, "r1");
        assert_eq!(loaded.gate.status, GateStatus::Pass);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_optional_inputs_are_none() {
        let (store, dir) = temp_store();

        assert!(store.load_extractions("c1").unwrap().is_none());
        assert!(store.load_coverage("c1").unwrap().is_none());
        assert!(store.load_line_items("c1").unwrap().is_none());
        assert!(store.load_critical_fields().unwrap().0.is_empty());
        assert!(store.claim_ids().unwrap().is_empty());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_malformed_state_is_a_typed_error() {
        let (store, dir) = temp_store();
        let path = dir.join("claims").join("c1");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("extraction.json"), "{not json").unwrap();

        let err = store.load_extractions("c1").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_claim_ids_sorted() {
        let (store, dir) = temp_store();
        fs::create_dir_all(dir.join("claims").join("b-claim")).unwrap();
        fs::create_dir_all(dir.join("claims").join("a-claim")).unwrap();

        assert_eq!(store.claim_ids().unwrap(), vec!["a-claim", "b-claim"]);

        let _ = fs::remove_dir_all(dir);
    }
}
