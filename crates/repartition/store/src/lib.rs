//! # repartition-store
//!
//! The persistence collaborator for distribution results.
//!
//! [`RepartitionStore`] is the contract the engine's callers hand results
//! to: a save persists the result header and every line item as one
//! atomic unit, and the latest result for a payment is retrievable at any
//! time. Results are superseded, never mutated; history is retained.
//!
//! [`InMemoryRepartitionStore`] implements the contract as an append-only,
//! blake3 hash-chained journal. No in-place mutation API is exposed;
//! every recomputation becomes an additional entry, which preserves full
//! historical accountability and makes tampering detectable.

#![deny(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use repartition_types::{PaymentId, RepartitionResult};

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(
        "concurrent write for payment {payment_id}: expected latest index {expected:?}, found {actual:?}"
    )]
    Conflict {
        payment_id: PaymentId,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    #[error("journal integrity violation: {0}")]
    ChainIntegrity(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The persistence envelope around one distribution result.
///
/// Store-assigned metadata lives here, not in the result itself: the
/// result stays a pure value while the envelope owns identity, sequence
/// and the hash chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRepartition {
    pub entry_id: Uuid,
    /// Global journal sequence, contiguous from 0.
    pub index: u64,
    pub stored_at: DateTime<Utc>,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
    pub result: RepartitionResult,
}

/// Persistence contract for distribution results.
///
/// The engine does not retry or recompute on store failure; the caller
/// owns retry policy.
pub trait RepartitionStore {
    /// Persist a result and its line items as one atomic unit.
    fn save(&mut self, result: RepartitionResult) -> Result<StoredRepartition, StoreError>;

    /// Version-checked save: fails with [`StoreError::Conflict`] if the
    /// payment's latest journal index no longer matches `expected_latest`,
    /// so two concurrent recomputations cannot both land as "the" current
    /// distribution.
    fn save_versioned(
        &mut self,
        result: RepartitionResult,
        expected_latest: Option<u64>,
    ) -> Result<StoredRepartition, StoreError>;

    /// The most recent stored result for a payment, if any.
    fn find_latest_by_payment(&self, payment_id: &PaymentId) -> Option<StoredRepartition>;

    /// Every stored result for a payment, oldest first.
    fn history_for_payment(&self, payment_id: &PaymentId) -> Vec<StoredRepartition>;
}

/// Append-only journal with hash-chain proofs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepartitionStore {
    entries: Vec<StoredRepartition>,
}

impl InMemoryRepartitionStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rebuild a journal from persisted entries and verify its integrity.
    pub fn from_entries(entries: Vec<StoredRepartition>) -> Result<Self, StoreError> {
        let store = Self { entries };

        for (expected_index, entry) in store.entries.iter().enumerate() {
            if entry.index != expected_index as u64 {
                return Err(StoreError::ChainIntegrity(format!(
                    "journal index gap at position {} (found {})",
                    expected_index, entry.index
                )));
            }
        }

        if !store.verify_chain() {
            return Err(StoreError::ChainIntegrity(
                "persisted journal hash-chain verification failed".to_string(),
            ));
        }

        Ok(store)
    }

    pub fn entries(&self) -> &[StoredRepartition] {
        &self.entries
    }

    /// Recompute every entry hash and linkage; true iff untampered.
    pub fn verify_chain(&self) -> bool {
        let mut previous_hash: Option<String> = None;
        for entry in &self.entries {
            let expected_hash = match compute_entry_hash(
                entry.index,
                entry.stored_at,
                &entry.result,
                previous_hash.as_deref(),
            ) {
                Ok(hash) => hash,
                Err(_) => return false,
            };
            if entry.entry_hash != expected_hash {
                return false;
            }
            if entry.previous_hash != previous_hash {
                return false;
            }
            previous_hash = Some(entry.entry_hash.clone());
        }
        true
    }

    /// Build the next entry without mutating the journal.
    pub fn build_entry(&self, result: RepartitionResult) -> Result<StoredRepartition, StoreError> {
        let index = self.entries.len() as u64;
        let stored_at = Utc::now();
        let previous_hash = self.entries.last().map(|entry| entry.entry_hash.clone());
        let entry_hash =
            compute_entry_hash(index, stored_at, &result, previous_hash.as_deref())?;

        Ok(StoredRepartition {
            entry_id: Uuid::new_v4(),
            index,
            stored_at,
            previous_hash,
            entry_hash,
            result,
        })
    }

    /// Commit a pre-built entry after re-checking it against the chain.
    pub fn commit_entry(&mut self, entry: StoredRepartition) -> Result<(), StoreError> {
        let expected_index = self.entries.len() as u64;
        if entry.index != expected_index {
            return Err(StoreError::ChainIntegrity(format!(
                "commit index mismatch: expected {}, got {}",
                expected_index, entry.index
            )));
        }

        let expected_previous_hash = self.entries.last().map(|e| e.entry_hash.clone());
        if entry.previous_hash != expected_previous_hash {
            return Err(StoreError::ChainIntegrity(
                "commit previous hash mismatch".to_string(),
            ));
        }

        let expected_hash = compute_entry_hash(
            entry.index,
            entry.stored_at,
            &entry.result,
            entry.previous_hash.as_deref(),
        )?;
        if entry.entry_hash != expected_hash {
            return Err(StoreError::ChainIntegrity(
                "commit hash mismatch for journal entry".to_string(),
            ));
        }

        self.entries.push(entry);
        Ok(())
    }

    fn latest_index_for(&self, payment_id: &PaymentId) -> Option<u64> {
        self.entries
            .iter()
            .rev()
            .find(|entry| &entry.result.payment_id == payment_id)
            .map(|entry| entry.index)
    }
}

impl RepartitionStore for InMemoryRepartitionStore {
    fn save(&mut self, result: RepartitionResult) -> Result<StoredRepartition, StoreError> {
        let entry = self.build_entry(result)?;
        self.commit_entry(entry.clone())?;
        debug!(
            payment = %entry.result.payment_id,
            index = entry.index,
            equilibre = entry.result.equilibre,
            "Stored repartition"
        );
        Ok(entry)
    }

    fn save_versioned(
        &mut self,
        result: RepartitionResult,
        expected_latest: Option<u64>,
    ) -> Result<StoredRepartition, StoreError> {
        let actual = self.latest_index_for(&result.payment_id);
        if actual != expected_latest {
            return Err(StoreError::Conflict {
                payment_id: result.payment_id.clone(),
                expected: expected_latest,
                actual,
            });
        }
        self.save(result)
    }

    fn find_latest_by_payment(&self, payment_id: &PaymentId) -> Option<StoredRepartition> {
        self.entries
            .iter()
            .rev()
            .find(|entry| &entry.result.payment_id == payment_id)
            .cloned()
    }

    fn history_for_payment(&self, payment_id: &PaymentId) -> Vec<StoredRepartition> {
        self.entries
            .iter()
            .filter(|entry| &entry.result.payment_id == payment_id)
            .cloned()
            .collect()
    }
}

fn compute_entry_hash(
    index: u64,
    stored_at: DateTime<Utc>,
    result: &RepartitionResult,
    previous_hash: Option<&str>,
) -> Result<String, StoreError> {
    let material = serde_json::json!({
        "index": index,
        "stored_at": stored_at,
        "result": result,
        "previous_hash": previous_hash,
    });

    let bytes =
        serde_json::to_vec(&material).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
