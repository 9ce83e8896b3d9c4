//! Supplier collaborator.
//!
//! Suppliers are the dropshipping sources behind the catalog. An inventory
//! sync is simulated: it completes as soon as it is started and reports
//! every sourced product as updated.

use super::error::{CommerceError, CommerceResult};
use super::models::{Supplier, SupplierStatus, SyncJob, SyncStatus};
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

pub trait SupplierDirectory: Send + Sync {
    fn list(&self) -> Vec<Supplier>;

    fn find(&self, id: &str) -> Option<Supplier>;

    /// Starts an inventory sync for an active supplier.
    fn start_sync(&self, supplier_id: &str) -> CommerceResult<SyncJob>;

    fn sync_status(&self, sync_id: &str) -> Option<SyncJob>;
}

pub struct InMemorySuppliers {
    suppliers: Vec<Supplier>,
    jobs: DashMap<String, SyncJob>,
}

impl InMemorySuppliers {
    pub fn new(suppliers: Vec<Supplier>) -> Self {
        Self {
            suppliers,
            jobs: DashMap::new(),
        }
    }

    /// Directory over [`seed_suppliers`].
    pub fn seeded() -> Self {
        Self::new(seed_suppliers())
    }
}

impl Default for InMemorySuppliers {
    fn default() -> Self {
        Self::seeded()
    }
}

/// The demo suppliers.
pub fn seed_suppliers() -> Vec<Supplier> {
    vec![
        Supplier {
            id: "spocket".to_string(),
            name: "Spocket".to_string(),
            status: SupplierStatus::Active,
            products: 100,
        },
        Supplier {
            id: "aliexpress".to_string(),
            name: "AliExpress".to_string(),
            status: SupplierStatus::Active,
            products: 500,
        },
    ]
}

fn new_sync_id() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(12);
    format!("SYNC-{}", token.to_uppercase())
}

impl SupplierDirectory for InMemorySuppliers {
    fn list(&self) -> Vec<Supplier> {
        self.suppliers.clone()
    }

    fn find(&self, id: &str) -> Option<Supplier> {
        self.suppliers.iter().find(|s| s.id == id).cloned()
    }

    fn start_sync(&self, supplier_id: &str) -> CommerceResult<SyncJob> {
        let supplier = self
            .find(supplier_id)
            .ok_or_else(|| CommerceError::SupplierNotFound(supplier_id.to_string()))?;
        if supplier.status != SupplierStatus::Active {
            return Err(CommerceError::SupplierInactive(supplier.id));
        }

        let now = Utc::now();
        let job = SyncJob {
            sync_id: new_sync_id(),
            supplier_id: supplier.id,
            status: SyncStatus::Completed,
            progress: 100,
            updated: supplier.products,
            failed: 0,
            started_at: now,
            completed_at: Some(now),
        };

        tracing::info!(sync = %job.sync_id, supplier = %job.supplier_id, "Supplier sync started");
        self.jobs.insert(job.sync_id.clone(), job.clone());
        Ok(job)
    }

    fn sync_status(&self, sync_id: &str) -> Option<SyncJob> {
        self.jobs.get(sync_id).map(|j| j.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_and_finds_suppliers() {
        let suppliers = InMemorySuppliers::seeded();
        assert_eq!(suppliers.list().len(), 2);
        assert_eq!(suppliers.find("spocket").unwrap().name, "Spocket");
        assert!(suppliers.find("acme").is_none());
    }

    #[test]
    fn sync_is_recorded_and_queryable() {
        let suppliers = InMemorySuppliers::seeded();
        let job = suppliers.start_sync("aliexpress").unwrap();

        assert!(job.sync_id.starts_with("SYNC-"));
        assert_eq!(job.status, SyncStatus::Completed);
        assert_eq!(job.updated, 500);
        assert_eq!(suppliers.sync_status(&job.sync_id), Some(job));
        assert!(suppliers.sync_status("SYNC-UNKNOWN").is_none());
    }

    #[test]
    fn sync_rejects_unknown_and_paused_suppliers() {
        assert_eq!(
            InMemorySuppliers::seeded().start_sync("acme"),
            Err(CommerceError::SupplierNotFound("acme".into()))
        );

        let paused = InMemorySuppliers::new(vec![Supplier {
            id: "dormant".into(),
            name: "Dormant".into(),
            status: SupplierStatus::Paused,
            products: 3,
        }]);
        assert_eq!(
            paused.start_sync("dormant"),
            Err(CommerceError::SupplierInactive("dormant".into()))
        );
    }
}
