//! In-memory bill store
//!
//! Stands in for the live API in tests. Counts every call so tests can
//! assert how often each capability was exercised, and can be armed to fail
//! with a given status to drive the error-rendering path.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::attachment::AttachmentUpload;
use crate::errors::StoreError;
use crate::models::{AttachmentReceipt, Bill};
use crate::store::BillStore;

#[derive(Default)]
pub struct MemoryStore {
    bills: Mutex<Vec<Bill>>,
    create_calls: AtomicUsize,
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    fail_list_status: Mutex<Option<u16>>,
    fail_create_status: Mutex<Option<u16>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: Mutex::new(bills),
            ..Self::default()
        }
    }

    /// Make every subsequent `list_bills` fail with the given status.
    pub fn fail_lists_with(&self, status: u16) {
        *self.fail_list_status.lock().unwrap() = Some(status);
    }

    /// Make every subsequent `create_bill` fail with the given status.
    pub fn fail_creates_with(&self, status: u16) {
        *self.fail_create_status.lock().unwrap() = Some(status);
    }

    /// Stop failing `list_bills`.
    pub fn restore_lists(&self) {
        *self.fail_list_status.lock().unwrap() = None;
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored bills.
    pub fn bills(&self) -> Vec<Bill> {
        self.bills.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillStore for MemoryStore {
    async fn create_bill(&self, bill: &Bill) -> Result<Bill, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.fail_create_status.lock().unwrap() {
            return Err(StoreError::api(status));
        }

        let mut stored = bill.clone();
        if stored.id.is_empty() {
            stored.id = Uuid::new_v4().to_string();
        }
        self.bills.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.fail_list_status.lock().unwrap() {
            return Err(StoreError::api(status));
        }
        Ok(self.bills.lock().unwrap().clone())
    }

    async fn update_bill(&self, bill: &Bill) -> Result<Bill, StoreError> {
        let mut bills = self.bills.lock().unwrap();
        match bills.iter_mut().find(|b| b.id == bill.id) {
            Some(slot) => {
                *slot = bill.clone();
                Ok(bill.clone())
            }
            None => Err(StoreError::api(404)),
        }
    }

    async fn upload_attachment(
        &self,
        upload: AttachmentUpload,
    ) -> Result<AttachmentReceipt, StoreError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AttachmentReceipt {
            file_url: format!("https://storage.local/{}", upload.file_name),
            key: Uuid::new_v4().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillDraft, ExpenseType};

    fn sample_bill() -> Bill {
        BillDraft {
            expense_type: Some(ExpenseType::Transports),
            name: Some("Vol Marseille".to_string()),
            date: crate::models::parse_date("2022-01-03").ok(),
            amount: Some(300.0),
            pct: Some(20),
            ..Default::default()
        }
        .into_bill("jane@doe")
        .unwrap()
    }

    #[tokio::test]
    async fn create_assigns_an_id_and_counts_the_call() {
        let store = MemoryStore::new();
        let created = store.create_bill(&sample_bill()).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.bills().len(), 1);
    }

    #[tokio::test]
    async fn armed_list_failure_carries_the_backend_message() {
        let store = MemoryStore::new();
        store.fail_lists_with(404);
        let err = store.list_bills().await.unwrap_err();
        assert_eq!(err.to_string(), "Erreur 404");
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_bill_is_a_404() {
        let store = MemoryStore::new();
        let mut bill = sample_bill();
        bill.id = "missing".to_string();
        let err = store.update_bill(&bill).await.unwrap_err();
        assert_eq!(err.to_string(), "Erreur 404");
    }
}
