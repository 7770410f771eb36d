//! Bill persistence behind a swappable transport
//!
//! The web client reached this backend through a process-global capability
//! object; here the same contract is a trait with one implementation per
//! transport: live HTTP and an in-memory fake for tests.

use async_trait::async_trait;

use crate::attachment::AttachmentUpload;
use crate::errors::StoreError;
use crate::models::{AttachmentReceipt, Bill};

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// Capability-oriented access to the bill collection.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Persist a new bill and return the stored record (id assigned).
    async fn create_bill(&self, bill: &Bill) -> Result<Bill, StoreError>;

    /// Fetch the full bill collection.
    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError>;

    /// Update an existing bill (status changes, admin commentary).
    async fn update_bill(&self, bill: &Bill) -> Result<Bill, StoreError>;

    /// Stage an attachment ahead of submission. Called once per
    /// file-selection event; re-selecting a file repeats the upload.
    async fn upload_attachment(
        &self,
        upload: AttachmentUpload,
    ) -> Result<AttachmentReceipt, StoreError>;
}
