//! New-bill form controller: attachment staging and submission
//!
//! The handler owns the draft for the duration of one form session. The
//! attachment is staged with the store on file selection; submission happens
//! only on explicit user confirmation and calls the store's create
//! capability exactly once. Store rejections propagate to the caller, never
//! retried.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::attachment::{self, AttachmentUpload};
use crate::errors::NewBillError;
use crate::models::{Bill, BillDraft, SessionIdentity};
use crate::store::BillStore;

pub struct NewBillHandler {
    store: Arc<dyn BillStore>,
    identity: SessionIdentity,
    pub draft: BillDraft,
}

impl NewBillHandler {
    pub fn new(store: Arc<dyn BillStore>, identity: SessionIdentity) -> Self {
        Self {
            store,
            identity,
            draft: BillDraft::default(),
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// React to a file selection. Unsupported types clear the staged
    /// attachment and fail without a store call; accepted types are
    /// uploaded immediately and the returned `fileUrl`/`key` land on the
    /// draft ahead of submission.
    pub async fn handle_file_selected(&mut self, path: &Path) -> Result<(), NewBillError> {
        let (file_name, content_type) = match attachment::validate(path) {
            Ok(parts) => parts,
            Err(err) => {
                self.draft.clear_attachment();
                return Err(err.into());
            }
        };

        let bytes = tokio::fs::read(path).await?;
        let receipt = self
            .store
            .upload_attachment(AttachmentUpload {
                file_name: file_name.clone(),
                content_type: content_type.to_string(),
                bytes,
                email: self.identity.email.clone(),
            })
            .await?;

        info!("Attachment {} staged at {}", file_name, receipt.file_url);
        self.draft.file_url = Some(receipt.file_url);
        self.draft.file_name = Some(file_name);
        self.draft.file_key = Some(receipt.key);
        Ok(())
    }

    /// Submit the draft. Validation failures block before any network call;
    /// on success the created bill is returned and the draft is discarded so
    /// the next form session starts clean.
    pub async fn submit(&mut self) -> Result<Bill, NewBillError> {
        let bill = self.draft.clone().into_bill(&self.identity.email)?;
        let created = self.store.create_bill(&bill).await?;
        info!("Bill {} submitted for {}", created.id, created.email);
        self.draft = BillDraft::default();
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_date, BillStatus, ExpenseType, UserType};
    use crate::store::MemoryStore;
    use std::io::Write;

    fn employee() -> SessionIdentity {
        SessionIdentity {
            user_type: UserType::Employee,
            email: "jane@doe".to_string(),
        }
    }

    fn handler_with_store() -> (Arc<MemoryStore>, NewBillHandler) {
        let store = Arc::new(MemoryStore::new());
        let handler = NewBillHandler::new(store.clone(), employee());
        (store, handler)
    }

    fn fill_required(draft: &mut BillDraft) {
        draft.expense_type = Some(ExpenseType::Transports);
        draft.name = Some("Vol Marseille".to_string());
        draft.date = parse_date("03/01/2022").ok();
        draft.amount = Some(300.0);
        draft.vat = Some(70.0);
        draft.pct = Some(20);
    }

    fn temp_file(name: &str, contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn submit_with_missing_required_field_never_reaches_the_store() {
        let required: &[fn(&mut BillDraft)] = &[
            |d| d.expense_type = None,
            |d| d.name = None,
            |d| d.date = None,
            |d| d.amount = None,
            |d| d.pct = None,
        ];

        for clear in required {
            let (store, mut handler) = handler_with_store();
            fill_required(&mut handler.draft);
            clear(&mut handler.draft);

            let err = handler.submit().await.unwrap_err();
            assert!(err.is_validation());
            assert_eq!(store.create_calls(), 0);
        }
    }

    #[tokio::test]
    async fn accepted_file_uploads_once_and_stages_file_url() {
        let (store, mut handler) = handler_with_store();
        let (_dir, path) = temp_file("image.png", b"png bytes");

        handler.handle_file_selected(&path).await.unwrap();

        assert_eq!(store.upload_calls(), 1);
        assert_eq!(
            handler.draft.file_url.as_deref(),
            Some("https://storage.local/image.png")
        );
        assert_eq!(handler.draft.file_name.as_deref(), Some("image.png"));
        assert!(handler.draft.file_key.is_some());
    }

    #[tokio::test]
    async fn reselecting_a_file_repeats_the_upload() {
        let (store, mut handler) = handler_with_store();
        let (_dir, path) = temp_file("image.png", b"png bytes");

        handler.handle_file_selected(&path).await.unwrap();
        handler.handle_file_selected(&path).await.unwrap();

        assert_eq!(store.upload_calls(), 2);
    }

    #[tokio::test]
    async fn rejected_file_skips_the_store_and_clears_the_attachment() {
        let (store, mut handler) = handler_with_store();
        let (_dir, good) = temp_file("image.png", b"png bytes");
        handler.handle_file_selected(&good).await.unwrap();

        let (_dir2, bad) = temp_file("facture.pdf", b"%PDF-1.4");
        let err = handler.handle_file_selected(&bad).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.upload_calls(), 1);
        assert!(handler.draft.file_url.is_none());
        assert!(handler.draft.file_name.is_none());
    }

    #[tokio::test]
    async fn full_scenario_submits_once_with_session_email() {
        let (store, mut handler) = handler_with_store();
        let (_dir, path) = temp_file("image.png", b"png bytes");

        handler.handle_file_selected(&path).await.unwrap();
        fill_required(&mut handler.draft);

        let created = handler.submit().await.unwrap();

        assert_eq!(store.create_calls(), 1);
        assert_eq!(created.email, "jane@doe");
        assert_eq!(created.expense_type, ExpenseType::Transports);
        assert_eq!(created.name, "Vol Marseille");
        assert_eq!(created.amount, 300.0);
        assert_eq!(created.vat, Some(70.0));
        assert_eq!(created.pct, 20);
        assert_eq!(created.status, BillStatus::Pending);
        assert_eq!(
            created.file_url.as_deref(),
            Some("https://storage.local/image.png")
        );

        // The draft is discarded after a successful submission.
        assert_eq!(handler.draft, BillDraft::default());
    }

    #[tokio::test]
    async fn store_rejection_propagates_without_retry() {
        let (store, mut handler) = handler_with_store();
        fill_required(&mut handler.draft);
        store.fail_creates_with(500);

        let err = handler.submit().await.unwrap_err();

        assert_eq!(err.to_string(), "Erreur 500");
        assert_eq!(store.create_calls(), 1);
    }
}
