//! HTTP transport for the Billed REST API

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::attachment::AttachmentUpload;
use crate::config::Config;
use crate::errors::StoreError;
use crate::models::{AttachmentReceipt, Bill};
use crate::store::BillStore;

/// Bill store backed by the live REST API.
pub struct HttpStore {
    client: Client,
    base_url: String,
    jwt: Option<String>,
}

impl HttpStore {
    pub fn new(config: &Config, jwt: Option<String>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            jwt,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.jwt {
            Some(jwt) => request.bearer_auth(jwt),
            None => request,
        }
    }

    /// Map non-success statuses to the error text the UI renders verbatim.
    fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::api(status.as_u16()))
        }
    }
}

#[async_trait]
impl BillStore for HttpStore {
    async fn create_bill(&self, bill: &Bill) -> Result<Bill, StoreError> {
        debug!("POST /bills for {}", bill.email);
        let response = self
            .authorize(self.client.post(self.url("/bills")).json(bill))
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError> {
        debug!("GET /bills");
        let response = self.authorize(self.client.get(self.url("/bills"))).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn update_bill(&self, bill: &Bill) -> Result<Bill, StoreError> {
        debug!("PATCH /bills/{}", bill.id);
        let response = self
            .authorize(
                self.client
                    .patch(self.url(&format!("/bills/{}", bill.id)))
                    .json(bill),
            )
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn upload_attachment(
        &self,
        upload: AttachmentUpload,
    ) -> Result<AttachmentReceipt, StoreError> {
        debug!("POST /bills multipart: {}", upload.file_name);
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(StoreError::Http)?;
        let form = Form::new().text("email", upload.email).part("file", part);

        let response = self
            .authorize(self.client.post(self.url("/bills")).multipart(form))
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }
}
