//! REST implementation of [`RemoteStore`].

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::store::RemoteStore;
use crate::wire::{CheckoutRequest, LibraryBookEntry};
use async_trait::async_trait;
use libraryapp_types::{Book, Isbn, Library, LibraryDraft, LibraryId, LoanRecord, Record};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP client for the library-management service.
pub struct HttpRemote {
    config: RemoteConfig,
    client: Client,
    base_url: String,
}

impl HttpRemote {
    /// Creates a client for the configured service.
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to create HTTP client: {e}")))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn libraries_url(&self) -> String {
        format!("{}/v1/library", self.base_url)
    }

    fn library_url(&self, id: &LibraryId) -> String {
        format!("{}/v1/library/{}", self.base_url, urlencoding::encode(id.as_str()))
    }

    async fn send(&self, request: RequestBuilder, op: &str) -> RemoteResult<Response> {
        request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("{op} failed: {e}")))
    }

    /// Fetches a JSON array and validates each record.
    async fn fetch_list<W, T>(&self, url: String, op: &str) -> RemoteResult<Vec<T>>
    where
        W: DeserializeOwned + Into<T>,
        T: Record,
    {
        debug!("{}: GET {}", op, url);
        let response = self.send(self.client.get(&url), op).await?;
        let status = response.status();
        let body = read_body(response, op).await?;

        if !status.is_success() {
            return Err(RemoteError::Transport(format!(
                "{op} failed: HTTP {status}: {}",
                body.trim()
            )));
        }

        let wire: Vec<W> = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Decode(format!("{op}: {e}")))?;
        let records: Vec<T> = wire.into_iter().map(Into::into).collect();
        for record in &records {
            record
                .validate()
                .map_err(|e| RemoteError::Decode(format!("{op}: {e}")))?;
        }

        debug!("{}: decoded {} records", op, records.len());
        Ok(records)
    }
}

async fn read_body(response: Response, op: &str) -> RemoteResult<String> {
    response
        .text()
        .await
        .map_err(|e| RemoteError::Transport(format!("{op}: failed to read body: {e}")))
}

/// Picks the human-readable message out of an error body: a JSON `message`
/// or `error` field when present, otherwise the raw text.
fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(msg) = value.get(field).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let text = body.trim();
    if text.is_empty() {
        status.to_string()
    } else {
        text.to_string()
    }
}

fn unexpected(op: &str, status: StatusCode, body: &str) -> RemoteError {
    RemoteError::Transport(format!("{op} failed: HTTP {status}: {}", body.trim()))
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_libraries(&self) -> RemoteResult<Vec<Library>> {
        self.fetch_list::<Library, Library>(self.libraries_url(), "list libraries")
            .await
    }

    async fn create_library(&self, draft: &LibraryDraft) -> RemoteResult<Library> {
        let op = "create library";
        debug!("{}: {}", op, draft.name);

        let response = self
            .send(self.client.post(self.libraries_url()).json(draft), op)
            .await?;
        let status = response.status();
        let body = read_body(response, op).await?;

        if status.is_client_error() {
            return Err(RemoteError::Validation(server_message(status, &body)));
        }
        if !status.is_success() {
            return Err(unexpected(op, status, &body));
        }

        let library: Library =
            serde_json::from_str(&body).map_err(|e| RemoteError::Decode(format!("{op}: {e}")))?;
        library
            .validate()
            .map_err(|e| RemoteError::Decode(format!("{op}: {e}")))?;

        info!("Created library {} ({})", library.id, library.name);
        Ok(library)
    }

    async fn update_library(&self, library: &Library) -> RemoteResult<()> {
        let op = "update library";
        debug!("{}: {}", op, library.id);

        let response = self
            .send(self.client.put(self.library_url(&library.id)).json(library), op)
            .await?;
        let status = response.status();

        if status.is_success() {
            info!("Updated library {}", library.id);
            return Ok(());
        }

        let body = read_body(response, op).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(format!("library {}", library.id)));
        }
        if status.is_client_error() {
            return Err(RemoteError::Validation(server_message(status, &body)));
        }
        Err(unexpected(op, status, &body))
    }

    async fn delete_library(&self, id: &LibraryId) -> RemoteResult<()> {
        let op = "delete library";
        debug!("{}: {}", op, id);

        let response = self.send(self.client.delete(self.library_url(id)), op).await?;
        let status = response.status();

        if status.is_success() {
            info!("Deleted library {}", id);
            return Ok(());
        }

        let body = read_body(response, op).await?;
        match status {
            // The service answers 500 when the library still holds books.
            StatusCode::INTERNAL_SERVER_ERROR => {
                warn!("Delete of library {} blocked: {}", id, body.trim());
                let detail = body.trim();
                Err(RemoteError::Conflict(if detail.is_empty() {
                    format!("library {id} still holds books")
                } else {
                    format!("library {id} still holds books: {detail}")
                }))
            }
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(format!("library {id}"))),
            _ => Err(unexpected(op, status, &body)),
        }
    }

    async fn list_books(&self, library_id: &LibraryId) -> RemoteResult<Vec<Book>> {
        let url = format!("{}/book", self.library_url(library_id));
        self.fetch_list::<LibraryBookEntry, Book>(url, "list books").await
    }

    async fn checkout(
        &self,
        library_id: &LibraryId,
        isbn: &Isbn,
        borrower: &str,
    ) -> RemoteResult<()> {
        let op = "checkout";
        let url = format!(
            "{}/book/{}/checkout",
            self.library_url(library_id),
            urlencoding::encode(isbn.as_str())
        );
        debug!("{}: {} from library {} for {}", op, isbn, library_id, borrower);

        let body = CheckoutRequest {
            username: borrower.to_string(),
        };
        let response = self.send(self.client.post(url).json(&body), op).await?;
        let status = response.status();

        if status.is_success() {
            info!("Checked out {} from library {}", isbn, library_id);
            return Ok(());
        }

        let text = read_body(response, op).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(format!(
                "book {isbn} in library {library_id}"
            )));
        }
        if status.is_client_error() {
            return Err(RemoteError::Unavailable(server_message(status, &text)));
        }
        Err(unexpected(op, status, &text))
    }

    async fn loans_for_user(&self, username: &str) -> RemoteResult<Vec<LoanRecord>> {
        let url = format!(
            "{}/v1/books/user/{}",
            self.base_url,
            urlencoding::encode(username)
        );
        self.fetch_list::<LoanRecord, LoanRecord>(url, "loans for user")
            .await
    }
}
