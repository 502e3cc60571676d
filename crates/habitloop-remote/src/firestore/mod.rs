//! Firestore REST client implementing `DocumentStore`.

pub mod value;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::RemoteResult;
use crate::http::{build_client, ResponseExt};
use crate::session::SessionHandle;
use crate::traits::DocumentStore;

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: &str = "300";

/// Firestore document as returned by the REST API
#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

/// Document store backed by a Firestore project's default database
pub struct FirestoreClient {
    client: Client,
    /// `.../projects/<id>/databases/(default)/documents`
    documents_url: String,
    session: SessionHandle,
}

impl FirestoreClient {
    /// Create a client for a project, authenticating with the shared session
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(project_id: &str, session: SessionHandle) -> Result<Self> {
        Self::with_base_url(
            &format!("{FIRESTORE_API}/projects/{project_id}/databases/(default)/documents"),
            session,
        )
    }

    /// Create a client against an explicit documents root (emulators, tests)
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_base_url(documents_url: &str, session: SessionHandle) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            documents_url: documents_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.documents_url, path.trim_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.current() {
            Some(session) => request.bearer_auth(session.id_token),
            None => request,
        }
    }

    /// Last path segment of a full document name
    fn document_id(name: &str) -> String {
        name.rsplit('/').next().unwrap_or(name).to_string()
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_document(&self, path: &str) -> RemoteResult<Option<Value>> {
        let response = self
            .authorized(self.client.get(self.url(path)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: FirestoreDocument = response
            .ensure_success("Firestore")
            .await?
            .json()
            .await?;

        value::decode_fields(&document.fields).map(Some)
    }

    async fn set_document(&self, path: &str, fields: &Value) -> RemoteResult<()> {
        let body = json!({ "fields": value::encode_fields(fields)? });

        self.authorized(self.client.patch(self.url(path)))
            .json(&body)
            .send()
            .await?
            .ensure_success("Firestore")
            .await?;

        log::debug!("Wrote document {path}");
        Ok(())
    }

    async fn delete_document(&self, path: &str) -> RemoteResult<()> {
        let response = self
            .authorized(self.client.delete(self.url(path)))
            .send()
            .await?;

        if response.status() != StatusCode::NOT_FOUND {
            response.ensure_success("Firestore").await?;
        }
        Ok(())
    }

    async fn list_documents(&self, collection: &str) -> RemoteResult<Vec<(String, Value)>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.url(collection))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListDocumentsResponse = self
                .authorized(request)
                .send()
                .await?
                .ensure_success("Firestore")
                .await?
                .json()
                .await?;

            for document in page.documents {
                match value::decode_fields(&document.fields) {
                    Ok(fields) => documents.push((Self::document_id(&document.name), fields)),
                    Err(e) => log::warn!("Skipping undecodable document {}: {e}", document.name),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::debug!("Listed {} documents under {collection}", documents.len());
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::test_server::{spawn_server, CannedResponse};

    #[test]
    fn test_document_id_from_name() {
        assert_eq!(
            FirestoreClient::document_id(
                "projects/p/databases/(default)/documents/users/u1/habits/h9"
            ),
            "h9"
        );
    }

    #[test]
    fn test_url_joins_paths() {
        let client =
            FirestoreClient::with_base_url("http://localhost:8080/docs/", SessionHandle::default())
                .unwrap();
        assert_eq!(
            client.url("/users/u1/habits"),
            "http://localhost:8080/docs/users/u1/habits"
        );
    }

    #[tokio::test]
    async fn test_list_documents_follows_page_tokens() {
        let base = spawn_server(vec![
            CannedResponse::json(
                200,
                r#"{"documents":[{"name":"x/users/u1/habits/h1","fields":{"name":{"stringValue":"Read"}}}],"nextPageToken":"p2"}"#,
            ),
            CannedResponse::json(
                200,
                r#"{"documents":[{"name":"x/users/u1/habits/h2","fields":{"streak":{"integerValue":"2"}}}]}"#,
            ),
        ])
        .await;
        let client = FirestoreClient::with_base_url(&base, SessionHandle::default()).unwrap();

        let documents = client.list_documents("users/u1/habits").await.unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].0, "h1");
        assert_eq!(documents[0].1["name"], "Read");
        assert_eq!(documents[1].0, "h2");
        assert_eq!(documents[1].1["streak"], 2);
    }

    #[tokio::test]
    async fn test_list_documents_skips_undecodable_document() {
        let base = spawn_server(vec![CannedResponse::json(
            200,
            r#"{"documents":[
                {"name":"x/users/u1/habits/bad","fields":{"streak":{"integerValue":"many"}}},
                {"name":"x/users/u1/habits/h1","fields":{"name":{"stringValue":"Read"}}}
            ]}"#,
        )])
        .await;
        let client = FirestoreClient::with_base_url(&base, SessionHandle::default()).unwrap();

        let documents = client.list_documents("users/u1/habits").await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].0, "h1");
    }

    #[tokio::test]
    async fn test_get_missing_document_is_none() {
        let base = spawn_server(vec![CannedResponse::json(404, r#"{"error":{}}"#)]).await;
        let client = FirestoreClient::with_base_url(&base, SessionHandle::default()).unwrap();

        assert_eq!(client.get_document("users/nobody").await, Ok(None));
    }

    #[tokio::test]
    async fn test_permission_denied_maps_to_forbidden() {
        let base = spawn_server(vec![CannedResponse::json(403, r#"{"error":{}}"#)]).await;
        let client = FirestoreClient::with_base_url(&base, SessionHandle::default()).unwrap();

        assert_eq!(
            client.list_documents("users/u1/habits").await,
            Err(RemoteError::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_no_internet() {
        let client =
            FirestoreClient::with_base_url("http://127.0.0.1:9/docs", SessionHandle::default())
                .unwrap();

        assert_eq!(
            client.set_document("users/u1", &json!({"name": "x"})).await,
            Err(RemoteError::NoInternet)
        );
    }
}
