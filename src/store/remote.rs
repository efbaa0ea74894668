use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{Persistence, SnippetStore, sort_newest_first};
use crate::auth::Identity;
use crate::error::StoreError;
use crate::models::{NewSnippet, Snippet, SnippetId};

/// Per-record store talking JSON over HTTP to a hosted document collection.
///
/// Endpoints, relative to `base_url`:
/// - `GET /{collection}?userId=..&orderBy=created&direction=desc`
/// - `POST /{collection}` answering `{"id": ..}`
/// - `DELETE /{collection}/{id}`
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    collection: String,
}

#[derive(Deserialize)]
struct CreatedDocument {
    id: SnippetId,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            collection: collection.into(),
        }
    }

    pub fn collection_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.collection.trim_matches('/')
        )
    }

    pub fn document_url(&self, id: &SnippetId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    fn authorize(builder: RequestBuilder, identity: &Identity) -> RequestBuilder {
        match &identity.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

async fn check_status(resp: Response) -> Result<Response, StoreError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

#[async_trait]
impl SnippetStore for RemoteStore {
    fn persistence(&self) -> Persistence {
        Persistence::PerRecord
    }

    async fn load(&self, identity: Option<&Identity>) -> Result<Vec<Snippet>, StoreError> {
        let identity = identity.ok_or(StoreError::Unauthenticated)?;
        let request = self.client.get(self.collection_url()).query(&[
            ("userId", identity.uid.as_str()),
            ("orderBy", "created"),
            ("direction", "desc"),
        ]);

        let resp = check_status(Self::authorize(request, identity).send().await?).await?;
        let mut snippets: Vec<Snippet> = resp.json().await?;
        // The ordering is part of the contract even if the service skips orderBy.
        sort_newest_first(&mut snippets);
        debug!("Fetched {} snippet(s) for {}", snippets.len(), identity.uid);
        Ok(snippets)
    }

    async fn create(
        &self,
        identity: Option<&Identity>,
        record: &NewSnippet,
    ) -> Result<SnippetId, StoreError> {
        let identity = identity.ok_or(StoreError::Unauthenticated)?;
        let request = self.client.post(self.collection_url()).json(record);

        let resp = check_status(Self::authorize(request, identity).send().await?).await?;
        let created: CreatedDocument = resp.json().await?;
        info!("Created remote snippet {}", created.id);
        Ok(created.id)
    }

    async fn delete(&self, identity: Option<&Identity>, id: &SnippetId) -> Result<(), StoreError> {
        let identity = identity.ok_or(StoreError::Unauthenticated)?;
        let request = self.client.delete(self.document_url(id));

        let resp = Self::authorize(request, identity).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        check_status(resp).await?;
        info!("Deleted remote snippet {}", id);
        Ok(())
    }

    async fn save_all(&self, _snippets: &[Snippet]) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthProvider;
    use crate::models::SnippetLanguage;
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alice() -> Identity {
        let mut identity = Identity::new(AuthProvider::GitHub, "alice");
        identity.access_token = Some("tok-1".to_string());
        identity
    }

    fn record() -> NewSnippet {
        NewSnippet {
            title: "Sort".to_string(),
            description: String::new(),
            code: "sorted(a)".to_string(),
            language: SnippetLanguage::Python,
            tags: vec!["algo".to_string()],
            created: Utc::now(),
            user_id: Some("alice".to_string()),
        }
    }

    #[tokio::test]
    async fn test_load_queries_by_owner_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/snippets"))
            .and(query_param("userId", "alice"))
            .and(query_param("orderBy", "created"))
            .and(query_param("direction", "desc"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "old", "title": "Old", "code": "1",
                 "created": "2024-01-01T00:00:00Z", "userId": "alice"},
                {"id": "new", "title": "New", "code": "2", "language": "ruby",
                 "created": "2024-03-01T00:00:00Z", "userId": "alice"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RemoteStore::new(format!("{}/v1", server.uri()), "snippets");
        let snippets = store.load(Some(&alice())).await.unwrap();
        let ids: Vec<String> = snippets.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(snippets[0].language, SnippetLanguage::Ruby);
    }

    #[tokio::test]
    async fn test_create_posts_record_and_reads_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/snippets"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_partial_json(json!({
                "title": "Sort",
                "language": "python",
                "tags": ["algo"],
                "userId": "alice"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "doc-7"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = RemoteStore::new(server.uri(), "snippets");
        let id = store.create(Some(&alice()), &record()).await.unwrap();
        assert_eq!(id, SnippetId::Key("doc-7".to_string()));
    }

    #[tokio::test]
    async fn test_delete_maps_missing_document_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/snippets/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/snippets/here"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = RemoteStore::new(server.uri(), "snippets");
        let gone = SnippetId::Key("gone".to_string());
        let err = store.delete(Some(&alice()), &gone).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == gone));

        store
            .delete(Some(&alice()), &SnippetId::Key("here".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_statuses_carry_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = RemoteStore::new(server.uri(), "snippets");
        let err = store.load(Some(&alice())).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, ref body } if body == "maintenance"));

        let err = store.create(Some(&alice()), &record()).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 403, ref body } if body == "forbidden"));

        let err = store
            .delete(Some(&alice()), &SnippetId::Key("k".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_no_token_sends_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = RemoteStore::new(server.uri(), "snippets");
        let anonymous = Identity::new(AuthProvider::Google, "bob");
        assert!(store.load(Some(&anonymous)).await.unwrap().is_empty());
    }

    #[test]
    fn test_urls_tolerate_slashes() {
        let store = RemoteStore::new("https://api.example.com/v1/", "/snippets/");
        assert_eq!(store.collection_url(), "https://api.example.com/v1/snippets");
        assert_eq!(
            store.document_url(&SnippetId::Key("k1".to_string())),
            "https://api.example.com/v1/snippets/k1"
        );
    }

    #[tokio::test]
    async fn test_requires_identity() {
        let store = RemoteStore::new("http://127.0.0.1:9", "snippets");
        let err = store.load(None).await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthenticated));

        let err = store
            .delete(None, &SnippetId::Key("k".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthenticated));
    }

    #[test]
    fn test_created_document_shape() {
        let created: CreatedDocument = serde_json::from_str(r#"{"id": "doc-9"}"#).unwrap();
        assert_eq!(created.id, SnippetId::Key("doc-9".to_string()));
    }
}
