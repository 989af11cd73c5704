//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted via a trait so the transport can run
//! over reqwest or straight into an in-process server.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::EntityTransport;
use async_trait::async_trait;
use gardonyi_model::{EntityId, Record};
use gardonyi_protocol::{
    decode_json, ApiPath, ErrorBody, HttpRequest, HttpResponse, ListQuery, ListResponse,
    LoopbackServer, Method, AUTHORIZATION_HEADER, TOTAL_COUNT_HEADER,
};
use parking_lot::RwLock;
use tracing::debug;

/// HTTP client abstraction.
///
/// Implement this trait to plug in an HTTP library.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends `request` to `url` (base URL, path and query).
    ///
    /// Returns `Err` only when no response was received.
    async fn send(&self, url: &str, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// REST transport for any record type.
pub struct HttpTransport<C: HttpClient> {
    base_url: String,
    api_prefix: String,
    bearer_token: Option<String>,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport talking to the server named in `config`.
    pub fn new(config: &ClientConfig, client: C) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.clone(),
            bearer_token: config.bearer_token.clone(),
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the last transport failure.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    async fn execute(&self, mut request: HttpRequest) -> ClientResult<HttpResponse> {
        if let Some(token) = &self.bearer_token {
            request = request.with_header(AUTHORIZATION_HEADER, format!("Bearer {}", token));
        }
        let url = format!("{}{}", self.base_url, request.path_and_query());
        debug!("{} {}", request.method, url);

        match self.client.send(&url, request).await {
            Ok(response) => {
                *self.last_error.write() = None;
                Ok(response)
            }
            Err(e) => {
                *self.last_error.write() = Some(e.clone());
                Err(ClientError::NetworkFailure(e))
            }
        }
    }

    async fn send_record<R: Record>(
        &self,
        method: Method,
        path: String,
        record: &R,
        id: Option<EntityId>,
    ) -> ClientResult<R> {
        let request = HttpRequest::new(method, path).with_json(record)?;
        let response = self.execute(request).await?;
        if !response.is_success() {
            return Err(error_from_response(R::ENTITY_NAME, id, &response));
        }
        Ok(decode_json(&response.body)?)
    }

    fn collection<R: Record>(&self) -> String {
        ApiPath::collection(&self.api_prefix, R::RESOURCE_PATH)
    }

    fn item<R: Record>(&self, id: EntityId) -> String {
        ApiPath::item(&self.api_prefix, R::RESOURCE_PATH, id)
    }
}

#[async_trait]
impl<R: Record, C: HttpClient> EntityTransport<R> for HttpTransport<C> {
    async fn list(&self, query: &ListQuery) -> ClientResult<ListResponse<R>> {
        let request =
            HttpRequest::new(Method::Get, self.collection::<R>()).with_query(query.to_query_string());
        let response = self.execute(request).await?;
        if !response.is_success() {
            return Err(error_from_response(R::ENTITY_NAME, None, &response));
        }

        let items: Vec<R> = decode_json(&response.body)?;
        let total = match response.header(TOTAL_COUNT_HEADER) {
            Some(value) => value.trim().parse().map_err(|_| {
                ClientError::Protocol(format!("invalid {} header: {}", TOTAL_COUNT_HEADER, value))
            })?,
            None => items.len() as u64,
        };
        Ok(ListResponse::new(items, total))
    }

    async fn get(&self, id: EntityId) -> ClientResult<R> {
        let response = self
            .execute(HttpRequest::new(Method::Get, self.item::<R>(id)))
            .await?;
        if !response.is_success() {
            return Err(error_from_response(R::ENTITY_NAME, Some(id), &response));
        }
        Ok(decode_json(&response.body)?)
    }

    async fn create(&self, record: &R) -> ClientResult<R> {
        self.send_record(Method::Post, self.collection::<R>(), record, record.id())
            .await
    }

    async fn update(&self, record: &R) -> ClientResult<R> {
        let id = record
            .id()
            .ok_or_else(|| ClientError::not_found(R::ENTITY_NAME, None))?;
        self.send_record(Method::Put, self.item::<R>(id), record, Some(id))
            .await
    }

    async fn partial_update(&self, record: &R) -> ClientResult<R> {
        let id = record
            .id()
            .ok_or_else(|| ClientError::not_found(R::ENTITY_NAME, None))?;
        self.send_record(Method::Patch, self.item::<R>(id), record, Some(id))
            .await
    }

    async fn delete(&self, id: EntityId) -> ClientResult<()> {
        let response = self
            .execute(HttpRequest::new(Method::Delete, self.item::<R>(id)))
            .await?;
        if !response.is_success() {
            return Err(error_from_response(R::ENTITY_NAME, Some(id), &response));
        }
        Ok(())
    }
}

/// Maps an error response onto the client error taxonomy.
pub fn error_from_response(entity: &str, id: Option<EntityId>, response: &HttpResponse) -> ClientError {
    let body: Option<ErrorBody> = decode_json(&response.body).ok();
    let title = body
        .as_ref()
        .map(|b| b.title.clone())
        .unwrap_or_else(|| format!("HTTP {}", response.status));
    let key = body.as_ref().and_then(|b| b.error_key.as_deref());

    match (response.status, key) {
        (404, _) | (400, Some("idnotfound")) => ClientError::not_found(entity, id),
        (400, Some("idnull")) => ClientError::not_found(entity, None),
        (400, Some("idexists")) => ClientError::Conflict(title),
        (400, _) => ClientError::ValidationFailure(title),
        (status, _) if status >= 500 => ClientError::Server {
            status,
            message: title,
        },
        (status, _) => ClientError::Protocol(format!("unexpected status {}: {}", status, title)),
    }
}

/// A loopback HTTP client that routes requests directly to a server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }

    /// Returns the server.
    pub fn server(&self) -> &S {
        &self.server
    }
}

#[async_trait]
impl<S: LoopbackServer> HttpClient for LoopbackClient<S> {
    async fn send(&self, _url: &str, request: HttpRequest) -> Result<HttpResponse, String> {
        Ok(self.server.handle(request))
    }
}

/// HTTP client backed by reqwest.
#[cfg(feature = "reqwest")]
pub struct ReqwestClient {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestClient {
    /// Creates a client applying the configured timeout to every request.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::NetworkFailure(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, url: &str, request: HttpRequest) -> Result<HttpResponse, String> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.header("Content-Type", "application/json").body(body);
        }

        let response = builder.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| e.to_string())?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
