//! reqwest-backed sample API client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ClientError, SampleSource};
use crate::config::BackendConfig;
use crate::model::{BackendHealth, ListSamplesParams, MetadataSearchParams, Sample};

/// Header carrying the dashboard's API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Sample API REST client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: BackendConfig,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from an explicitly constructed configuration
    pub fn new(config: BackendConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Start a request against the configured base URL.
    ///
    /// Every request issued by this client goes through here, so the
    /// API key is attached exactly when one is configured.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorize(self.client.request(method, self.url(path)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.api_key() {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    /// `GET` a path and decode the JSON body
    pub async fn get<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut builder = self.request(Method::GET, path);
        if let Some(query) = query {
            builder = builder.query(query);
        }

        tracing::debug!(path = %path, "Sample API request");

        let response = builder.send().await.map_err(map_send_error)?;
        decode(response).await
    }
}

fn map_send_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_connect() {
        ClientError::Unavailable
    } else {
        ClientError::Request(e)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "Sample API returned an error status");
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: text,
        });
    }

    let bytes = response.bytes().await.map_err(map_send_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl SampleSource for ApiClient {
    async fn list_samples(&self, params: &ListSamplesParams) -> Result<Vec<Sample>, ClientError> {
        self.get("/samples/", Some(params)).await
    }

    async fn get_sample(&self, sample_id: &str) -> Result<Sample, ClientError> {
        let path = format!("/samples/{}", urlencoding::encode(sample_id));
        self.get::<_, ()>(&path, None).await
    }

    async fn search_by_metadata(
        &self,
        params: &MetadataSearchParams,
    ) -> Result<Vec<Sample>, ClientError> {
        self.get("/samples/search/metadata", Some(params)).await
    }

    async fn health(&self) -> Result<BackendHealth, ClientError> {
        self.get::<_, ()>("/health", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, RawQuery},
        http::{HeaderMap as AxumHeaders, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    fn client_with_key(key: Option<&str>) -> ApiClient {
        let mut config = BackendConfig::new("http://localhost:8000/");
        if let Some(key) = key {
            config = config.with_api_key(key);
        }
        ApiClient::new(config).unwrap()
    }

    /// Backend stand-in that reflects the query string and API key back
    /// through the sample fields.
    async fn spawn_backend() -> String {
        async fn list(headers: AxumHeaders, RawQuery(query): RawQuery) -> Json<Value> {
            let key = headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<none>")
                .to_string();
            Json(json!([{
                "sample_id": query.unwrap_or_default(),
                "patient_hash": key,
                "runs": []
            }]))
        }

        async fn detail(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
            if id == "missing" {
                return Err(StatusCode::NOT_FOUND);
            }
            if id == "garbled" {
                return Ok(Json(json!({"unexpected": true})));
            }
            Ok(Json(json!({"sample_id": id, "patient_hash": "h", "runs": []})))
        }

        let app = Router::new()
            .route("/samples/", get(list))
            .route("/samples/:id", get(detail))
            .route("/health", get(|| async { Json(json!({"status": "healthy", "database": "connected"})) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = client_with_key(None);
        assert_eq!(client.url("/samples/"), "http://localhost:8000/samples/");
        assert_eq!(client.url("health"), "http://localhost:8000/health");
    }

    #[test]
    fn test_api_key_header_attached() {
        let client = client_with_key(Some("test_dummy_key"));
        let request = client.request(Method::GET, "/dummy").build().unwrap();

        assert_eq!(
            request.headers().get(API_KEY_HEADER).unwrap(),
            "test_dummy_key"
        );
        assert_eq!(request.url().as_str(), "http://localhost:8000/dummy");
    }

    #[test]
    fn test_api_key_header_absent_when_unconfigured() {
        let client = client_with_key(None);
        let request = client.request(Method::GET, "/dummy").build().unwrap();
        assert!(request.headers().get(API_KEY_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_list_samples_sends_params_and_key() {
        let base = spawn_backend().await;
        let client = ApiClient::new(BackendConfig::new(base).with_api_key("k-123")).unwrap();

        let samples = client
            .list_samples(&ListSamplesParams::default().assay_type("WGS"))
            .await
            .unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].sample_id, "skip=0&limit=50&assay_type=WGS");
        assert_eq!(samples[0].patient_hash, "k-123");
    }

    #[tokio::test]
    async fn test_unauthenticated_request_has_no_key() {
        let base = spawn_backend().await;
        let client = ApiClient::new(BackendConfig::new(base)).unwrap();

        let samples = client.list_samples(&ListSamplesParams::default()).await.unwrap();
        assert_eq!(samples[0].patient_hash, "<none>");
    }

    #[tokio::test]
    async fn test_get_sample_status_and_decode_errors() {
        let base = spawn_backend().await;
        let client = ApiClient::new(BackendConfig::new(base)).unwrap();

        let sample = client.get_sample("TEST-001").await.unwrap();
        assert_eq!(sample.sample_id, "TEST-001");

        let err = client.get_sample("missing").await.unwrap_err();
        assert!(err.is_not_found());

        let err = client.get_sample("garbled").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_backend().await;
        let client = ApiClient::new(BackendConfig::new(base)).unwrap();

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "healthy");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(BackendConfig::new(format!("http://{}", addr))).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::Unavailable | ClientError::Request(_)));
    }
}
