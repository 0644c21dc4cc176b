use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::error::ApiError;
use crate::logging::log_request;
use crate::transport::{HttpRequest, Transport};

const JSON_HEADERS: [(&str, &str); 3] = [
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
    ("Cache-Control", "no-store"),
];

/// Performs single network attempts against the backend and classifies the outcome.
pub struct Dispatcher {
    base: Url,
    transport: Arc<dyn Transport>,
    dispatched: AtomicU64,
}

impl Dispatcher {
    pub fn new(base: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base,
            transport,
            dispatched: AtomicU64::new(0),
        }
    }

    /// Number of round trips attempted so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url_for(&self, path: &str, query: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", prefix, path));
        url.set_query(None);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = self.send(Method::GET, path, query, None).await?;
        decode(path, &body)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let encoded = serde_json::to_string(payload)
            .map_err(|e| {
                ApiError::InvalidInput(format!("unserializable payload for {}: {}", path, e))
            })?;
        let body = self.send(Method::POST, path, &[], Some(encoded)).await?;
        decode(path, &body)
    }

    /// Plain-text GET; non-2xx statuses are returned rather than raised.
    pub async fn get_text(&self, path: &str) -> Result<(u16, String), ApiError> {
        self.round_trip(Method::GET, path, &[], None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<String, ApiError> {
        let (status, body) = self.round_trip(method, path, query, body).await?;
        if !(200..300).contains(&status) {
            return Err(ApiError::from_status(status, body));
        }
        Ok(body)
    }

    async fn round_trip(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<(u16, String), ApiError> {
        let request = HttpRequest {
            method: method.clone(),
            url: self.url_for(path, query),
            headers: JSON_HEADERS.to_vec(),
            body,
        };

        self.dispatched.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();
        let outcome = self.transport.send(request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(resp) => {
                log_request(method.as_str(), path, Some(resp.status), elapsed_ms);
                Ok((resp.status, resp.body))
            }
            Err(err) => {
                log_request(method.as_str(), path, None, elapsed_ms);
                Err(ApiError::Connectivity { message: format!("{:#}", err) })
            }
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::transport::HttpResponse;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        status: u16,
        body: &'static str,
        fail: bool,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn answer(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self { status, body, fail: false, seen: Mutex::new(Vec::new()) })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self { status: 0, body: "", fail: true, seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn send(&self, request: HttpRequest) -> anyhow::Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            if self.fail {
                return Err(anyhow!("error trying to connect: tcp connect error: Connection refused"));
            }
            Ok(HttpResponse { status: self.status, body: self.body.to_string() })
        }
    }

    fn dispatcher(base: &str, transport: Arc<Scripted>) -> Dispatcher {
        Dispatcher::new(Url::parse(base).unwrap(), transport)
    }

    #[test]
    fn test_url_keeps_base_prefix() {
        let d = dispatcher("http://backend:8000/api/", Scripted::answer(200, "{}"));
        let url = d.url_for("/data/processed-sample", &[("limit", "50".to_string())]);
        assert_eq!(url.as_str(), "http://backend:8000/api/data/processed-sample?limit=50");

        let d = dispatcher("http://localhost:8000", Scripted::answer(200, "{}"));
        assert_eq!(d.url_for("/predict", &[]).as_str(), "http://localhost:8000/predict");
    }

    #[tokio::test]
    async fn test_success_decodes_and_sends_json_headers() {
        let t = Scripted::answer(200, r#"{"status":"ok"}"#);
        let d = dispatcher("http://localhost:8000", t.clone());
        let v: serde_json::Value = d.post("/predict", &serde_json::json!({"uploads": 1})).await.unwrap();
        assert_eq!(v["status"], "ok");
        assert_eq!(d.dispatched(), 1);

        let seen = t.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::POST);
        assert!(seen[0].headers.contains(&("Content-Type", "application/json")));
        assert!(seen[0].headers.contains(&("Cache-Control", "no-store")));
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"uploads":1}"#));
    }

    #[tokio::test]
    async fn test_transport_failure_is_connectivity() {
        let d = dispatcher("http://localhost:8000", Scripted::unreachable());
        let err = d.get::<serde_json::Value>("/clusters/summary", &[]).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Connectivity);
        assert!(err.to_string().contains("Connection refused"));
    }

    #[tokio::test]
    async fn test_status_errors_carry_body() {
        let d = dispatcher("http://localhost:8000", Scripted::answer(404, "Not Found"));
        let err = d.get::<serde_json::Value>("/analytics/upload-growth-buckets", &[]).await.unwrap_err();
        assert_eq!(err, ApiError::NotFound { body: "Not Found".into() });

        let d = dispatcher("http://localhost:8000", Scripted::answer(400, r#"{"detail":"bad"}"#));
        let err = d.get::<serde_json::Value>("/predict", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), r#"API error 400: {"detail":"bad"}"#);
    }

    #[tokio::test]
    async fn test_bad_body_is_decode_error() {
        let d = dispatcher("http://localhost:8000", Scripted::answer(200, "<html>"));
        let err = d.get::<serde_json::Value>("/health", &[]).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }

    #[tokio::test]
    async fn test_get_text_returns_non_success() {
        let d = dispatcher("http://localhost:8000", Scripted::answer(503, "not_ready missing=a\n"));
        let (status, body) = d.get_text("/ready").await.unwrap();
        assert_eq!(status, 503);
        assert!(body.starts_with("not_ready"));
    }
}
