// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! HTTP pipeline service client

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::PipelineSource;
use crate::errors::{PipegraphError, PipegraphResult};
use crate::pipeline::{PipelineDefinition, PipelineSummary, StepCatalog};

/// Client for the pipeline service's JSON endpoints
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: Url,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> PipegraphResult<Self> {
        let base = Url::parse(base_url).map_err(|e| PipegraphError::InvalidConfig {
            reason: format!("invalid service URL '{}': {}", base_url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(PipegraphError::InvalidConfig {
                reason: format!("'{}' cannot be used as a service base URL", base_url),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint; each segment is percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> PipegraphResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PipegraphError::InvalidConfig {
                reason: format!("'{}' cannot be used as a service base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, segments: &[&str], what: &str) -> PipegraphResult<Response> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);

        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| PipegraphError::fetch(what, e))
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> PipegraphResult<T> {
        let response = response
            .error_for_status()
            .map_err(|e| PipegraphError::fetch(what, e))?;

        response.json::<T>().await.map_err(|e| PipegraphError::fetch(what, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], what: &str) -> PipegraphResult<T> {
        let response = self.send(segments, what).await?;
        Self::decode(response, what).await
    }
}

#[async_trait]
impl PipelineSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn list_pipelines(&self) -> PipegraphResult<Vec<PipelineSummary>> {
        self.get_json(&["pipelines"], "pipelines").await
    }

    async fn fetch_pipeline(&self, id: &str) -> PipegraphResult<PipelineDefinition> {
        let what = format!("pipeline '{}'", id);
        let response = self.send(&["pipeline", id], &what).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PipegraphError::PipelineNotFound { id: id.to_string() });
        }
        Self::decode(response, &what).await
    }

    async fn fetch_catalog(&self) -> PipegraphResult<StepCatalog> {
        let entries: Vec<serde_json::Value> =
            self.get_json(&["pipeline-steps"], "step catalog").await?;
        Ok(StepCatalog::from_values(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Route = (&'static str, u16, &'static str);

    /// Serve canned JSON responses keyed by request path; unknown paths get 404
    async fn serve(routes: Vec<Route>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&request);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status, body) = routes
                        .iter()
                        .find(|(p, _, _)| *p == path)
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or((404, r#"{"detail": "Not Found"}"#));
                    let reason = match status {
                        200 => "OK",
                        404 => "Not Found",
                        _ => "Internal Server Error",
                    };

                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    fn source(base_url: &str) -> HttpSource {
        HttpSource::new(base_url, Duration::from_secs(5)).unwrap()
    }

    const SUMMARIZE: &str = r#"{
        "id": "summarize-doc",
        "name": "Summarize",
        "inputs": {"doc": {}},
        "outputs": {"summary": "step1.text"},
        "steps": [{"id": "step1", "type": "summarize", "inputs": {"text": "inputs.doc"}}]
    }"#;

    #[test]
    fn test_endpoint_joining() {
        let plain = source("http://localhost:4003/");
        assert_eq!(plain.base_url(), "http://localhost:4003");
        assert_eq!(
            plain.endpoint(&["pipelines"]).unwrap().as_str(),
            "http://localhost:4003/pipelines"
        );

        let prefixed = source("http://localhost:4003/api/");
        assert_eq!(
            prefixed.endpoint(&["pipeline", "abc"]).unwrap().as_str(),
            "http://localhost:4003/api/pipeline/abc"
        );
    }

    #[test]
    fn test_pipeline_id_is_percent_encoded() {
        let source = source("http://localhost:4003");
        assert_eq!(
            source.endpoint(&["pipeline", "a/b?x#y"]).unwrap().as_str(),
            "http://localhost:4003/pipeline/a%2Fb%3Fx%23y"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            HttpSource::new("not a url", Duration::from_secs(1)),
            Err(PipegraphError::InvalidConfig { .. })
        ));
        assert!(matches!(
            HttpSource::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(PipegraphError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_fetch_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let source = HttpSource::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = source.list_pipelines().await;
        assert!(matches!(result, Err(PipegraphError::DataFetch { what, .. }) if what == "pipelines"));
    }

    #[tokio::test]
    async fn test_endpoints_decode_served_bodies() {
        let base = serve(vec![
            (
                "/pipelines",
                200,
                r#"[{"id": "summarize-doc", "name": "Summarize"},
                    {"id": "translate", "name": "Translate", "description": "Translate text"}]"#,
            ),
            ("/pipeline/summarize-doc", 200, SUMMARIZE),
            (
                "/pipeline-steps",
                200,
                r#"[{"id": "summarize", "type": "summarize", "name": null, "inputs": ["text"], "outputs": ["text"]},
                    {"description": "no identifier"},
                    {"type": "translate", "inputs": ["text"], "outputs": null}]"#,
            ),
        ])
        .await;
        let source = source(&base);

        let pipelines = source.list_pipelines().await.unwrap();
        let ids: Vec<_> = pipelines.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["summarize-doc", "translate"]);
        assert_eq!(pipelines[1].description.as_deref(), Some("Translate text"));

        let pipeline = source.fetch_pipeline("summarize-doc").await.unwrap();
        assert_eq!(pipeline.id, "summarize-doc");
        assert_eq!(pipeline.steps.len(), 1);
        assert_eq!(pipeline.outputs["summary"], "step1.text");

        let catalog = source.fetch_catalog().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ports("summarize").inputs, vec!["text"]);
        assert!(catalog.ports("translate").outputs.is_empty());
    }

    #[tokio::test]
    async fn test_missing_pipeline_is_not_found() {
        let base = serve(vec![]).await;
        let result = source(&base).fetch_pipeline("missing").await;
        assert!(matches!(result, Err(PipegraphError::PipelineNotFound { id }) if id == "missing"));
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let base = serve(vec![
            ("/pipelines", 500, r#"{"detail": "boom"}"#),
            ("/pipeline/broken", 500, r#"{"detail": "boom"}"#),
            ("/pipeline-steps", 500, r#"{"detail": "boom"}"#),
        ])
        .await;
        let source = source(&base);

        assert!(matches!(
            source.list_pipelines().await,
            Err(PipegraphError::DataFetch { what, .. }) if what == "pipelines"
        ));
        assert!(matches!(
            source.fetch_pipeline("broken").await,
            Err(PipegraphError::DataFetch { what, .. }) if what == "pipeline 'broken'"
        ));
        assert!(matches!(
            source.fetch_catalog().await,
            Err(PipegraphError::DataFetch { what, .. }) if what == "step catalog"
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_fetch_error() {
        let base = serve(vec![("/pipelines", 200, "{ not json")]).await;
        assert!(matches!(
            source(&base).list_pipelines().await,
            Err(PipegraphError::DataFetch { .. })
        ));
    }

    #[tokio::test]
    async fn test_reserved_characters_in_id_stay_in_one_segment() {
        let base = serve(vec![(
            "/pipeline/a%2Fb",
            200,
            r#"{"id": "a/b", "name": "Slashed", "steps": []}"#,
        )])
        .await;

        let pipeline = source(&base).fetch_pipeline("a/b").await.unwrap();
        assert_eq!(pipeline.id, "a/b");
    }
}
