//! Reqwest HTTP Requester - outbound calls of HTTP actions.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

use crate::ports::{HttpBody, HttpMethod, HttpRequest, HttpRequestError, HttpRequester, HttpResponse};

/// [`HttpRequester`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpRequester {
    client: Client,
}

impl ReqwestHttpRequester {
    pub fn new(timeout: Duration) -> Result<Self, HttpRequestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpRequestError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl HttpRequester for ReqwestHttpRequester {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpRequestError> {
        let mut builder = self.client.request(to_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            HttpBody::Empty => builder,
            HttpBody::Json(body) => builder.json(&body),
            HttpBody::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpRequestError::Timeout
            } else if e.is_builder() {
                HttpRequestError::InvalidRequest(e.to_string())
            } else {
                HttpRequestError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| HttpRequestError::Network(e.to_string()))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        tracing::debug!(status, "HTTP action response received");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn requester() -> ReqwestHttpRequester {
        ReqwestHttpRequester::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn get_sends_query_and_parses_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/orders")
            .match_query(Matcher::UrlEncoded("id".into(), "42".into()))
            .match_header("x-api-key", "k")
            .with_status(200)
            .with_body(r#"{"status": "shipped"}"#)
            .create_async()
            .await;

        let mut request = HttpRequest::new(HttpMethod::Get, format!("{}/orders", server.url()));
        request.query.push(("id".into(), "42".into()));
        request.headers.push(("x-api-key".into(), "k".into()));
        let response = requester().send(request).await.unwrap();

        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(response.body, json!({"status": "shipped"}));
    }

    #[tokio::test]
    async fn post_sends_json_and_keeps_text_bodies() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/tickets")
            .match_body(Matcher::Json(json!({"subject": "help"})))
            .with_status(201)
            .with_body("created")
            .create_async()
            .await;

        let mut request = HttpRequest::new(HttpMethod::Post, format!("{}/tickets", server.url()));
        request.body = HttpBody::Json(json!({"subject": "help"}));
        let response = requester().send(request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!("created"));
    }

    #[tokio::test]
    async fn error_statuses_are_returned() {
        let mut server = mockito::Server::new_async().await;
        server.mock("DELETE", "/x").with_status(404).create_async().await;

        let response = requester()
            .send(HttpRequest::new(HttpMethod::Delete, format!("{}/x", server.url())))
            .await
            .unwrap();
        assert!(!response.is_success());
    }
}
