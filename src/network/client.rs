//! HTTP client for talking to hosted search services

use crate::config::{OutgoingSettings, ProxySettings};
use crate::engines::{EngineRequest, EngineResponse, HttpMethod, RequestBody};
use crate::error::Result;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, ClientBuilder, Method, Proxy, Response};
use std::time::{Duration, Instant};
use tracing::debug;

/// Connection pool shared by every engine of a process
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
    user_agent: String,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Build a client from the `outgoing` settings section
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = Duration::from_secs_f64(settings.request_timeout);
        let builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true)
            .danger_accept_invalid_certs(!settings.verify_ssl);

        Ok(Self {
            inner: with_proxies(builder, &settings.proxies)?.build()?,
            timeout,
            user_agent: format!("scout-rs/{}", crate::VERSION),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Send an engine request and buffer the whole answer.
    ///
    /// Non-2xx statuses are returned as responses; only connection-level
    /// failures are errors here.
    pub async fn execute(&self, request: EngineRequest) -> Result<EngineResponse> {
        let started = Instant::now();
        let EngineRequest {
            url,
            method,
            headers,
            params,
            data,
        } = request;

        let verb = match method {
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self
            .inner
            .request(verb, &url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json");
        builder = headers
            .iter()
            .fold(builder, |builder, (key, value)| builder.header(key, value));
        if !params.is_empty() {
            builder = builder.query(&params);
        }
        if let Some(RequestBody::Json(body)) = data {
            builder = builder.json(&body);
        }

        let response = read_response(builder.send().await?).await?;
        debug!(
            "{:?} {} answered {} in {:?}",
            method,
            url,
            response.status,
            started.elapsed()
        );
        Ok(response)
    }
}

fn with_proxies(builder: ClientBuilder, proxies: &ProxySettings) -> Result<ClientBuilder> {
    if let Some(all) = &proxies.all {
        return Ok(builder.proxy(Proxy::all(all)?));
    }

    let mut builder = builder;
    if let Some(http) = &proxies.http {
        builder = builder.proxy(Proxy::http(http)?);
    }
    if let Some(https) = &proxies.https {
        builder = builder.proxy(Proxy::https(https)?);
    }
    Ok(builder)
}

async fn read_response(response: Response) -> Result<EngineResponse> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(key, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (key.to_string(), value.to_string()))
        })
        .collect();

    Ok(EngineResponse {
        status,
        headers,
        text: response.text().await?,
        url,
    })
}
