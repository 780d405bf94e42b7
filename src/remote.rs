use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::document::Element;
use crate::domain::{DetailLevel, Organism};
use crate::error::BiocycError;
use crate::rate::RateGate;

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking `GET url -> (status, body)`.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<TransportResponse, BiocycError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, BiocycError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("biocyc-cache/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| BiocycError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| BiocycError::Http(err.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<TransportResponse, BiocycError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| BiocycError::Http(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| BiocycError::Http(err.to_string()))?;
        Ok(TransportResponse { status, body })
    }
}

/// Issues gated requests against the BioCyc web service.
///
/// Any transport failure or non-2xx status is reported as `Ok(None)`; the
/// caller cannot tell a missing frame from an unreachable server. A 2xx body
/// that is not well-formed XML is a `DocumentParse` error.
pub struct RemoteFetcher<T: Transport> {
    transport: T,
    gate: RateGate,
    base_url: String,
    detail: DetailLevel,
}

impl<T: Transport> RemoteFetcher<T> {
    pub fn new(transport: T, gate: RateGate, base_url: &str, detail: DetailLevel) -> Self {
        Self {
            transport,
            gate,
            base_url: base_url.trim_end_matches('/').to_string(),
            detail,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn detail(&self) -> DetailLevel {
        self.detail
    }

    pub fn set_detail(&mut self, detail: DetailLevel) {
        self.detail = detail;
    }

    /// `getxml` URL for one frame. Every query value is form-encoded, so ids
    /// such as `NA+` or `A&B` reach the server intact.
    pub fn record_url(&self, organism: &Organism, id: &str) -> Result<String, BiocycError> {
        let frame = format!("{organism}:{id}");
        self.service_url(
            "getxml",
            &[("id", frame.as_str()), ("detail", self.detail.as_str())],
        )
    }

    pub fn function_url(
        &self,
        function: &str,
        organism: &Organism,
        id: &str,
    ) -> Result<String, BiocycError> {
        let frame = format!("{organism}:{id}");
        self.service_url(
            "apixml",
            &[
                ("fn", function),
                ("id", frame.as_str()),
                ("detail", self.detail.as_str()),
            ],
        )
    }

    fn service_url(&self, service: &str, params: &[(&str, &str)]) -> Result<String, BiocycError> {
        Url::parse_with_params(&format!("{}/{service}", self.base_url), params)
            .map(String::from)
            .map_err(|err| BiocycError::InvalidBaseUrl(format!("{}: {err}", self.base_url)))
    }

    pub fn fetch_record(
        &self,
        organism: &Organism,
        id: &str,
    ) -> Result<Option<Element>, BiocycError> {
        self.request(&self.record_url(organism, id)?)
    }

    pub fn fetch_function(
        &self,
        function: &str,
        organism: &Organism,
        id: &str,
    ) -> Result<Option<Element>, BiocycError> {
        self.request(&self.function_url(function, organism, id)?)
    }

    fn request(&self, url: &str) -> Result<Option<Element>, BiocycError> {
        self.gate.acquire();
        tracing::info!(%url, "biocyc.request");
        let response = match self.transport.get(url) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%url, error = %err, "transport failure treated as not found");
                return Ok(None);
            }
        };
        if !response.is_success() {
            tracing::warn!(%url, status = response.status, "non-success status treated as not found");
            return Ok(None);
        }
        Element::parse(&response.body).map(Some)
    }
}
