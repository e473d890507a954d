use std::thread;
use std::time::Duration;
use std::vec;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::domain::Threshold;
use crate::error::SimError;
use crate::identifier::Identifier;
use crate::record::MatchRecord;

const METHOD_OVERRIDE: &str = "x-http-method-override";

#[derive(Debug, Clone, Default)]
pub struct SimilarityPage {
    pub records: Vec<MatchRecord>,
    /// Offset of the following page, `None` on the last page.
    pub next_offset: Option<usize>,
}

/// The remote similarity search capability.
pub trait SimilaritySearch {
    fn fetch_page(
        &self,
        identifier: &Identifier,
        threshold: Threshold,
        offset: usize,
    ) -> Result<SimilarityPage, SimError>;
}

impl<S: SimilaritySearch + ?Sized> SimilaritySearch for &S {
    fn fetch_page(
        &self,
        identifier: &Identifier,
        threshold: Threshold,
        offset: usize,
    ) -> Result<SimilarityPage, SimError> {
        (**self).fetch_page(identifier, threshold, offset)
    }
}

/// Lazy sequence of hits for one identifier; pages are fetched on demand.
pub struct Matches<'a, S: SimilaritySearch + ?Sized> {
    search: &'a S,
    identifier: &'a Identifier,
    threshold: Threshold,
    buffer: vec::IntoIter<MatchRecord>,
    next_offset: Option<usize>,
}

pub fn query<'a, S: SimilaritySearch + ?Sized>(
    search: &'a S,
    identifier: &'a Identifier,
    threshold: Threshold,
) -> Matches<'a, S> {
    Matches {
        search,
        identifier,
        threshold,
        buffer: Vec::new().into_iter(),
        next_offset: Some(0),
    }
}

impl<S: SimilaritySearch + ?Sized> Iterator for Matches<'_, S> {
    type Item = Result<MatchRecord, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.next() {
                return Some(Ok(record));
            }
            let offset = self.next_offset.take()?;
            tracing::debug!(
                identifier = %self.identifier,
                param = self.identifier.query_param(),
                offset,
                "fetching similarity page"
            );
            match self.search.fetch_page(self.identifier, self.threshold, offset) {
                Ok(page) => {
                    // An empty page never advances, so it ends the sequence.
                    if !page.records.is_empty() {
                        self.next_offset = page.next_offset;
                    }
                    self.buffer = page.records.into_iter();
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[derive(Clone)]
pub struct ChemblHttpClient {
    client: Client,
    base_url: String,
    page_size: usize,
    max_retries: usize,
}

impl ChemblHttpClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, SimError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("chembl-sim/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SimError::ChemblHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| SimError::ChemblHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size(),
            max_retries: config.max_retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    fn similarity_url(&self) -> String {
        format!("{}/data/similarity.json", self.base_url)
    }

    // Structure strings may contain '/', '#' or '%', so the query goes in a
    // form body and the service is told to treat it as a GET.
    fn similarity_request(&self, form: &[(&'static str, String)]) -> RequestBuilder {
        self.client
            .post(self.similarity_url())
            .header(METHOD_OVERRIDE, "GET")
            .form(form)
    }

    pub(crate) fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, SimError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "ChEMBL request failed".to_string());
        Err(SimError::ChemblStatus { status, message })
    }

    pub(crate) fn send_with_retries<F>(
        &self,
        mut make_req: F,
    ) -> Result<reqwest::blocking::Response, SimError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < self.max_retries && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        tracing::debug!(status, attempt, "retrying ChEMBL request");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.max_retries && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        tracing::debug!(error = %err, attempt, "retrying ChEMBL request");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(SimError::ChemblHttp(err.to_string()));
                }
            }
        }
    }
}

impl SimilaritySearch for ChemblHttpClient {
    fn fetch_page(
        &self,
        identifier: &Identifier,
        threshold: Threshold,
        offset: usize,
    ) -> Result<SimilarityPage, SimError> {
        let form = similarity_form(identifier, threshold, self.page_size, offset);
        let response = self.send_with_retries(|| self.similarity_request(&form))?;
        let response = Self::handle_status(response)?;
        let raw: Value = response
            .json()
            .map_err(|err| SimError::ChemblResponse(err.to_string()))?;
        parse_page(&raw, offset)
    }
}

/// Form fields of one similarity page request. The identifier goes under its
/// own parameter name; the threshold is sent as a plain integer string.
pub fn similarity_form(
    identifier: &Identifier,
    threshold: Threshold,
    limit: usize,
    offset: usize,
) -> Vec<(&'static str, String)> {
    vec![
        (identifier.query_param(), identifier.as_str().to_string()),
        ("similarity", threshold.to_string()),
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
    ]
}

/// Extracts one page of hits from a similarity response body.
pub fn parse_page(raw: &Value, offset: usize) -> Result<SimilarityPage, SimError> {
    let molecules = raw
        .get("molecules")
        .and_then(|value| value.as_array())
        .ok_or_else(|| SimError::ChemblResponse("missing molecules array".to_string()))?;

    let records = molecules
        .iter()
        .cloned()
        .filter_map(MatchRecord::from_value)
        .collect::<Vec<_>>();

    let has_next = raw
        .get("page_meta")
        .and_then(|meta| meta.get("next"))
        .map(|next| !next.is_null())
        .unwrap_or(false);
    let next_offset = has_next.then(|| offset + molecules.len());

    Ok(SimilarityPage {
        records,
        next_offset,
    })
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
