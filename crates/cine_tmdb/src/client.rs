use std::{sync::Arc, time::Duration};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};
use url::Url;

use crate::{
    Error, Result, StatusCode, TmdbError,
    handlers::{MoviesHandler, PeopleHandler},
    params::{Filters, Listing},
    source::ListingSource,
};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Fixed number of results TMDB returns per page.
pub const PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) inner: Arc<Inner>,
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) client: reqwest::Client,
    pub(crate) api_base: String,
    pub(crate) language: String,
}

#[derive(Debug, Default)]
pub struct ClientBuilder {
    access_token: Option<String>,
    base_url: Option<String>,
    language: Option<String>,
    timeout: Option<Duration>,
}

impl Client {
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.inner.language
    }

    #[must_use]
    pub fn movies(&self) -> MoviesHandler {
        MoviesHandler {
            client: self.clone(),
        }
    }

    #[must_use]
    pub fn people(&self) -> PeopleHandler {
        PeopleHandler {
            client: self.clone(),
        }
    }

    /// A fixed-page-size view of `listing`, narrowed by `filters`.
    #[must_use]
    pub fn listing_source(&self, listing: Listing, filters: Filters) -> ListingSource {
        ListingSource::new(self.clone(), listing, filters)
    }

    /// `GET {api_base}{path}` with the configured language appended to `query`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.inner.api_base, path);
        trace!(%url, ?query, "Triggering request.");

        let request = self
            .inner
            .client
            .get(url)
            .query(&[("language", self.inner.language.as_str())])
            .query(query);

        self.send_json(request).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        trace!(
            status = status.as_u16(),
            content_length = body.len(),
            "Received response."
        );

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("status_message")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                })
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

            warn!(status = status.as_u16(), %message, "Unexpected response.");

            return Err(Error::Tmdb {
                source: TmdbError {
                    status_code: StatusCode::new(status.as_u16()),
                    message,
                },
                body: Some(body),
            });
        }

        serde_json::from_str(&body).map_err(Into::into)
    }
}

impl ClientBuilder {
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client> {
        let client = build_http_client(self.access_token.as_deref(), self.timeout)?;

        let api_base = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let api_base = Url::parse(api_base)?.as_str().trim_end_matches('/').to_owned();

        Ok(Client {
            inner: Arc::new(Inner {
                client,
                api_base,
                language: self.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            }),
        })
    }
}

fn build_http_client(token: Option<&str>, timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("cine"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|error| Error::Build(format!("{error:#}")))
}
