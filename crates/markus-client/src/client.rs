//! Contains the MarkusClient struct for communicating with a MarkUs instance.

mod api;

use crate::{
    error::{MarkusClientError, MarkusClientResult},
    request::Params,
    response::{self, ApiResponse, ResponseFormat},
};
use reqwest::{
    blocking::{multipart::Form, Client, RequestBuilder},
    header::{HeaderValue, AUTHORIZATION},
    Method,
};
use serde::Serialize;
use std::{fmt, sync::Arc};
use url::Url;

/// A struct for interacting with the MarkUs API.
/// Uses an `Arc` internally so it is cheap to clone.
#[derive(Clone)]
pub struct MarkusClient(Arc<MarkusCore>);

struct MarkusCore {
    client: Client,
    root_url: Url,
    authorization: HeaderValue,
}

impl fmt::Debug for MarkusClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the authorization header
        f.debug_struct("MarkusClient")
            .field("root_url", &self.0.root_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Non-API methods.
impl MarkusClient {
    /// Creates a new client for the MarkUs instance at `root_url`.
    ///
    /// A valid API key can be found on the dashboard page of MarkUs when logged in as an admin.
    ///
    /// # Errors
    /// If the API key cannot be used as a header value or the HTTP client fails to initialize.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use markus_client::MarkusClient;
    ///
    /// let client = MarkusClient::new("api_key", "https://markus.example.com".parse().unwrap()).unwrap();
    /// let users = client.get_all_users().unwrap();
    /// ```
    pub fn new(api_key: &str, root_url: Url) -> MarkusClientResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(MarkusClientError::HttpClientBuilder)?;
        Self::with_http_client(client, api_key, root_url)
    }

    /// Creates a new client that sends its requests with the given HTTP client,
    /// which can be used to configure timeouts, proxies and the like.
    ///
    /// # Errors
    /// If the API key cannot be used as a header value.
    pub fn with_http_client(
        client: Client,
        api_key: &str,
        root_url: Url,
    ) -> MarkusClientResult<Self> {
        // guarantee a trailing slash, otherwise join will drop the last component
        let root_url = if root_url.as_str().ends_with('/') {
            root_url
        } else {
            let with_slash = format!("{root_url}/");
            with_slash
                .parse()
                .map_err(|e| MarkusClientError::UrlParse(with_slash, e))?
        };

        let mut authorization = HeaderValue::from_str(&format!("MarkUsAuth {api_key}"))
            .map_err(MarkusClientError::InvalidApiKey)?;
        authorization.set_sensitive(true);

        Ok(Self(Arc::new(MarkusCore {
            client,
            root_url,
            authorization,
        })))
    }

    pub fn root_url(&self) -> &Url {
        &self.0.root_url
    }

    /// The URL of a resource path. Endpoints returning raw content have no `.json` suffix.
    pub fn api_url(&self, path: &str, format: ResponseFormat) -> MarkusClientResult<Url> {
        let tail = match format {
            ResponseFormat::Json | ResponseFormat::Text => format!("api/{path}.json"),
            ResponseFormat::Content => format!("api/{path}"),
        };
        self.0
            .root_url
            .join(&tail)
            .map_err(|e| MarkusClientError::UrlParse(tail, e))
    }

    // creates a request with the authorization header
    fn request(
        &self,
        method: Method,
        path: &str,
        format: ResponseFormat,
    ) -> MarkusClientResult<MarkusRequest> {
        let url = self.api_url(path, format)?;
        log::info!("{} {}", method, url);
        let builder = self
            .0
            .client
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, self.0.authorization.clone());
        Ok(MarkusRequest {
            method,
            url,
            format,
            builder,
        })
    }
}

/// Helper for building and sending requests.
struct MarkusRequest {
    method: Method,
    url: Url,
    format: ResponseFormat,
    builder: RequestBuilder,
}

impl MarkusRequest {
    fn query(mut self, params: &Params) -> Self {
        if !params.is_empty() {
            self.builder = self.builder.query(params.as_slice());
        }
        self
    }

    fn json<T>(mut self, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.builder = self.builder.json(value);
        self
    }

    fn multipart(mut self, form: Form) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Sends the request and normalizes the response.
    fn send(self) -> MarkusClientResult<ApiResponse> {
        let res = self
            .builder
            .send()
            .map_err(|e| MarkusClientError::ConnectionError(self.method, self.url.clone(), e))?;
        let status = res.status();
        let body = res
            .bytes()
            .map_err(|e| MarkusClientError::HttpReadResponse(self.url.clone(), e))?;
        response::normalize(status, body, self.format, &self.url)
    }
}
