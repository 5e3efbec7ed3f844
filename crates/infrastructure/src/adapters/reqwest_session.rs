//! HTTP session implementation using reqwest.
//!
//! Each session owns a cookie jar shared by two clients: one that never
//! follows redirects (so the login callback's `302` and `Location` stay
//! visible) and one that follows up to [`MAX_REDIRECTS`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use storecheck_application::ports::{ApiSession, HttpClientError, SessionFactory, SessionFuture};
use storecheck_domain::{ApiRequest, HttpMethod, RequestBody, ResponseSpec, Role};
use url::Url;

/// Redirect limit of the following client.
pub const MAX_REDIRECTS: usize = 10;

const USER_AGENT: &str = concat!("storecheck/", env!("CARGO_PKG_VERSION"));

/// One role's session against the API under test.
pub struct ReqwestSession {
    role: Role,
    base_url: Url,
    jar: Arc<Jar>,
    direct: Client,
    following: Client,
}

impl ReqwestSession {
    /// Creates a session with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be created.
    pub fn new(role: Role, base_url: Url) -> Result<Self, HttpClientError> {
        let jar = Arc::new(Jar::default());
        let direct = Self::client(&jar, Policy::none())?;
        let following = Self::client(&jar, Policy::limited(MAX_REDIRECTS))?;
        Ok(Self {
            role,
            base_url,
            jar,
            direct,
            following,
        })
    }

    fn client(jar: &Arc<Jar>, policy: Policy) -> Result<Client, HttpClientError> {
        Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(jar))
            .redirect(policy)
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))
    }

    /// Base URL paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Cookie jar shared by both clients.
    #[must_use]
    pub const fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Appends a request path to the base URL, keeping any path prefix
    /// the base carries.
    ///
    /// # Errors
    ///
    /// Returns `HttpClientError::InvalidUrl` if the result is not a URL.
    pub fn url_for(&self, path: &str) -> Result<Url, HttpClientError> {
        let joined = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
        Url::parse(&joined).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {joined}")))
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Attaches the body and its content type.
    fn build_body(
        builder: reqwest::RequestBuilder,
        body: &RequestBody,
    ) -> Result<reqwest::RequestBuilder, HttpClientError> {
        match body {
            RequestBody::None => Ok(builder),
            RequestBody::Json(value) => Ok(builder.json(value)),
            RequestBody::Form(pairs) => {
                let encoded = serde_urlencoded::to_string(pairs)
                    .map_err(|e| HttpClientError::InvalidBody(format!("Invalid form: {e}")))?;
                Ok(builder
                    .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(encoded))
            }
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout;
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error_chain(error);
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lowered.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        HttpClientError::Other(error_chain(error))
    }
}

/// Joins an error with its sources; reqwest keeps the useful part there.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl ApiSession for ReqwestSession {
    fn role(&self) -> Role {
        self.role
    }

    fn execute<'a>(&'a self, request: &'a ApiRequest) -> SessionFuture<'a> {
        Box::pin(async move {
            let url = self.url_for(&request.path)?;
            let client = if request.follow_redirects {
                &self.following
            } else {
                &self.direct
            };

            let start = Instant::now();
            let mut builder = client.request(Self::to_reqwest_method(request.method), url);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            builder = Self::build_body(builder, &request.body)?;

            let response = builder.send().await.map_err(|e| Self::map_error(&e))?;
            let duration = start.elapsed();

            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?;

            tracing::debug!(
                role = %self.role,
                method = %request.method,
                path = %request.path,
                status,
                elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                "response"
            );
            Ok(ResponseSpec::new(status, headers, &body, duration).with_final_url(final_url))
        })
    }
}

/// Opens [`ReqwestSession`]s against one base URL.
#[derive(Debug, Clone)]
pub struct ReqwestSessionFactory {
    base_url: Url,
}

impl ReqwestSessionFactory {
    /// Creates a factory for sessions against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `HttpClientError::InvalidUrl` unless `base_url` is an
    /// absolute `http` or `https` URL.
    pub fn new(base_url: &str) -> Result<Self, HttpClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {base_url}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(HttpClientError::InvalidUrl(format!(
                "URL must start with http:// or https://: {base_url}"
            )));
        }
        Ok(Self { base_url })
    }

    /// Base URL of opened sessions.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl SessionFactory for ReqwestSessionFactory {
    type Session = ReqwestSession;

    fn open(&self, role: Role) -> Result<ReqwestSession, HttpClientError> {
        ReqwestSession::new(role, self.base_url.clone())
    }
}
