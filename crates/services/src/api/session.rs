use std::env;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use quiz_core::model::FilterState;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::types::QuestionQuery;
use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/student/";

/// Message the backend sends when the session cookie is gone.
const SIGNED_OUT_MARKER: &str = "未登录或会话已失效";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(20),
            user_agent: format!("quiz-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the base URL taken from `QUIZ_BASE_URL` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("QUIZ_BASE_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Parses a base URL and makes sure relative paths join below it.
fn normalize_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    let url = if trimmed.ends_with('/') {
        Url::parse(trimmed)?
    } else {
        Url::parse(&format!("{trimmed}/"))?
    };
    Ok(url)
}

struct Transport {
    base_url: Url,
    client: Client,
    jar: Arc<Jar>,
}

impl Transport {
    fn build(config: &ClientConfig, base_url: Url) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url,
            client,
            jar,
        })
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Shared HTTP session: base URL, cookie jar and bearer token.
///
/// One context is created at startup and handed to every API client.
pub struct SessionContext {
    config: ClientConfig,
    transport: RwLock<Transport>,
    token: RwLock<Option<String>>,
}

impl SessionContext {
    /// # Errors
    ///
    /// Returns `ApiError::Url` for an unparsable base URL or `ApiError::Http`
    /// if the client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let transport = Transport::build(&config, base_url)?;
        Ok(Self {
            config,
            transport: RwLock::new(transport),
            token: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> Url {
        read(&self.transport).base_url.clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        read(&self.token).clone()
    }

    /// Sets the bearer token; blank tokens clear it.
    pub fn set_token(&self, token: Option<String>) {
        *write(&self.token) = token.filter(|t| !t.trim().is_empty());
    }

    /// True when the jar holds a cookie for the base URL.
    #[must_use]
    pub fn has_cookies(&self) -> bool {
        let transport = read(&self.transport);
        transport.jar.cookies(&transport.base_url).is_some()
    }

    /// Drops cookies and token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if a fresh client cannot be built.
    pub fn clear_session(&self) -> Result<(), ApiError> {
        let base_url = self.base_url();
        let fresh = Transport::build(&self.config, base_url)?;
        *write(&self.transport) = fresh;
        self.set_token(None);
        debug!("session cleared");
        Ok(())
    }

    /// Points the context at another backend, starting a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` for an unparsable URL; the current backend is
    /// kept in that case.
    pub fn switch_base_url(&self, base_url: &str) -> Result<(), ApiError> {
        let url = normalize_base_url(base_url)?;
        let fresh = Transport::build(&self.config, url)?;
        debug!(base_url = %fresh.base_url, "switching backend");
        *write(&self.transport) = fresh;
        self.set_token(None);
        Ok(())
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let (url, client) = {
            let transport = read(&self.transport);
            (transport.base_url.join(path)?, transport.client.clone())
        };
        debug!(%method, %url, "request");
        let mut builder = client.request(method, url);
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Requests the first question page to tell whether the backend still
    /// recognises this session. Any failure counts as signed out.
    pub async fn is_session_alive(&self) -> bool {
        let params = QuestionQuery::from_filters(&FilterState::default(), 1).to_params();
        let request = match self.request(Method::GET, "viewQuestion") {
            Ok(builder) => builder.query(&params),
            Err(err) => {
                warn!(error = %err, "session check could not be built");
                return false;
            }
        };
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "session check failed");
                return false;
            }
        };
        if response.status() == StatusCode::UNAUTHORIZED {
            return false;
        }
        match response.text().await {
            Ok(body) => !body.contains(SIGNED_OUT_MARKER) && !body.contains("\"code\":0"),
            Err(err) => {
                warn!(error = %err, "session check body unreadable");
                false
            }
        }
    }
}
