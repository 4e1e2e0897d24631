//! One-time status messages carried across a redirect in a cookie.
//!
//! [`flash_middleware`] decodes the `marquee.flash` cookie into an
//! [`IncomingFlash`] request extension. Handlers attach new messages with
//! [`FlashRedirect`]; the middleware writes them back to the cookie. A page
//! that renders the incoming messages consumes them, so the cookie is cleared
//! on any non-redirect response.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Request, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Cookie holding pending flash messages.
pub const FLASH_COOKIE: &str = "marquee.flash";

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Error,
}

/// A single status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub value: String,
}

/// Messages that arrived with the request.
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Vec<FlashMessage>);

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

/// Messages a handler wants shown on the next page.
#[derive(Debug, Clone)]
struct OutgoingFlash(Vec<FlashMessage>);

/// A `303 See Other` redirect carrying flash messages.
#[derive(Debug, Clone)]
pub struct FlashRedirect {
    to: String,
    messages: Vec<FlashMessage>,
}

impl FlashRedirect {
    /// Redirect without a message.
    pub fn to(uri: impl Into<String>) -> Self {
        Self {
            to: uri.into(),
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn info(self, message: impl Into<String>) -> Self {
        self.push(FlashLevel::Info, message)
    }

    #[must_use]
    pub fn success(self, message: impl Into<String>) -> Self {
        self.push(FlashLevel::Success, message)
    }

    #[must_use]
    pub fn error(self, message: impl Into<String>) -> Self {
        self.push(FlashLevel::Error, message)
    }

    fn push(mut self, level: FlashLevel, message: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            level,
            value: message.into(),
        });
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.to).into_response();
        if !self.messages.is_empty() {
            response.extensions_mut().insert(OutgoingFlash(self.messages));
        }
        response
    }
}

fn encode(messages: &[FlashMessage]) -> Option<String> {
    match serde_json::to_vec(messages) {
        Ok(json) => Some(URL_SAFE_NO_PAD.encode(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize flash messages");
            None
        }
    }
}

fn decode(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_else(|| {
            tracing::debug!("Discarding malformed flash cookie");
            Vec::new()
        })
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Load incoming flash messages and persist outgoing ones.
pub async fn flash_middleware(mut req: Request<Body>, next: Next) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let incoming = jar
        .get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default();
    let had_incoming = jar.get(FLASH_COOKIE).is_some();

    req.extensions_mut().insert(IncomingFlash(incoming));

    let mut response = next.run(req).await;

    if let Some(OutgoingFlash(messages)) = response.extensions_mut().remove::<OutgoingFlash>()
        && let Some(value) = encode(&messages)
    {
        return (jar.add(flash_cookie(value)), response).into_response();
    }

    // Redirects pass pending messages on to the page that finally renders them.
    if had_incoming && !response.status().is_redirection() {
        return (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), response).into_response();
    }

    response
}
