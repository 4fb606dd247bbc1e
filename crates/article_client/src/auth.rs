//! Authorization header selection for outgoing article API requests.

use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    RequestBuilder,
};
use shared::domain::LoginOrigin;

use crate::error::QueryError;

/// Session values needed to decorate one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub token: Option<String>,
    pub login_origin: Option<LoginOrigin>,
}

impl RequestContext {
    pub fn new(token: impl Into<String>, login_origin: Option<LoginOrigin>) -> Self {
        Self {
            token: Some(token.into()),
            login_origin,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

pub trait AuthSession: Send + Sync {
    fn current_token(&self) -> Option<String>;
    fn current_login_origin(&self) -> Option<LoginOrigin>;

    fn request_context(&self) -> RequestContext {
        RequestContext {
            token: self.current_token(),
            login_origin: self.current_login_origin(),
        }
    }
}

/// Session with values fixed at construction, typically read from config.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
    login_origin: Option<LoginOrigin>,
}

impl StaticSession {
    pub fn new(token: Option<String>, login_origin: Option<LoginOrigin>) -> Self {
        Self {
            token,
            login_origin,
        }
    }
}

impl AuthSession for StaticSession {
    fn current_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn current_login_origin(&self) -> Option<LoginOrigin> {
        self.login_origin.clone()
    }
}

/// Returns the `Authorization` value for the context, or `None` when the
/// request must go out untouched.
pub fn authorization_value(ctx: &RequestContext) -> Option<String> {
    let token = ctx.token.as_deref()?;
    let scheme = match &ctx.login_origin {
        None => "Bearer",
        Some(LoginOrigin::Github) => "token",
        Some(LoginOrigin::StackOverflow) => "stack",
        Some(LoginOrigin::Other(_)) => return None,
    };
    Some(format!("{scheme} {token}"))
}

pub fn inject_auth_header(
    request: RequestBuilder,
    ctx: &RequestContext,
) -> Result<RequestBuilder, QueryError> {
    let Some(raw) = authorization_value(ctx) else {
        return Ok(request);
    };

    let mut value = HeaderValue::from_str(&raw).map_err(|_| QueryError::InvalidHeader {
        origin: ctx
            .login_origin
            .as_ref()
            .map(|origin| origin.to_string())
            .unwrap_or_else(|| "local".to_string()),
    })?;
    value.set_sensitive(true);

    Ok(request.header(AUTHORIZATION, value))
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
