//! Authorization for the order API
//!
//! Identity resolution and the access policy are kept apart:
//! - an [`AuthProvider`] turns request headers into an [`AuthContext`]
//! - [`permit`] / [`authorize`] decide whether that context may run an
//!   [`Operation`]
//!
//! Token issuance is not handled here; the provider only validates tokens
//! that were issued elsewhere.

use crate::core::error::AccessError;
use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use std::collections::HashMap;
use std::fmt;

/// Identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated user without elevated privilege
    User { username: String },

    /// Administrator, allowed to run every operation
    Admin { username: String },

    /// No credentials supplied
    Anonymous,
}

impl AuthContext {
    /// Build a context from the two identity flags
    pub fn from_flags(username: impl Into<String>, is_authenticated: bool, is_admin: bool) -> Self {
        match (is_authenticated, is_admin) {
            (false, _) => AuthContext::Anonymous,
            (true, false) => AuthContext::User {
                username: username.into(),
            },
            (true, true) => AuthContext::Admin {
                username: username.into(),
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthContext::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthContext::User { username } | AuthContext::Admin { username } => Some(username),
            AuthContext::Anonymous => None,
        }
    }
}

/// Operations subject to the access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Notify,
}

impl Operation {
    /// The policy guarding this operation
    pub fn policy(self) -> AuthPolicy {
        match self {
            Operation::Create => AuthPolicy::Public,
            Operation::Read | Operation::Update | Operation::Delete | Operation::Notify => {
                AuthPolicy::AdminOnly
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Notify => "notify",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Admin only
    AdminOnly,
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,
            AuthPolicy::AdminOnly => context.is_admin(),
        }
    }
}

/// Whether `caller` may run `operation`
pub fn permit(operation: Operation, caller: &AuthContext) -> bool {
    operation.policy().check(caller)
}

/// Like [`permit`], but explains a refusal
///
/// Anonymous callers get [`AccessError::AuthenticationRequired`]; authenticated
/// callers without the privilege get [`AccessError::PermissionDenied`].
pub fn authorize(operation: Operation, caller: &AuthContext) -> Result<(), AccessError> {
    if permit(operation, caller) {
        return Ok(());
    }

    if caller.is_authenticated() {
        Err(AccessError::PermissionDenied {
            operation: operation.to_string(),
        })
    } else {
        Err(AccessError::AuthenticationRequired)
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from request headers
    ///
    /// Absent credentials resolve to [`AuthContext::Anonymous`]; credentials that
    /// are present but unusable are an error.
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, AccessError>;
}

/// Resolves bearer tokens against a fixed table
#[derive(Debug, Clone, Default)]
pub struct TokenAuthProvider {
    tokens: HashMap<String, AuthContext>,
}

impl TokenAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an identity, replacing any previous owner
    pub fn with_token(mut self, token: impl Into<String>, context: AuthContext) -> Self {
        self.tokens.insert(token.into(), context);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Look a raw token up
    pub fn resolve(&self, token: &str) -> Result<AuthContext, AccessError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AccessError::InvalidToken {
                reason: "token is unknown or has been revoked".to_string(),
            })
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, AccessError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(AuthContext::Anonymous);
        };

        let value = value.to_str().map_err(|_| AccessError::InvalidToken {
            reason: "authorization header is not valid ASCII".to_string(),
        })?;

        let token = bearer_token(value).ok_or_else(|| AccessError::InvalidToken {
            reason: "expected 'Bearer <token>'".to_string(),
        })?;

        self.resolve(token)
    }
}

/// Extract the token from a `Bearer <token>` header value
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user() -> AuthContext {
        AuthContext::User {
            username: "user".to_string(),
        }
    }

    fn admin() -> AuthContext {
        AuthContext::Admin {
            username: "admin".to_string(),
        }
    }

    #[test]
    fn test_create_is_open_to_everyone() {
        assert!(permit(Operation::Create, &AuthContext::Anonymous));
        assert!(permit(Operation::Create, &user()));
        assert!(permit(Operation::Create, &admin()));
    }

    #[test]
    fn test_restricted_operations_need_admin() {
        for op in [
            Operation::Read,
            Operation::Update,
            Operation::Delete,
            Operation::Notify,
        ] {
            assert!(!permit(op, &AuthContext::Anonymous), "{op} anonymous");
            assert!(!permit(op, &user()), "{op} user");
            assert!(permit(op, &admin()), "{op} admin");
        }
    }

    #[test]
    fn test_authorize_distinguishes_refusals() {
        assert_eq!(
            authorize(Operation::Read, &AuthContext::Anonymous),
            Err(AccessError::AuthenticationRequired)
        );
        assert_eq!(
            authorize(Operation::Read, &user()),
            Err(AccessError::PermissionDenied {
                operation: "read".to_string()
            })
        );
        assert_eq!(authorize(Operation::Delete, &admin()), Ok(()));
    }

    #[test]
    fn test_policy_check() {
        assert!(AuthPolicy::Public.check(&AuthContext::Anonymous));
        assert!(!AuthPolicy::AdminOnly.check(&user()));
        assert!(AuthPolicy::AdminOnly.check(&admin()));
    }

    #[test]
    fn test_context_from_flags() {
        assert_eq!(AuthContext::from_flags("x", false, true), AuthContext::Anonymous);
        assert!(!AuthContext::from_flags("x", true, false).is_admin());
        assert!(AuthContext::from_flags("x", true, true).is_admin());
        assert_eq!(admin().username(), Some("admin"));
        assert_eq!(AuthContext::Anonymous.username(), None);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let provider = TokenAuthProvider::new().with_token("t", admin());
        let ctx = provider
            .extract_context(&HeaderMap::new())
            .await
            .expect("anonymous");
        assert_eq!(ctx, AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_known_token_resolves() {
        let provider = TokenAuthProvider::new().with_token("secret", admin());
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));

        let ctx = provider.extract_context(&headers).await.expect("admin");
        assert!(ctx.is_admin());
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let provider = TokenAuthProvider::new().with_token("secret", admin());
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer invalid-token"),
        );

        let err = provider.extract_context(&headers).await.unwrap_err();
        assert!(matches!(err, AccessError::InvalidToken { .. }));
    }
}
