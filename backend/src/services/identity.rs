//! Request identity helpers built on the signed session token.
//!
//! Both entry points share one contract: they never return an error and
//! never panic. A missing token, a failed decode, or an unreachable
//! identity store all collapse to "no identity" so callers can treat the
//! request as anonymous.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use sqlx::PgPool;

use crate::models::user::UserRole;
use crate::repositories::user as user_repo;
use crate::utils::cookies::extract_session_token;
use crate::utils::jwt::decode_session_token;

/// Minimal caller identity resolved from the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub role: UserRole,
}

/// Result of the admin role check. Callers must treat `is_admin == false`
/// or a missing `user_id` as an unconditional 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCheck {
    pub is_admin: bool,
    pub user_id: Option<String>,
}

impl AdminCheck {
    fn anonymous() -> Self {
        Self {
            is_admin: false,
            user_id: None,
        }
    }
}

/// Lookup used when the token carries no usable role claim.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_identity(&self, user_id: &str) -> anyhow::Result<Option<Identity>>;
}

#[derive(Clone)]
pub struct SqlIdentityStore {
    pool: PgPool,
}

impl SqlIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for SqlIdentityStore {
    async fn find_identity(&self, user_id: &str) -> anyhow::Result<Option<Identity>> {
        let user = user_repo::find_by_id(&self.pool, user_id).await?;
        Ok(user.map(|user| Identity {
            id: user.id,
            role: user.role,
        }))
    }
}

/// Token Reader: decodes the session token from cookies or the
/// `Authorization` header without touching the store when the role claim
/// is usable (fast path). Tokens minted by older issuance paths omit the
/// role claim; those resolve through `store` instead.
pub async fn resolve_identity(
    headers: &HeaderMap,
    secret: &str,
    store: &dyn IdentityStore,
) -> Option<Identity> {
    let token = token_from_headers(headers)?;
    let claims = decode_session_token(&token, secret).ok()?;
    if claims.sub.is_empty() {
        return None;
    }

    if let Some(role) = claims.role.as_deref().and_then(UserRole::parse) {
        return Some(Identity {
            id: claims.sub,
            role,
        });
    }

    match store.find_identity(&claims.sub).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::debug!(error = ?err, "Identity store lookup failed; treating as anonymous");
            None
        }
    }
}

/// Role Verifier: answers "is this caller an admin" from the signed token
/// alone; no store access. The role claim is parsed tolerantly, so tokens
/// carrying `ADMIN` or `Admin` from older issuance paths still verify.
pub fn verify_admin(headers: &HeaderMap, secret: &str) -> AdminCheck {
    let Some(token) = token_from_headers(headers) else {
        return AdminCheck::anonymous();
    };
    let Ok(claims) = decode_session_token(&token, secret) else {
        return AdminCheck::anonymous();
    };
    if claims.sub.is_empty() {
        return AdminCheck::anonymous();
    }

    let is_admin = claims.role.as_deref().and_then(UserRole::parse) == Some(UserRole::Admin);
    AdminCheck {
        is_admin,
        user_id: Some(claims.sub),
    }
}

/// Session token from the cookie header (preferred) or a bearer header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_session_token);
    if from_cookie.is_some() {
        return from_cookie;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .map(|token| token.to_string())
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        let token = rest.trim_start();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use crate::utils::cookies::SESSION_COOKIE_NAME;
    use crate::utils::jwt::{encode_session_claims, SessionClaims};

    const SECRET: &str = "identity-test-secret";

    struct StubStore {
        identity: Option<Identity>,
    }

    #[async_trait]
    impl IdentityStore for StubStore {
        async fn find_identity(&self, _user_id: &str) -> anyhow::Result<Option<Identity>> {
            Ok(self.identity.clone())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl IdentityStore for FailingStore {
        async fn find_identity(&self, _user_id: &str) -> anyhow::Result<Option<Identity>> {
            Err(anyhow::anyhow!("store unreachable"))
        }
    }

    fn token_with_role(role: Option<&str>) -> (String, String) {
        let user = User::new(
            "agent@acrelist.test".into(),
            "hash".into(),
            "Agent".into(),
            crate::models::user::UserRole::Agent,
        );
        let mut claims = SessionClaims::new(&user, 1);
        claims.role = role.map(|r| r.to_string());
        (
            user.id,
            encode_session_claims(&claims, SECRET).expect("encode"),
        )
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{}={}", SESSION_COOKIE_NAME, token).parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn fast_path_skips_the_store() {
        let (user_id, token) = token_with_role(Some("agent"));
        let headers = cookie_headers(&token);
        // A failing store proves the fast path never consulted it.
        let identity = resolve_identity(&headers, SECRET, &FailingStore)
            .await
            .expect("identity");
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.role, UserRole::Agent);
    }

    #[tokio::test]
    async fn fallback_resolves_missing_role_through_store() {
        let (user_id, token) = token_with_role(None);
        let headers = cookie_headers(&token);
        let store = StubStore {
            identity: Some(Identity {
                id: user_id.clone(),
                role: UserRole::Agent,
            }),
        };
        let identity = resolve_identity(&headers, SECRET, &store)
            .await
            .expect("identity");
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.role, UserRole::Agent);
    }

    #[tokio::test]
    async fn fast_path_and_fallback_agree() {
        let (user_id, direct_token) = token_with_role(Some("agent"));
        let (_, bare_token) = token_with_role(None);
        let store = StubStore {
            identity: Some(Identity {
                id: user_id.clone(),
                role: UserRole::Agent,
            }),
        };

        let direct = resolve_identity(&cookie_headers(&direct_token), SECRET, &store)
            .await
            .expect("direct identity");
        let via_store = resolve_identity(&cookie_headers(&bare_token), SECRET, &store)
            .await
            .expect("fallback identity");
        assert_eq!(direct.role, via_store.role);
    }

    #[tokio::test]
    async fn store_failure_collapses_to_anonymous() {
        let (_, token) = token_with_role(None);
        let headers = cookie_headers(&token);
        assert!(resolve_identity(&headers, SECRET, &FailingStore)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn garbage_token_collapses_to_anonymous() {
        let headers = cookie_headers("not.a.jwt");
        let store = StubStore { identity: None };
        assert!(resolve_identity(&headers, SECRET, &store).await.is_none());
    }

    #[tokio::test]
    async fn bearer_header_is_accepted() {
        let (user_id, token) = token_with_role(Some("writer"));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let identity = resolve_identity(&headers, SECRET, &StubStore { identity: None })
            .await
            .expect("identity");
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.role, UserRole::Writer);
    }

    #[test]
    fn verify_admin_accepts_legacy_casings() {
        for role in ["admin", "ADMIN", "Admin"] {
            let (user_id, token) = token_with_role(Some(role));
            let check = verify_admin(&cookie_headers(&token), SECRET);
            assert!(check.is_admin, "role {role:?} should verify");
            assert_eq!(check.user_id.as_deref(), Some(user_id.as_str()));
        }
    }

    #[test]
    fn verify_admin_rejects_other_roles_and_absent_role() {
        for role in [Some("agent"), Some("WRITER"), None] {
            let (_, token) = token_with_role(role);
            let check = verify_admin(&cookie_headers(&token), SECRET);
            assert!(!check.is_admin, "role {role:?} should not verify");
            assert!(check.user_id.is_some());
        }
    }

    #[test]
    fn verify_admin_without_token_is_anonymous() {
        let check = verify_admin(&HeaderMap::new(), SECRET);
        assert!(!check.is_admin);
        assert!(check.user_id.is_none());
    }
}
