use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::user::User;

/// Claims carried by the signed session token. The token is stateless:
/// validity is a function of the signature and these claims alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject identifier (user id).
    pub sub: String,
    /// Email of the subject, for display without a lookup.
    pub email: String,
    /// Canonical snake_case role. Optional because some historical issuance
    /// paths omitted it; readers fall back to the identity store then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Epoch millis of the subject's most recent authenticated activity.
    pub last_activity: i64,
    /// Epoch millis captured once when the issuing process booted. A token
    /// whose marker differs from the live process predates a restart.
    pub server_start: i64,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);
        Self {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: Some(user.role.as_str().to_string()),
            last_activity: now.timestamp_millis(),
            server_start: server_start_epoch_ms(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Returns a copy stamped with the current time as last activity and a
    /// renewed expiry, bound to the live process epoch.
    pub fn refreshed(&self, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);
        Self {
            sub: self.sub.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            last_activity: now.timestamp_millis(),
            server_start: server_start_epoch_ms(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn matches_server_epoch(&self, epoch_ms: i64) -> bool {
        self.server_start == epoch_ms
    }

    /// `true` when more than `threshold_ms` elapsed since the last-activity
    /// claim, measured at `now_ms`.
    pub fn idle_longer_than(&self, threshold_ms: i64, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.last_activity) > threshold_ms
    }
}

/// Process-wide boot marker, captured once. Embedded into every issued token
/// and compared on every gate pass; a restart therefore signs out everyone.
pub fn server_start_epoch_ms() -> i64 {
    static SERVER_START: OnceLock<i64> = OnceLock::new();
    *SERVER_START.get_or_init(|| Utc::now().timestamp_millis())
}

pub fn issue_session_token(
    user: &User,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    encode_session_claims(&SessionClaims::new(user, expiration_hours), secret)
}

pub fn encode_session_claims(claims: &SessionClaims, secret: &str) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn decode_session_token(token: &str, secret: &str) -> anyhow::Result<SessionClaims> {
    let validation = Validation::default();
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn test_user() -> User {
        User::new(
            "agent@acrelist.test".into(),
            "hash".into(),
            "Test Agent".into(),
            UserRole::Agent,
        )
    }

    #[test]
    fn issue_and_decode_roundtrip() {
        let user = test_user();
        let token = issue_session_token(&user, "secret", 1).expect("issue token");
        let claims = decode_session_token(&token, "secret").expect("decode token");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role.as_deref(), Some("agent"));
        assert_eq!(claims.server_start, server_start_epoch_ms());
    }

    #[test]
    fn decode_with_wrong_secret_fails() {
        let token = issue_session_token(&test_user(), "secret-a", 1).expect("issue token");
        assert!(decode_session_token(&token, "secret-b").is_err());
    }

    #[test]
    fn decode_rejects_expired_token() {
        let mut claims = SessionClaims::new(&test_user(), 1);
        claims.iat = Utc::now().timestamp() - 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = encode_session_claims(&claims, "secret").expect("encode");
        assert!(decode_session_token(&token, "secret").is_err());
    }

    #[test]
    fn role_claim_is_optional_on_decode() {
        let mut claims = SessionClaims::new(&test_user(), 1);
        claims.role = None;
        let token = encode_session_claims(&claims, "secret").expect("encode");
        let decoded = decode_session_token(&token, "secret").expect("decode");
        assert!(decoded.role.is_none());
        assert_eq!(decoded.sub, claims.sub);
    }

    #[test]
    fn idle_check_uses_strict_threshold() {
        let claims = SessionClaims::new(&test_user(), 1);
        let threshold = 10 * 60 * 1000;
        let nine_minutes_later = claims.last_activity + 9 * 60 * 1000;
        let eleven_minutes_later = claims.last_activity + 11 * 60 * 1000;
        assert!(!claims.idle_longer_than(threshold, nine_minutes_later));
        assert!(claims.idle_longer_than(threshold, eleven_minutes_later));
    }

    #[test]
    fn refreshed_claims_advance_last_activity() {
        let mut claims = SessionClaims::new(&test_user(), 1);
        claims.last_activity -= 5 * 60 * 1000;
        let refreshed = claims.refreshed(1);
        assert!(refreshed.last_activity > claims.last_activity);
        assert_eq!(refreshed.sub, claims.sub);
        assert_eq!(refreshed.server_start, server_start_epoch_ms());
    }
}
