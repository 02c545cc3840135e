use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

pub const SESSION_COOKIE_NAME: &str = "session-token";
pub const SECURE_SESSION_COOKIE_NAME: &str = "__Secure-session-token";
pub const SESSION_COOKIE_PATH: &str = "/";

/// Name the session is issued under. The `__Secure-` prefix is only valid
/// on cookies that carry the Secure attribute.
pub fn session_cookie_name(options: CookieOptions) -> &'static str {
    if options.secure {
        SECURE_SESSION_COOKIE_NAME
    } else {
        SESSION_COOKIE_NAME
    }
}

pub fn build_session_cookie(value: &str, max_age: Duration, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
        session_cookie_name(options),
        value,
        SESSION_COOKIE_PATH,
        max_age.as_secs(),
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Rejection paths clear both names: a token may have been issued under
/// either depending on the deployment's `cookie_secure` setting.
pub fn clear_session_cookies(options: CookieOptions) -> [String; 2] {
    [
        build_clear_cookie(SESSION_COOKIE_NAME, options),
        build_clear_cookie(SECURE_SESSION_COOKIE_NAME, CookieOptions {
            secure: true,
            same_site: options.same_site,
        }),
    ]
}

fn build_clear_cookie(name: &str, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; HttpOnly; SameSite={}",
        name,
        SESSION_COOKIE_PATH,
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Reads the session token from a raw `Cookie` header, preferring the
/// secure name when both are present.
pub fn extract_session_token(header: &str) -> Option<String> {
    extract_cookie_value(header, SECURE_SESSION_COOKIE_NAME)
        .or_else(|| extract_cookie_value(header, SESSION_COOKIE_NAME))
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}
