//! Session lifecycle: login cookies, token extraction, teardown guard

use crate::error::{Error, Result};

/// Name of the cookie that identifies an authenticated session
pub const SESSION_COOKIE: &str = "pxt-session-cookie";

/// Cookies below this `Max-Age` are expiring duplicates, not live tokens.
///
/// The server answers a login with two `pxt-session-cookie` headers: one
/// clearing the previous token (`Max-Age=0`) and one carrying the new one.
const SESSION_MIN_MAX_AGE: i64 = 30;

/// One cookie captured from a `Set-Cookie` response header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub max_age: Option<i64>,
}

impl SessionCookie {
    /// Parse a single `Set-Cookie` header line.
    ///
    /// Only the cookie pair and the `Max-Age` attribute are retained; the
    /// probe never persists cookies, so path/expiry/security attributes
    /// are irrelevant to it.
    pub fn parse(header: &str) -> Option<SessionCookie> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        if name.is_empty() {
            return None;
        }

        let max_age = parts
            .filter_map(|attr| attr.trim().split_once('='))
            .find(|(key, _)| key.eq_ignore_ascii_case("max-age"))
            .and_then(|(_, v)| v.trim().parse::<i64>().ok());

        Some(SessionCookie {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
            max_age,
        })
    }

    /// `name=value` form used in a `Cookie` request header
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    fn is_live_session_token(&self) -> bool {
        self.name == SESSION_COOKIE && self.max_age.map_or(true, |age| age >= SESSION_MIN_MAX_AGE)
    }
}

/// An established session: the full login cookie set plus the extracted
/// session token, with a guard so logout fires at most once.
#[derive(Debug)]
pub struct Session {
    cookies: Vec<SessionCookie>,
    token: SessionCookie,
    logged_out: bool,
}

impl Session {
    /// Build a session from the cookies of a login response, in response
    /// order. Fails with [`Error::SessionMissing`] when no live session
    /// cookie is present.
    pub fn from_login_cookies(cookies: Vec<SessionCookie>) -> Result<Session> {
        // A Max-Age of zero (or less) is a deletion, not a cookie; a jar
        // would never retain it.
        let cookies: Vec<SessionCookie> = cookies
            .into_iter()
            .filter(|cookie| cookie.max_age.map_or(true, |age| age > 0))
            .collect();

        // Later Set-Cookie headers win, per cookie semantics.
        let token = cookies
            .iter()
            .rev()
            .find(|cookie| cookie.is_live_session_token())
            .cloned()
            .ok_or(Error::SessionMissing)?;

        Ok(Session {
            cookies,
            token,
            logged_out: false,
        })
    }

    /// Opaque session token value
    pub fn token(&self) -> &str {
        &self.token.value
    }

    /// `Cookie` header carrying only the session cookie
    pub fn session_cookie_header(&self) -> String {
        self.token.pair()
    }

    /// `Cookie` header carrying the complete original login cookie set
    pub fn full_cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(SessionCookie::pair)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn is_logged_out(&self) -> bool {
        self.logged_out
    }

    pub fn mark_logged_out(&mut self) {
        self.logged_out = true;
    }
}
