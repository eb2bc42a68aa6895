use log::{debug, info};
use reqwest::header::{HeaderMap, SET_COOKIE};
use scraper::{Html, Selector};

use crate::error::AuthError;
use crate::requests::VendorApi;
use crate::session::Session;

/// The literal body the login endpoint returns on success; anything else is
/// a rejected login.
const LOGIN_SUCCESS_MARKER: &str = r#"{"status":200,"subdomain":"mvrck"}"#;

/// Rendered only by the authenticated layout of the members page.
const ACCOUNT_MARKER_SELECTOR: &str = "div.account.pull-right";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub client_id: String,
    pub password: String,
}

/// Owns the session cookie and performs at most one full login cycle per
/// `ensure_authenticated` call. Back-off and retry on failure belong to the
/// scheduler, not here.
pub struct AuthManager {
    credentials: Credentials,
    session: Session,
}

impl AuthManager {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            session: Session::new(),
        }
    }

    /// The current session, passed into every vendor call the booking
    /// client makes.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Probe, log in if the probe fails, then probe again. A login that the
    /// vendor accepts but that still fails the probe is an error, not a
    /// success.
    pub async fn ensure_authenticated(&mut self, api: &VendorApi) -> Result<(), AuthError> {
        debug!("checking auth");
        if self.has_auth(api).await? {
            debug!("auth still ok");
            return Ok(());
        }

        info!("doing auth");
        self.login(api).await?;

        debug!("checking auth after successful auth");
        if !self.has_auth(api).await? {
            return Err(AuthError::LoginNotEffective);
        }
        info!("auth ok");
        Ok(())
    }

    /// Liveness probe. Short-circuits to false without any HTTP call when no
    /// session cookie is held at all.
    pub async fn has_auth(&self, api: &VendorApi) -> Result<bool, AuthError> {
        if self.session.is_anonymous() {
            return Ok(false);
        }
        let body = api.fetch_members_page(&self.session).await?;
        Ok(self.interpret_probe(&body))
    }

    /// What the probe concludes from a members page body: authenticated only
    /// when a session cookie is held and the page renders the account
    /// marker. A held cookie with an anonymous layout means the session
    /// expired server-side.
    fn interpret_probe(&self, body: &str) -> bool {
        !self.session.is_anonymous() && page_has_account_marker(body)
    }

    async fn login(&mut self, api: &VendorApi) -> Result<(), AuthError> {
        let response = api.fetch_login_page().await?;
        let cookie =
            session_cookie_from_headers(&response.headers).ok_or(AuthError::NoSessionCookie)?;
        debug!("new session cookie is {cookie}");
        self.session.set_cookie(cookie);

        let body = api.submit_login(&self.session, &self.credentials).await?;
        if !body.contains(LOGIN_SUCCESS_MARKER) {
            return Err(AuthError::LoginRejected { body });
        }
        Ok(())
    }
}

fn page_has_account_marker(html: &str) -> bool {
    let document = Html::parse_document(html);
    let account_marker = Selector::parse(ACCOUNT_MARKER_SELECTOR).unwrap();
    document.select(&account_marker).next().is_some()
}

fn session_cookie_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session_cookie_from_header)
}

fn session_cookie_from_header(header: &str) -> Option<String> {
    header
        .split("; ")
        .find(|part| part.contains("PHPSESSID="))
        .map(|part| part.trim().to_string())
}
