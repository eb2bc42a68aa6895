use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};

use crate::auth::Credentials;
use crate::debug::{BodyKind, DebugSink};
use crate::error::TransportError;
use crate::model::BookableSlot;
use crate::session::Session;

const URL_GET_LOGIN: &str = "https://members.pushpress.com/login";
const URL_MEMBERS: &str = "https://mvrck.members.pushpress.com";
const URL_POST_AUTH: &str = "https://mvrck.members.pushpress.com/login/auth";
const URL_GET_SCHEDULE: &str = "https://mvrck.members.pushpress.com/schedule/index";
const URL_POST_REGISTER: &str = "https://mvrck.members.pushpress.com/schedule/registerClass";

// A slow vendor response would otherwise stall every pending request behind
// this one, since the loop is strictly sequential.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Headers plus body of a completed (status 200) exchange. The headers are
/// only inspected by the auth manager, to capture the session cookie the
/// login page issues.
pub struct VendorResponse {
    pub headers: HeaderMap,
    pub body: String,
}

/// The shared HTTP client for the five fixed vendor endpoints. Every call
/// goes through one execute path that feeds the debug sink and raises any
/// non-200 status as a transport error.
pub struct VendorApi {
    http: Client,
    debug: DebugSink,
}

impl VendorApi {
    pub fn new(debug: DebugSink) -> anyhow::Result<Self> {
        let http = ClientBuilder::new().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, debug })
    }

    /// Anonymous GET of the login page; the `Set-Cookie` response headers
    /// carry the fresh session cookie.
    pub async fn fetch_login_page(&self) -> Result<VendorResponse, TransportError> {
        let request = self.http.get(URL_GET_LOGIN);
        self.execute(request, BodyKind::Html).await
    }

    /// The authenticated-only landing page, used as the liveness probe.
    pub async fn fetch_members_page(&self, session: &Session) -> Result<String, TransportError> {
        let request = with_session(self.http.get(URL_MEMBERS), session);
        Ok(self.execute(request, BodyKind::Html).await?.body)
    }

    pub async fn submit_login(
        &self,
        session: &Session,
        credentials: &Credentials,
    ) -> Result<String, TransportError> {
        let form = [
            ("username", credentials.username.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let request = with_session(self.http.post(URL_POST_AUTH), session).form(&form);
        Ok(self.execute(request, BodyKind::Json).await?.body)
    }

    /// The schedule page for one day, e.g. `/schedule/index/172/2020`.
    pub async fn fetch_schedule_page(
        &self,
        session: &Session,
        day_of_year: u32,
        year: i32,
    ) -> Result<String, TransportError> {
        let url = format!("{URL_GET_SCHEDULE}/{day_of_year}/{year}");
        let request = with_session(self.http.get(url), session);
        Ok(self.execute(request, BodyKind::Html).await?.body)
    }

    pub async fn submit_registration(
        &self,
        session: &Session,
        slot: &BookableSlot,
    ) -> Result<String, TransportError> {
        let form = [
            ("subscription-id", slot.subscription_id.as_str()),
            ("calendar-id", slot.calendar_id.as_str()),
            ("csrf", slot.csrf.as_str()),
        ];
        let request = with_session(self.http.post(URL_POST_REGISTER), session).form(&form);
        Ok(self.execute(request, BodyKind::Html).await?.body)
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        kind: BodyKind,
    ) -> Result<VendorResponse, TransportError> {
        let request = request.build()?;
        let url_path = request.url().path().to_string();
        let request_headers = request.headers().clone();

        let response = self.http.execute(request).await?;
        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response.text().await?;

        let errored = status != StatusCode::OK;
        if self.debug.should_dump(errored) {
            self.debug
                .dump(&url_path, &request_headers, &response_headers, &body, kind);
        }
        if errored {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: url_path,
            });
        }

        Ok(VendorResponse {
            headers: response_headers,
            body,
        })
    }
}

fn with_session(request: RequestBuilder, session: &Session) -> RequestBuilder {
    match session.cookie() {
        Some(cookie) => request.header(COOKIE, cookie),
        None => request,
    }
}
