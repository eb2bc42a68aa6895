use async_trait::async_trait;
use log::info;

use crate::auth::{AuthManager, Credentials};
use crate::booking;
use crate::debug::DebugSink;
use crate::error::{AuthError, BookError};
use crate::model::{BookingRequest, BookingResultCode, ScheduleEntry};
use crate::requests::VendorApi;
use crate::schedule;

/// The narrow seam between the scheduler and the vendor site, so the whole
/// HTTP/scraping stack can be mocked in tests.
#[async_trait]
pub trait Booker {
    /// Re-validate the session, logging in again if needed.
    async fn ensure_authenticated(&mut self) -> Result<(), AuthError>;

    /// One full booking attempt: authenticate, locate the slot on the
    /// schedule page, submit the registration form. Errors leave the
    /// request unresolved so a later tick retries it.
    async fn book(&mut self, request: &BookingRequest) -> Result<BookingResultCode, BookError>;
}

/// The production client against the PushPress members site.
pub struct PushPressClient {
    api: VendorApi,
    auth: AuthManager,
}

impl PushPressClient {
    pub fn new(credentials: Credentials, debug: DebugSink) -> anyhow::Result<Self> {
        Ok(Self {
            api: VendorApi::new(debug)?,
            auth: AuthManager::new(credentials),
        })
    }
}

#[async_trait]
impl Booker for PushPressClient {
    async fn ensure_authenticated(&mut self) -> Result<(), AuthError> {
        self.auth.ensure_authenticated(&self.api).await
    }

    async fn book(&mut self, request: &BookingRequest) -> Result<BookingResultCode, BookError> {
        self.auth.ensure_authenticated(&self.api).await?;

        let entry = schedule::find_slot(
            &self.api,
            self.auth.session(),
            request.year,
            request.day_of_year,
            &request.time_of_day,
        )
        .await?;
        info!("found schedule entry {entry:?}");

        match entry {
            ScheduleEntry::NotAvailable => Ok(BookingResultCode::NotAvailable),
            ScheduleEntry::Bookable(slot) => {
                Ok(booking::submit(&self.api, self.auth.session(), &slot).await?)
            }
        }
    }
}
