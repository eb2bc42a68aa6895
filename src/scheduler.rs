use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use log::{debug, error, info};
use tokio::time::sleep;

use crate::client::Booker;
use crate::error::DuenessError;
use crate::model::BookingRequest;
use crate::store::{GymBookerState, RequestStore};

/// Pause between ticks, to avoid hammering the vendor site.
const TICK: Duration = Duration::from_millis(500);
/// Back-off after a failed refresh (state reload or auth).
const REFRESH_BACKOFF: Duration = Duration::from_secs(10);
/// Back-off after a per-request due-ness check failure.
const DUENESS_BACKOFF: Duration = Duration::from_secs(5);
/// Pacing between consecutive booking submissions within one tick.
const PACING: Duration = Duration::from_secs(1);

/// The gym's clock: Asia/Singapore, UTC+8 year-round (no DST).
fn target_zone() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&target_zone())
}

/// The wall-clock instant at which a request becomes bookable: the class's
/// own listed time, in the gym's time zone, compared directly (the vendor
/// opens each slot exactly at the class time one day ahead, so no offset is
/// applied here).
pub fn booking_opens_at(request: &BookingRequest) -> Result<DateTime<FixedOffset>, DuenessError> {
    let cleaned: String = request
        .time_of_day
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let raw = format!("{}-{} {}", request.year, request.day_of_year, cleaned);
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%j %I:%M%p").map_err(|source| {
        DuenessError::BadTimeFormat {
            raw: raw.clone(),
            source,
        }
    })?;
    // A fixed offset maps every local time to exactly one instant.
    Ok(naive.and_local_timezone(target_zone()).unwrap())
}

/// Whether a request should be submitted now: never for terminally resolved
/// requests, otherwise once `now` reaches the slot's opening instant.
/// Monotonic in `now` — a request that is due stays due.
pub fn should_make_request(
    request: &BookingRequest,
    now: DateTime<FixedOffset>,
) -> Result<bool, DuenessError> {
    if request.is_resolved_terminal() {
        debug!("skipping request as code is {:?}", request.result_code);
        return Ok(false);
    }
    Ok(now >= booking_opens_at(request)?)
}

fn needs_refresh(
    last_refreshed: Option<DateTime<FixedOffset>>,
    have_state: bool,
    auth_valid: bool,
    now: DateTime<FixedOffset>,
) -> bool {
    let Some(last) = last_refreshed else {
        return true;
    };
    // State and auth are refreshed at most once per minute.
    !have_state || !auth_valid || now - TimeDelta::minutes(1) > last
}

/// The top-level poll loop. Strictly sequential: one request, one HTTP round
/// trip at a time, so the shared session is only ever touched by one caller.
pub struct Scheduler<B: Booker> {
    booker: B,
    store: RequestStore,
}

impl<B: Booker> Scheduler<B> {
    pub fn new(booker: B, store: RequestStore) -> Self {
        Self { booker, store }
    }

    /// Runs indefinitely. Every error is logged and retried on a later tick;
    /// nothing here is fatal once the loop is up.
    pub async fn run(&mut self) {
        let mut last_refreshed: Option<DateTime<FixedOffset>> = None;
        let mut state: Option<GymBookerState> = None;
        let mut auth_valid = false;

        loop {
            sleep(TICK).await;

            if needs_refresh(last_refreshed, state.is_some(), auth_valid, now()) {
                debug!("refreshing (last refresh was {last_refreshed:?})");

                match self.store.load() {
                    Ok(loaded) => {
                        debug!("loaded state with {} requests", loaded.requests.len());
                        state = Some(loaded);
                    }
                    Err(e) => {
                        error!("err loading state: {e}");
                        sleep(REFRESH_BACKOFF).await;
                        continue;
                    }
                }

                if let Err(e) = self.booker.ensure_authenticated().await {
                    error!("err doing auth if required: {e}");
                    auth_valid = false;
                    sleep(REFRESH_BACKOFF).await;
                    continue;
                }
                auth_valid = true;
                last_refreshed = Some(now());
            } else {
                debug!("no refresh required (last: {last_refreshed:?})");
            }

            let Some(state) = state.as_mut() else {
                continue;
            };
            self.process_due_requests(state).await;
        }
    }

    /// One pass over the request list: book everything that is due, record
    /// and persist each definitive outcome before moving on. Errors skip the
    /// request for this pass only.
    pub async fn process_due_requests(&mut self, state: &mut GymBookerState) {
        for i in 0..state.requests.len() {
            let due = match should_make_request(&state.requests[i], now()) {
                Ok(due) => due,
                Err(e) => {
                    error!("err checking if should make req: {e}");
                    sleep(DUENESS_BACKOFF).await;
                    continue;
                }
            };
            if !due {
                continue;
            }

            info!("starting booking request {:?}", state.requests[i]);
            let code = match self.booker.book(&state.requests[i]).await {
                Ok(code) => code,
                Err(e) => {
                    error!("err booking request {:?}: {e}", state.requests[i]);
                    continue;
                }
            };
            info!("booking request {:?} result is {code:?}", state.requests[i]);

            if let Err(e) = self.store.record_result(state, i, code) {
                error!("err persisting state: {e}");
            }

            sleep(PACING).await;
        }
    }
}
