use thiserror::Error;

/// A failed HTTP exchange with the vendor. Never recorded as a booking
/// outcome; the request stays pending and is retried on a later tick.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("got status code {status} in call to {path}")]
    Status { status: u16, path: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no cookie or no php session id in cookie found")]
    NoSessionCookie,
    #[error("unsuccessful login:\n{body}")]
    LoginRejected { body: String },
    #[error("login accepted but liveness probe still fails")]
    LoginNotEffective,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("could not find subscription id")]
    MissingSubscriptionId,
    #[error("could not find csrf token")]
    MissingCsrfToken,
    #[error("could not find schedule row list")]
    MissingRowList,
    #[error("could not find calendar id for modal {modal_id}")]
    MissingCalendarId { modal_id: String },
    /// Definitive for this attempt only: the page may list the entry once
    /// the booking window opens, so the scheduler must keep retrying.
    #[error("could not find entry for time {time_of_day}")]
    NoEntryForTime { time_of_day: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Composition of the three booking stages. The scheduler leaves the
/// request's result code untouched on any of these.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("err doing auth if required: {0}")]
    Auth(#[from] AuthError),
    #[error("err getting schedule entry: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("err registering: {0}")]
    Submit(#[from] SubmitError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DuenessError {
    #[error("unparseable slot time {raw:?}: {source}")]
    BadTimeFormat {
        raw: String,
        source: chrono::ParseError,
    },
}
