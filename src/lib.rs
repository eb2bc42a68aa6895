mod auth;
mod booking;
mod client;
mod config;
mod debug;
mod error;
mod model;
mod requests;
mod schedule;
mod scheduler;
mod session;
mod store;

pub use auth::{AuthManager, Credentials};
pub use client::{Booker, PushPressClient};
pub use config::BookerConfig;
pub use debug::DebugSink;
pub use error::{
    AuthError, BookError, DuenessError, ScheduleError, StoreError, SubmitError, TransportError,
};
pub use model::{BookableSlot, BookingRequest, BookingResultCode, ScheduleEntry};
pub use requests::VendorApi;
pub use schedule::{find_slot, match_slot_in_page};
pub use scheduler::{Scheduler, booking_opens_at, should_make_request};
pub use session::Session;
pub use store::{GymBookerState, RequestStore};
