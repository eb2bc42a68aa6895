use serde::{Deserialize, Serialize};

/// Outcome of one definitive booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingResultCode {
    Booked,
    Full,
    NotAvailable,
    LimitReached,
}

impl BookingResultCode {
    /// Terminal codes are never re-submitted. `NotAvailable` is deliberately
    /// not terminal: the vendor page's bookable set changes as the booking
    /// window opens, so those requests stay eligible for later ticks.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingResultCode::Booked
                | BookingResultCode::Full
                | BookingResultCode::LimitReached
        )
    }
}

/// One desired class instance. The slot identity (`year`, `day_of_year`,
/// `time_of_day`) is immutable; only `result_code` is ever mutated, by the
/// scheduler, after a booking attempt returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub year: i32,
    /// 1-366.
    pub day_of_year: u32,
    /// Vendor formatting, e.g. "6:00am" or "6:00 am".
    pub time_of_day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<BookingResultCode>,
}

impl BookingRequest {
    pub fn is_resolved_terminal(&self) -> bool {
        self.result_code.is_some_and(|code| code.is_terminal())
    }
}

/// What the schedule page says about the requested slot. Scraped per booking
/// attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleEntry {
    /// The row exists but its modal target is the `#` sentinel: structurally
    /// present, not bookable.
    NotAvailable,
    Bookable(BookableSlot),
}

/// The identifiers the registration form needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookableSlot {
    pub subscription_id: String,
    pub calendar_id: String,
    pub csrf: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_codes_are_booked_full_and_limit_reached() {
        assert!(BookingResultCode::Booked.is_terminal());
        assert!(BookingResultCode::Full.is_terminal());
        assert!(BookingResultCode::LimitReached.is_terminal());
        assert!(!BookingResultCode::NotAvailable.is_terminal());
    }

    #[test]
    fn unresolved_request_is_not_terminal() {
        let request = BookingRequest {
            year: 2024,
            day_of_year: 200,
            time_of_day: "6:00am".to_string(),
            result_code: None,
        };
        assert!(!request.is_resolved_terminal());
    }

    #[test]
    fn request_round_trips_without_result_code() {
        let request = BookingRequest {
            year: 2024,
            day_of_year: 200,
            time_of_day: "6:00am".to_string(),
            result_code: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("resultCode"));
        let back: BookingRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn request_round_trips_with_result_code() {
        let request = BookingRequest {
            year: 2025,
            day_of_year: 17,
            time_of_day: "7:30 pm".to_string(),
            result_code: Some(BookingResultCode::LimitReached),
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: BookingRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
