use crate::error::SubmitError;
use crate::model::{BookableSlot, BookingResultCode};
use crate::requests::VendorApi;
use crate::session::Session;

/// Vendor's exact wording when the weekly attendance cap is hit. The
/// registration endpoint answers 200 either way; only the body tells the
/// outcomes apart.
const LIMIT_REACHED_MARKER: &str =
    "membership plan has exceeded its attendance limit of 4 per week";

/// Submit the registration form for a slot the matcher resolved. Transport
/// failures (including any non-200 status) surface as errors, never as a
/// result code.
pub async fn submit(
    api: &VendorApi,
    session: &Session,
    slot: &BookableSlot,
) -> Result<BookingResultCode, SubmitError> {
    let body = api.submit_registration(session, slot).await?;
    Ok(classify_registration_response(&body))
}

fn classify_registration_response(body: &str) -> BookingResultCode {
    if body.contains(LIMIT_REACHED_MARKER) {
        BookingResultCode::LimitReached
    } else {
        BookingResultCode::Booked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_message_classifies_as_limit_reached() {
        let body = "<p>Your membership plan has exceeded its attendance limit of 4 per week.</p>";
        assert_eq!(
            classify_registration_response(body),
            BookingResultCode::LimitReached
        );
    }

    #[test]
    fn any_other_ok_response_classifies_as_booked() {
        assert_eq!(
            classify_registration_response("<p>See you at the gym!</p>"),
            BookingResultCode::Booked
        );
        assert_eq!(classify_registration_response(""), BookingResultCode::Booked);
    }
}
