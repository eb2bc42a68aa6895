use scraper::{ElementRef, Html, Selector};

use crate::error::ScheduleError;
use crate::model::{BookableSlot, ScheduleEntry};
use crate::requests::VendorApi;
use crate::session::Session;

/// The only class type the client books. The vendor renders the label in the
/// second `div.col-sm-2.td` cell of each row.
const CLASS_TYPE: &str = "Open Gym";

/// Fetch the schedule page for one day and locate the requested slot on it.
pub async fn find_slot(
    api: &VendorApi,
    session: &Session,
    year: i32,
    day_of_year: u32,
    time_of_day: &str,
) -> Result<ScheduleEntry, ScheduleError> {
    let body = api.fetch_schedule_page(session, day_of_year, year).await?;
    match_slot_in_page(&body, time_of_day)
}

/// Scan the rendered schedule page for the first Open Gym row whose displayed
/// time matches `time_of_day` (whitespace- and case-insensitively).
///
/// A matching row whose `data-target` is the `#` sentinel is present but not
/// bookable. A page with no matching row at all fails with `NoEntryForTime`,
/// which is definitive for this attempt only — the entry may appear once the
/// booking window opens.
pub fn match_slot_in_page(html: &str, time_of_day: &str) -> Result<ScheduleEntry, ScheduleError> {
    let document = Html::parse_document(html);

    let subscription_button = Selector::parse("button[subscription-id]").unwrap();
    let csrf_field = Selector::parse("#csrf").unwrap();
    let row_list = Selector::parse("div.tbody").unwrap();
    let class_type_cell = Selector::parse("div.col-sm-2.td").unwrap();
    let time_label = Selector::parse("span.hidden-xs").unwrap();
    let modal_button = Selector::parse("button[modal-id]").unwrap();

    // One subscription id is shared by every bookable row. Its absence means
    // the layout changed or the account has no active subscription.
    let subscription_id = document
        .select(&subscription_button)
        .filter_map(|elem| elem.value().attr("subscription-id"))
        .find(|id| !id.trim().is_empty())
        .ok_or(ScheduleError::MissingSubscriptionId)?
        .to_string();

    let csrf = document
        .select(&csrf_field)
        .next()
        .and_then(|elem| elem.value().attr("value"))
        .ok_or(ScheduleError::MissingCsrfToken)?
        .to_string();

    let rows = document
        .select(&row_list)
        .next()
        .ok_or(ScheduleError::MissingRowList)?;

    let wanted_time = normalize_time_label(time_of_day);

    for row in rows.child_elements() {
        // Rows without a modal hook are headers or other non-interactive
        // furniture.
        let Some(data_target) = row.value().attr("data-target") else {
            continue;
        };
        if row.value().attr("data-toggle") != Some("modal") {
            continue;
        }

        let class_type = row
            .select(&class_type_cell)
            .nth(1)
            .map(extract_text)
            .unwrap_or_default();
        if class_type.trim() != CLASS_TYPE {
            continue;
        }

        let displayed_time = row.select(&time_label).next().map(extract_text).unwrap_or_default();
        if normalize_time_label(&displayed_time) != wanted_time {
            continue;
        }

        // First matching row decides the outcome.
        if data_target == "#" {
            return Ok(ScheduleEntry::NotAvailable);
        }

        let modal_id = data_target.replace('#', "").trim().to_string();
        let calendar_id = document
            .select(&modal_button)
            .find(|elem| elem.value().attr("modal-id") == Some(modal_id.as_str()))
            .and_then(|elem| elem.value().attr("calendar-id"))
            .ok_or_else(|| ScheduleError::MissingCalendarId {
                modal_id: modal_id.clone(),
            })?
            .to_string();

        return Ok(ScheduleEntry::Bookable(BookableSlot {
            subscription_id,
            calendar_id,
            csrf,
        }));
    }

    Err(ScheduleError::NoEntryForTime {
        time_of_day: time_of_day.to_string(),
    })
}

fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

fn normalize_time_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_page(rows: &str) -> String {
        format!(
            r#"<html><body>
            <button class="btn reserve" subscription-id="sub-900">Reserve</button>
            <input type="hidden" id="csrf" value="csrf-tok-1"/>
            <div class="tbody">{rows}</div>
            <button modal-id="42" calendar-id="cal-42">modal</button>
            <button modal-id="43" calendar-id="cal-43">modal</button>
            </body></html>"#
        )
    }

    fn row(data_target: &str, class_type: &str, time: &str) -> String {
        format!(
            r#"<div class="trow" data-target="{data_target}" data-toggle="modal">
            <div class="col-sm-2 td"><span class="hidden-xs">{time}</span></div>
            <div class="col-sm-2 td">{class_type}</div>
            </div>"#
        )
    }

    #[test]
    fn extracts_identifiers_for_a_bookable_row() {
        let html = schedule_page(&row("#42", "Open Gym", "6:00 am"));
        let entry = match_slot_in_page(&html, "6:00am").unwrap();
        assert_eq!(
            entry,
            ScheduleEntry::Bookable(BookableSlot {
                subscription_id: "sub-900".to_string(),
                calendar_id: "cal-42".to_string(),
                csrf: "csrf-tok-1".to_string(),
            })
        );
    }

    #[test]
    fn hash_sentinel_means_not_available() {
        let rows = row("#", "Open Gym", "6:00 am") + &row("#43", "Open Gym", "6:00 am");
        let html = schedule_page(&rows);
        let entry = match_slot_in_page(&html, "6:00am").unwrap();
        assert_eq!(entry, ScheduleEntry::NotAvailable);
    }

    #[test]
    fn first_matching_row_wins() {
        let rows = row("#42", "Open Gym", "6:00 am") + &row("#43", "Open Gym", "6:00 am");
        let html = schedule_page(&rows);
        let ScheduleEntry::Bookable(slot) = match_slot_in_page(&html, "6:00am").unwrap() else {
            panic!("expected a bookable entry");
        };
        assert_eq!(slot.calendar_id, "cal-42");
    }

    #[test]
    fn other_class_types_are_skipped() {
        let rows = row("#42", "CrossFit", "6:00 am") + &row("#43", "Open Gym", "6:00 am");
        let html = schedule_page(&rows);
        let ScheduleEntry::Bookable(slot) = match_slot_in_page(&html, "6:00am").unwrap() else {
            panic!("expected a bookable entry");
        };
        assert_eq!(slot.calendar_id, "cal-43");
    }

    #[test]
    fn non_interactive_rows_are_skipped() {
        let header = r#"<div class="trow header"><div class="col-sm-2 td">Time</div>
            <div class="col-sm-2 td">Open Gym</div></div>"#;
        let rows = header.to_string() + &row("#43", "Open Gym", "6:00 am");
        let html = schedule_page(&rows);
        let ScheduleEntry::Bookable(slot) = match_slot_in_page(&html, "6:00am").unwrap() else {
            panic!("expected a bookable entry");
        };
        assert_eq!(slot.calendar_id, "cal-43");
    }

    #[test]
    fn time_comparison_ignores_spacing_and_case() {
        let html = schedule_page(&row("#42", "Open Gym", "  6:00 AM "));
        assert!(match_slot_in_page(&html, "6:00am").is_ok());
    }

    #[test]
    fn wrong_time_is_a_no_entry_error() {
        let html = schedule_page(&row("#42", "Open Gym", "6:00 am"));
        let err = match_slot_in_page(&html, "7:00am").unwrap_err();
        assert!(matches!(err, ScheduleError::NoEntryForTime { .. }));
    }

    #[test]
    fn missing_subscription_id_is_fatal() {
        let html = r#"<html><body>
            <button class="btn" subscription-id="  ">Reserve</button>
            <input id="csrf" value="tok"/>
            <div class="tbody"></div>
            </body></html>"#;
        let err = match_slot_in_page(html, "6:00am").unwrap_err();
        assert!(matches!(err, ScheduleError::MissingSubscriptionId));
    }

    #[test]
    fn missing_modal_is_a_calendar_id_error() {
        let html = format!(
            r#"<html><body>
            <button subscription-id="sub-900">Reserve</button>
            <input id="csrf" value="tok"/>
            <div class="tbody">{}</div>
            </body></html>"#,
            row("#99", "Open Gym", "6:00 am")
        );
        let err = match_slot_in_page(&html, "6:00am").unwrap_err();
        assert!(matches!(err, ScheduleError::MissingCalendarId { .. }));
    }
}
