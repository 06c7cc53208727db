/// Property-based tests using proptest
/// Tests invariants of the time handling and payload shaping for all inputs
use chrono::{Duration, TimeZone, Timelike};
use chrono_tz::Europe::London;
use proptest::prelude::*;
use satchel_widget_relay::models::{CalendarTasksResponse, TimetableResponse};
use satchel_widget_relay::schedule::{
    build_payload, parse_to_london, refresh_hint, MAX_REFRESH_SECS, MIN_REFRESH_SECS,
};
use serde_json::json;

// Property: Timestamp parsing should never panic
proptest! {
    #[test]
    fn parse_never_panics(raw in "\\PC*") {
        let _ = parse_to_london(&raw);
    }

    #[test]
    fn date_only_is_always_end_of_day(y in 2000i32..2100, m in 1u32..=12, d in 1u32..=28) {
        let raw = format!("{:04}-{:02}-{:02}", y, m, d);
        let parsed = parse_to_london(&raw).unwrap();
        prop_assert_eq!(parsed.date_naive().format("%Y-%m-%d").to_string(), raw);
        prop_assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (23, 59, 59));
    }

    #[test]
    fn utc_timestamps_keep_their_instant(secs in 946_684_800i64..4_102_444_800i64) {
        let utc = chrono::Utc.timestamp_opt(secs, 0).unwrap();
        let parsed = parse_to_london(&utc.to_rfc3339()).unwrap();
        prop_assert_eq!(parsed.timestamp(), secs);
    }
}

// Property: Refresh hint is always within bounds
proptest! {
    #[test]
    fn refresh_seconds_always_clamped(offsets in prop::collection::vec(-10_000i64..100_000, 1..10)) {
        let now = London.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let candidates: Vec<_> = offsets.iter().map(|s| now + Duration::seconds(*s)).collect();
        let (hm, secs) = refresh_hint(&now, &candidates);
        prop_assert!((MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&secs));
        prop_assert_eq!(hm.len(), 5);
    }
}

// Property: Payload shape is stable whatever the homework list looks like
proptest! {
    #[test]
    fn payload_keys_stable_and_homework_capped(
        dues in prop::collection::vec(
            prop_oneof![
                "2025-03-(1[0-9]|2[0-8])",
                "2025-03-(1[0-9]|2[0-8])T(0[0-9]|1[0-9]):[0-5][0-9]:00Z",
                "\\PC{0,12}",
            ],
            0..8,
        )
    ) {
        let now = London.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let tasks: CalendarTasksResponse = serde_json::from_value(json!({
            "personal_calendar_tasks": dues
                .iter()
                .map(|d| json!({ "due_on": d, "class_task_title": "Task" }))
                .collect::<Vec<_>>()
        }))
        .unwrap();

        let payload = build_payload(now, &TimetableResponse::default(), &tasks);
        prop_assert!(payload.homework.len() <= 3);

        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();
        prop_assert_eq!(obj.len(), 27);
        prop_assert_eq!(obj["homework_count"].as_u64().unwrap() as usize, payload.homework.len());
    }
}
