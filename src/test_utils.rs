//! Shared test utilities and arbitrary generators for property-based testing.

use chrono::{DateTime, FixedOffset, TimeZone};
use proptest::prelude::*;

use crate::types::Record;

/// A record at `secs` past the epoch (UTC) with default session, host and exit code.
pub fn record_at(secs: i64, command: &str) -> Record {
    Record::new(utc_seconds(secs), command)
}

/// A record with an explicit exit code.
pub fn record_with_exit(secs: i64, command: &str, exit_code: i64) -> Record {
    record_at(secs, command).with_exit_code(exit_code)
}

pub fn utc_seconds(secs: i64) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .timestamp_opt(secs, 0)
        .unwrap()
}

pub fn commands(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.command.as_str()).collect()
}

/// Sort key that makes record multisets comparable regardless of tie order.
pub fn canonical(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(|a, b| {
        (a.timestamp, &a.command, &a.session_id, &a.hostname, a.exit_code).cmp(&(
            b.timestamp,
            &b.command,
            &b.session_id,
            &b.hostname,
            b.exit_code,
        ))
    });
    records
}

pub fn arb_timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
    // Whole seconds between 2001 and 2033, offsets on quarter hours within ±14h.
    (1_000_000_000i64..2_000_000_000, -56i32..=56).prop_map(|(secs, quarters)| {
        FixedOffset::east_opt(quarters * 15 * 60)
            .unwrap()
            .timestamp_opt(secs, 0)
            .unwrap()
    })
}

pub fn arb_command() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ls".to_string()),
        Just("ls -la".to_string()),
        Just("git status".to_string()),
        Just("make test".to_string()),
        "[a-z][a-z0-9 ./-]{0,30}",
        ".{0,20}",
    ]
}

pub fn arb_record() -> impl Strategy<Value = Record> {
    (
        arb_timestamp(),
        arb_command(),
        prop_oneof![Just(String::new()), "[a-f0-9]{8}"],
        prop_oneof![Just(String::new()), "[a-z]{1,10}"],
        prop_oneof![Just(0i64), 1i64..256],
    )
        .prop_map(|(ts, cmd, session, host, exit)| {
            Record::new(ts, cmd)
                .with_session_id(session)
                .with_hostname(host)
                .with_exit_code(exit)
        })
}

/// Records drawn from a small command vocabulary so duplicates are common.
pub fn arb_repetitive_records(max_len: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        (
            0i64..1000,
            prop::sample::select(vec!["ls", "cd /tmp", "make", "git add .", "vim x"]),
            prop_oneof![Just(0i64), Just(1i64)],
        )
            .prop_map(|(secs, cmd, exit)| record_with_exit(secs, cmd, exit)),
        0..max_len,
    )
    .prop_map(|mut records| {
        records.sort_by_key(|r| r.timestamp);
        records
    })
}
