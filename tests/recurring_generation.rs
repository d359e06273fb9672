mod common;

use common::{date, setup_session};
use expense_core::StartupSession;
use spendwise_config::EngineConfig;
use spendwise_core::{FixedClock, PatternState};
use spendwise_domain::{LeapDayPolicy, RecurringPattern};
use uuid::Uuid;

#[test]
fn monthly_on_31st_catches_up_with_clamping() {
    let (mut session, base) = setup_session(EngineConfig::default(), date(2024, 4, 1));
    let pattern = RecurringPattern::monthly(15.0, Uuid::new_v4(), 31, date(2024, 1, 31));
    let id = session.add_pattern(pattern).expect("add pattern");

    let report = session.run_startup_pass(None).expect("startup pass");
    assert_eq!(report.result.generated, 2);
    assert!(report.failure_summary().is_none());

    let dates: Vec<_> = session.expenses().iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![date(2024, 3, 31), date(2024, 2, 29)]);

    // A second launch on the same day finds nothing new.
    let mut reopened = StartupSession::open_in(&base, Box::new(FixedClock::new(date(2024, 4, 1))))
        .expect("reopen session");
    let again = reopened.run_startup_pass(None).expect("second pass");
    assert_eq!(again.result.generated, 0);
    assert!(!again.refreshed);
    assert_eq!(
        reopened.store().pattern(id).and_then(|p| p.last_generated_date),
        Some(date(2024, 3, 31))
    );
}

#[test]
fn configured_safety_limit_defers_backlog_to_next_launch() {
    let config = EngineConfig {
        safety_limit: 10,
        backup_before_generation: false,
        ..EngineConfig::default()
    };
    let (mut session, _) = setup_session(config, date(2024, 1, 31));
    let id = session
        .add_pattern(RecurringPattern::daily(2.0, Uuid::new_v4(), date(2024, 1, 1)))
        .expect("add pattern");

    let first = session.run_startup_pass(None).expect("first pass");
    assert_eq!(first.result.generated, 10);
    assert_eq!(first.result.deferred, vec![id]);
    assert!(first.backup.is_none());

    let second = session.run_startup_pass(None).expect("second pass");
    assert_eq!(second.result.generated, 10);
    let third = session.run_startup_pass(None).expect("third pass");
    assert_eq!(third.result.generated, 10);
    assert!(third.result.deferred.is_empty());
    assert_eq!(session.store().expenses_for(id).len(), 30);
}

#[test]
fn clamp_policy_from_config_reaches_the_engine() {
    let config = EngineConfig {
        leap_day_policy: LeapDayPolicy::ClampToFeb28,
        ..EngineConfig::default()
    };
    let (mut session, _) = setup_session(config, date(2026, 3, 1));
    session
        .add_pattern(RecurringPattern::yearly(
            60.0,
            Uuid::new_v4(),
            2,
            29,
            date(2024, 2, 29),
        ))
        .expect("add pattern");

    let report = session.run_startup_pass(None).expect("startup pass");
    assert_eq!(report.result.generated, 2);
    let dates: Vec<_> = session.expenses().iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![date(2026, 2, 28), date(2025, 2, 28)]);
}

#[test]
fn explicit_as_of_generates_only_up_to_that_day() {
    let (mut session, _) = setup_session(EngineConfig::default(), date(2024, 12, 31));
    session
        .add_pattern(RecurringPattern::weekly(30.0, Uuid::new_v4(), 5, date(2024, 1, 5)))
        .expect("add pattern");

    let report = session
        .run_startup_pass(Some(date(2024, 1, 31)))
        .expect("startup pass");

    // Fridays after the Friday start: 12, 19, 26.
    assert_eq!(report.result.generated, 3);
    assert_eq!(report.result.as_of, date(2024, 1, 31));
}

#[test]
fn snapshot_reports_state_for_each_pattern() {
    let (mut session, _) = setup_session(EngineConfig::default(), date(2024, 6, 1));
    let future = session
        .add_pattern(RecurringPattern::monthly(5.0, Uuid::new_v4(), 1, date(2024, 7, 1)))
        .expect("future pattern");
    let paused = session
        .add_pattern(RecurringPattern::daily(1.0, Uuid::new_v4(), date(2024, 1, 1)).deactivated())
        .expect("paused pattern");

    let rows = session.snapshot();
    let state_of = |id| {
        rows.iter()
            .find(|row| row.pattern_id == id)
            .map(|row| row.state)
            .expect("row present")
    };
    assert_eq!(state_of(future), PatternState::Dormant);
    assert_eq!(state_of(paused), PatternState::Paused);

    let report = session.run_startup_pass(None).expect("startup pass");
    assert_eq!(report.result.generated, 0);
}

#[test]
fn invalid_pattern_is_refused_before_it_reaches_the_store() {
    let (mut session, _) = setup_session(EngineConfig::default(), date(2024, 6, 1));
    let mut pattern = RecurringPattern::weekly(1.0, Uuid::new_v4(), 2, date(2024, 1, 1));
    pattern.day_of_week = Some(9);

    assert!(session.add_pattern(pattern).is_err());
    assert!(session.store().patterns().is_empty());
}
