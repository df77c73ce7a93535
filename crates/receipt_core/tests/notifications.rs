use receipt_core::{update, AppState, Effect, Msg, ReceiptRecord, SourceFile};

fn init_logging() {
    pipeline_logging::initialize_for_tests();
}

fn submit_one(state: AppState, name: &str) -> (AppState, u64) {
    let (state, effects) = update(
        state,
        Msg::FilesSubmitted(vec![SourceFile::new(name, "image/png", vec![0])]),
    );
    let entry_id = effects
        .iter()
        .find_map(|e| match e {
            Effect::StartExtraction { entry_id, .. } => Some(*entry_id),
            _ => None,
        })
        .expect("dispatch");
    (state, entry_id)
}

fn fail(state: AppState, entry_id: u64, message: &str) -> (AppState, u64) {
    let (state, effects) = update(
        state,
        Msg::ExtractionFailed {
            entry_id,
            message: message.to_string(),
        },
    );
    let token = effects
        .iter()
        .find_map(|e| match e {
            Effect::ScheduleNotificationTimeout { token } => Some(*token),
            _ => None,
        })
        .expect("timeout effect");
    (state, token)
}

#[test]
fn failure_raises_banner_and_schedules_timeout() {
    init_logging();
    let (state, entry_id) = submit_one(AppState::new(), "a.png");
    let (state, _token) = fail(state, entry_id, "missing API key");

    assert_eq!(state.view().notification.as_deref(), Some("missing API key"));
}

#[test]
fn timer_with_matching_token_dismisses_banner() {
    init_logging();
    let (state, entry_id) = submit_one(AppState::new(), "a.png");
    let (state, token) = fail(state, entry_id, "upstream call failed");

    let (state, _) = update(state, Msg::NotificationTimerFired { token });
    assert!(state.view().notification.is_none());
}

#[test]
fn stale_timer_does_not_dismiss_a_newer_banner() {
    init_logging();
    let (state, first) = submit_one(AppState::new(), "a.png");
    let (state, stale_token) = fail(state, first, "first failure");

    let (state, second) = submit_one(state, "b.png");
    let (state, _fresh_token) = fail(state, second, "second failure");

    let (state, _) = update(state, Msg::NotificationTimerFired { token: stale_token });
    // The stale timer belonged to the first banner; the second stays up.
    assert_eq!(state.view().notification.as_deref(), Some("second failure"));
}

#[test]
fn user_dismissal_clears_banner_immediately() {
    init_logging();
    let (state, entry_id) = submit_one(AppState::new(), "a.png");
    let (state, _token) = fail(state, entry_id, "upstream call failed");

    let (state, _) = update(state, Msg::NotificationDismissed);
    assert!(state.view().notification.is_none());
}

#[test]
fn success_clears_a_previous_failure_banner() {
    init_logging();
    let (state, first) = submit_one(AppState::new(), "a.png");
    let (state, _token) = fail(state, first, "upstream call failed");

    let (state, second) = submit_one(state, "b.png");
    let (state, _) = update(
        state,
        Msg::ExtractionSucceeded {
            entry_id: second,
            record: ReceiptRecord {
                date: "2024-03-01".to_string(),
                merchant: "Acme".to_string(),
                description: "coffee".to_string(),
                total: 4.5,
                card_last4: None,
            },
        },
    );
    assert!(state.view().notification.is_none());
}
