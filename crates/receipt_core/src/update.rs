use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSubmitted(files) => {
            if files.is_empty() {
                return (state, Vec::new());
            }
            state.submit_files(files);
            // Submitting mid-flight only enqueues; schedule_next is a no-op
            // while an extraction is running.
            if state.options().auto_start || state.is_armed() {
                schedule_next(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::StartClicked => {
            state.arm();
            schedule_next(&mut state)
        }
        Msg::ExtractionSucceeded { entry_id, record } => {
            let Some(file) = state.complete_entry(entry_id, record.clone()) else {
                return (state, Vec::new());
            };
            state.store_append(record.clone());
            state.clear_notification();
            let mut effects = vec![
                Effect::ArchiveOriginal {
                    entry_id,
                    file,
                    record,
                },
                Effect::PersistRecords(state.records_snapshot()),
            ];
            effects.extend(schedule_next(&mut state));
            effects
        }
        Msg::ExtractionFailed { entry_id, message } => {
            if !state.fail_entry(entry_id, message.clone()) {
                return (state, Vec::new());
            }
            let token = state.raise_notification(message);
            let mut effects = vec![Effect::ScheduleNotificationTimeout { token }];
            // One entry's failure never blocks the rest of the queue.
            effects.extend(schedule_next(&mut state));
            effects
        }
        Msg::RecordEdited { index, record } => match state.store_update(index, record) {
            Ok(()) => vec![Effect::PersistRecords(state.records_snapshot())],
            Err(err) => {
                let token = state.raise_notification(err.to_string());
                vec![Effect::ScheduleNotificationTimeout { token }]
            }
        },
        Msg::RecordDeleted { index } => match state.store_delete(index) {
            Ok(_) => vec![Effect::PersistRecords(state.records_snapshot())],
            Err(err) => {
                let token = state.raise_notification(err.to_string());
                vec![Effect::ScheduleNotificationTimeout { token }]
            }
        },
        Msg::RestoreRecords(records) => {
            state.restore_records(records);
            Vec::new()
        }
        Msg::NotificationTimerFired { token } => {
            state.dismiss_notification_if(token);
            Vec::new()
        }
        Msg::NotificationDismissed => {
            state.clear_notification();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Single evaluation of the driving rule, idempotent when nothing is
/// eligible. Called after every mutation that can change eligibility;
/// never re-entrant.
fn schedule_next(state: &mut AppState) -> Vec<Effect> {
    // At-most-one-in-flight: an extraction already running blocks any new
    // dispatch until its completion message arrives.
    if state.has_processing() {
        return Vec::new();
    }
    let Some(entry_id) = state.next_queued_id() else {
        // Queue drained. In the gated variant a later submission requires a
        // fresh start action.
        if !state.options().auto_start {
            state.disarm();
        }
        return Vec::new();
    };
    match state.begin_processing(entry_id) {
        Some(file) => vec![Effect::StartExtraction { entry_id, file }],
        None => Vec::new(),
    }
}
