use crate::domain::model::{Decision, Notification, NotificationKind, NotificationState, TurnStatus};
use chrono::{DateTime, Duration, Utc};

pub const REMINDER_INTERVAL_HOURS: i64 = 24;

pub fn reminder_interval() -> Duration {
    Duration::hours(REMINDER_INTERVAL_HOURS)
}

/// 根據本週期的回合狀態決定是否通知，並更新狀態
///
/// 除了對 `state` 的修改之外沒有任何副作用，時間由呼叫端注入。
pub fn decide(current: &TurnStatus, state: &mut NotificationState, now: DateTime<Utc>) -> Decision {
    let Some(player) = current.active_player.as_deref() else {
        return Decision::NoTurnInfo;
    };

    if state.last_active_player.as_deref() != Some(player) {
        state.last_active_player = Some(player.to_string());
        state.last_change_time = Some(now);
        state.last_notification_time = Some(now);
        return Decision::Notify(Notification {
            kind: NotificationKind::TurnChanged,
            player: player.to_string(),
        });
    }

    let Some(last_notified) = state.last_notification_time else {
        state.last_notification_time = Some(now);
        return Decision::FirstObservation;
    };

    let since_last = now - last_notified;
    if since_last >= reminder_interval() {
        let hours_waiting = state
            .last_change_time
            .map(|changed| (now - changed).num_hours())
            .unwrap_or_else(|| since_last.num_hours());
        state.last_notification_time = Some(now);
        return Decision::Notify(Notification {
            kind: NotificationKind::Reminder { hours_waiting },
            player: player.to_string(),
        });
    }

    let hours_until_next =
        REMINDER_INTERVAL_HOURS as f64 - since_last.num_seconds() as f64 / 3600.0;
    Decision::CoolingDown { hours_until_next }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn state_for(player: &str, changed: DateTime<Utc>, notified: DateTime<Utc>) -> NotificationState {
        NotificationState {
            last_active_player: Some(player.to_string()),
            last_change_time: Some(changed),
            last_notification_time: Some(notified),
        }
    }

    #[test]
    fn test_absent_player_leaves_state_untouched() {
        let now = base_time();
        let mut state = state_for("Blue", now - Duration::hours(30), now - Duration::hours(30));
        let before = state.clone();

        let decision = decide(&TurnStatus::default(), &mut state, now);

        assert_eq!(decision, Decision::NoTurnInfo);
        assert_eq!(state, before);
    }

    #[test]
    fn test_first_detection_announces_player() {
        let now = base_time();
        let mut state = NotificationState::default();

        let decision = decide(&TurnStatus::waiting_on("Blue"), &mut state, now);

        assert_eq!(
            decision,
            Decision::Notify(Notification {
                kind: NotificationKind::TurnChanged,
                player: "Blue".to_string(),
            })
        );
        assert_eq!(state.last_active_player.as_deref(), Some("Blue"));
        assert_eq!(state.last_change_time, Some(now));
        assert_eq!(state.last_notification_time, Some(now));
    }

    #[test]
    fn test_change_to_new_player_notifies_new_player() {
        let now = base_time();
        let earlier = now - Duration::hours(3);
        let mut state = state_for("Blue", earlier, earlier);

        let decision = decide(&TurnStatus::waiting_on("Red"), &mut state, now);

        let notification = decision.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::TurnChanged);
        assert_eq!(notification.player, "Red");
        assert_eq!(state.last_active_player.as_deref(), Some("Red"));
        assert_eq!(state.last_change_time, Some(now));
        assert_eq!(state.last_notification_time, Some(now));
    }

    #[test]
    fn test_same_player_within_cooldown_is_quiet() {
        let now = base_time();
        let notified = now - Duration::hours(23);
        let mut state = state_for("Blue", notified, notified);
        let before = state.clone();

        let decision = decide(&TurnStatus::waiting_on("Blue"), &mut state, now);

        match decision {
            Decision::CoolingDown { hours_until_next } => {
                assert!((hours_until_next - 1.0).abs() < 1e-9);
            }
            other => panic!("expected cooldown, got {:?}", other),
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_same_player_after_cooldown_sends_one_reminder() {
        let now = base_time();
        let changed = now - Duration::hours(49);
        let notified = now - Duration::hours(25);
        let mut state = state_for("Blue", changed, notified);

        let decision = decide(&TurnStatus::waiting_on("Blue"), &mut state, now);

        assert_eq!(
            decision,
            Decision::Notify(Notification {
                kind: NotificationKind::Reminder { hours_waiting: 49 },
                player: "Blue".to_string(),
            })
        );
        assert_eq!(state.last_notification_time, Some(now));
        assert_eq!(state.last_active_player.as_deref(), Some("Blue"));
        assert_eq!(state.last_change_time, Some(changed));
    }

    #[test]
    fn test_reminder_fires_exactly_at_24_hours() {
        let now = base_time();
        let notified = now - Duration::hours(24);
        let mut state = state_for("Blue", notified, notified);

        let decision = decide(&TurnStatus::waiting_on("Blue"), &mut state, now);

        assert!(matches!(
            decision.notification().map(|n| &n.kind),
            Some(NotificationKind::Reminder { hours_waiting: 24 })
        ));
    }

    #[test]
    fn test_missing_notification_time_is_first_observation() {
        let now = base_time();
        let mut state = NotificationState {
            last_active_player: Some("Blue".to_string()),
            last_change_time: None,
            last_notification_time: None,
        };

        let decision = decide(&TurnStatus::waiting_on("Blue"), &mut state, now);

        assert_eq!(decision, Decision::FirstObservation);
        assert_eq!(state.last_notification_time, Some(now));
        assert_eq!(state.last_change_time, None);
    }

    #[test]
    fn test_repeated_cycles_emit_at_most_one_notification_per_interval() {
        let start = base_time();
        let mut state = NotificationState::default();
        let current = TurnStatus::waiting_on("Blue");

        // 每 15 分鐘一個週期，持續 23 小時
        let notifications = (0..(23 * 4))
            .map(|tick| start + Duration::minutes(15 * tick))
            .filter(|now| decide(&current, &mut state, *now).notification().is_some())
            .count();

        assert_eq!(notifications, 1);
    }

    #[test]
    fn test_reminders_repeat_every_24_hours() {
        let start = base_time();
        let mut state = NotificationState::default();
        let current = TurnStatus::waiting_on("Blue");

        let kinds: Vec<NotificationKind> = (0..=(49 * 4))
            .map(|tick| start + Duration::minutes(15 * tick))
            .filter_map(|now| decide(&current, &mut state, now).notification().cloned())
            .map(|n| n.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                NotificationKind::TurnChanged,
                NotificationKind::Reminder { hours_waiting: 24 },
                NotificationKind::Reminder { hours_waiting: 48 },
            ]
        );
    }

    #[test]
    fn test_turn_info_gap_does_not_reset_player() {
        let now = base_time();
        let mut state = NotificationState::default();

        decide(&TurnStatus::waiting_on("Blue"), &mut state, now);
        decide(&TurnStatus::default(), &mut state, now + Duration::minutes(15));
        let decision = decide(
            &TurnStatus::waiting_on("Blue"),
            &mut state,
            now + Duration::minutes(30),
        );

        assert!(matches!(decision, Decision::CoolingDown { .. }));
    }
}
