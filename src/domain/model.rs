use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 每個週期從頁面解析出的回合狀態
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStatus {
    pub active_player: Option<String>,
}

impl TurnStatus {
    pub fn new(active_player: Option<String>) -> Self {
        Self { active_player }
    }

    pub fn waiting_on(player: &str) -> Self {
        Self {
            active_player: Some(player.to_string()),
        }
    }
}

/// 通知狀態，只存在於記憶體中，由排程器獨佔
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    pub last_active_player: Option<String>,
    pub last_change_time: Option<DateTime<Utc>>,
    pub last_notification_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    TurnChanged,
    Reminder { hours_waiting: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub player: String,
}

impl Notification {
    pub fn render(&self, mention: &str) -> String {
        match self.kind {
            NotificationKind::TurnChanged => format!("Waiting for {} to take their turn", mention),
            NotificationKind::Reminder { .. } => {
                format!("Still waiting for {} its been 24 hours", mention)
            }
        }
    }
}

/// 狀態機單一步驟的結果
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Notify(Notification),
    NoTurnInfo,
    FirstObservation,
    CoolingDown { hours_until_next: f64 },
}

impl Decision {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Decision::Notify(notification) => Some(notification),
            _ => None,
        }
    }
}

/// 已解析的聊天目的地（頻道或討論串）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { name: String },
    Unresolved,
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// 一個完整週期的摘要
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub status: TurnStatus,
    pub decision: Decision,
    pub deliveries: Vec<(u64, DeliveryOutcome)>,
}
