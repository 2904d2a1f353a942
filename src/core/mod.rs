pub mod fetcher;
pub mod notifier;
pub mod parser;
pub mod retry;
pub mod scheduler;
pub mod state_machine;

pub use crate::domain::model::{
    CycleReport, Decision, DeliveryOutcome, Destination, Notification, NotificationKind,
    NotificationState, TurnStatus,
};
pub use crate::domain::ports::{ChatGateway, PageSession, SessionFactory};
pub use crate::utils::error::Result;
