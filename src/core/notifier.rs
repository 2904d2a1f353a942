use crate::domain::model::{DeliveryOutcome, Destination};
use crate::domain::ports::ChatGateway;
use crate::utils::error::{BotError, Result};

/// 將訊息送到所有設定的頻道與討論串
pub struct Notifier<G: ChatGateway> {
    gateway: G,
    targets: Vec<u64>,
}

impl<G: ChatGateway> Notifier<G> {
    pub fn new(gateway: G, targets: Vec<u64>) -> Self {
        Self { gateway, targets }
    }

    pub fn targets(&self) -> &[u64] {
        &self.targets
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn wait_until_ready(&self) -> Result<()> {
        self.gateway.wait_until_ready().await
    }

    /// 逐一投遞；單一目的地的失敗只記錄，不影響其他目的地
    pub async fn notify(&self, message: &str) -> Vec<(u64, DeliveryOutcome)> {
        tracing::debug!("Attempting to send message: {}", message);

        let mut outcomes = Vec::with_capacity(self.targets.len());
        for &target in &self.targets {
            let outcome = match self.deliver(target, message).await {
                Ok(Some(destination)) => {
                    tracing::info!("📨 Message sent to {} ({})", destination.name, target);
                    DeliveryOutcome::Delivered {
                        name: destination.name,
                    }
                }
                Ok(None) => {
                    tracing::warn!("⚠️ Could not find channel/thread {}", target);
                    DeliveryOutcome::Unresolved
                }
                Err(BotError::PermissionDenied { .. }) => {
                    tracing::error!("❌ No permission to send to {}", target);
                    DeliveryOutcome::Failed {
                        reason: "permission denied".to_string(),
                    }
                }
                Err(e) => {
                    tracing::error!("❌ Error sending to {}: {}", target, e);
                    DeliveryOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push((target, outcome));
        }
        outcomes
    }

    async fn deliver(&self, target: u64, message: &str) -> Result<Option<Destination>> {
        let destination = match self.gateway.resolve_channel(target).await? {
            Some(channel) => Some(channel),
            None => self.gateway.find_thread(target).await?,
        };

        match destination {
            Some(destination) => {
                self.gateway.send_message(&destination, message).await?;
                Ok(Some(destination))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockGateway {
        channels: HashMap<u64, String>,
        threads: HashMap<u64, String>,
        forbidden: Vec<u64>,
        broken: Vec<u64>,
        sent: Arc<Mutex<Vec<(u64, String)>>>,
    }

    #[async_trait]
    impl ChatGateway for MockGateway {
        async fn wait_until_ready(&self) -> Result<()> {
            Ok(())
        }

        async fn resolve_channel(&self, id: u64) -> Result<Option<Destination>> {
            if self.broken.contains(&id) {
                return Err(BotError::ChatApiError {
                    status: 500,
                    message: "internal error".to_string(),
                });
            }
            Ok(self.channels.get(&id).map(|name| Destination {
                id,
                name: name.clone(),
            }))
        }

        async fn find_thread(&self, id: u64) -> Result<Option<Destination>> {
            Ok(self.threads.get(&id).map(|name| Destination {
                id,
                name: name.clone(),
            }))
        }

        async fn send_message(&self, destination: &Destination, content: &str) -> Result<()> {
            if self.forbidden.contains(&destination.id) {
                return Err(BotError::PermissionDenied {
                    target: destination.id,
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((destination.id, content.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delivers_to_channels_and_threads() {
        let mut gateway = MockGateway::default();
        gateway.channels.insert(1, "general".to_string());
        gateway.threads.insert(2, "arcs-game".to_string());
        let sent = gateway.sent.clone();
        let notifier = Notifier::new(gateway, vec![1, 2]);

        let outcomes = notifier.notify("Waiting for @Blue to take their turn").await;

        assert_eq!(
            outcomes,
            vec![
                (1, DeliveryOutcome::Delivered { name: "general".to_string() }),
                (2, DeliveryOutcome::Delivered { name: "arcs-game".to_string() }),
            ]
        );
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_on_one_target_does_not_block_the_next() {
        let mut gateway = MockGateway::default();
        gateway.channels.insert(1, "locked".to_string());
        gateway.channels.insert(3, "general".to_string());
        gateway.forbidden.push(1);
        gateway.broken.push(2);
        let sent = gateway.sent.clone();
        let notifier = Notifier::new(gateway, vec![1, 2, 3]);

        let outcomes = notifier.notify("hello").await;

        assert!(matches!(outcomes[0].1, DeliveryOutcome::Failed { .. }));
        assert!(matches!(outcomes[1].1, DeliveryOutcome::Failed { .. }));
        assert!(outcomes[2].1.is_delivered());
        assert_eq!(*sent.lock().unwrap(), vec![(3, "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_unknown_target_is_unresolved() {
        let notifier = Notifier::new(MockGateway::default(), vec![99]);

        let outcomes = notifier.notify("hello").await;

        assert_eq!(outcomes, vec![(99, DeliveryOutcome::Unresolved)]);
    }

    #[tokio::test]
    async fn test_no_targets_is_a_no_op() {
        let notifier = Notifier::new(MockGateway::default(), vec![]);
        assert!(notifier.notify("hello").await.is_empty());
    }
}
