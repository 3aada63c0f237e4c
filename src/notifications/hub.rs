use tokio::sync::broadcast;
use tracing::debug;

use super::models::AdminRequestEvent;

const HUB_CAPACITY: usize = 64;

/// Fan-out of admin request events to every connected dashboard
#[derive(Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<AdminRequestEvent>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    /// Returns how many subscribers received the event
    pub fn publish(&self, event: AdminRequestEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("No subscribers for admin request event");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdminRequestEvent> {
        self.sender.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
