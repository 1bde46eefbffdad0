// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live view of one request's conversation.
//!
//! The view subscribes to the change feed before fetching history, so an
//! insert that lands between the two is seen at least once. Duplicates
//! (the local echo of our own send, or a row already in the history) are
//! dropped by message id.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use concierge_core::{Actor, ConciergeError, Message, MessageStream, SenderType};

use crate::Desk;

/// Which side of the screen a message is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Written by the viewer's side (right).
    Own,
    /// Written by the other side (left).
    Other,
}

pub struct ConversationView {
    desk: Desk,
    actor: Actor,
    request_id: String,
    viewer: SenderType,
    messages: Vec<Message>,
    seen: HashSet<String>,
    draft: String,
    stream: Option<Box<dyn MessageStream>>,
}

impl ConversationView {
    pub async fn open(
        desk: &Desk,
        actor: &Actor,
        request_id: &str,
        viewer: SenderType,
    ) -> Result<Self, ConciergeError> {
        let stream = match desk.feed().subscribe(request_id) {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(request_id, error = %e, "live updates unavailable");
                None
            }
        };

        let history = desk.list_by_request(request_id, actor).await?;
        let seen = history.iter().map(|m| m.id.clone()).collect();
        debug!(request_id, messages = history.len(), live = stream.is_some(), "conversation opened");

        Ok(Self {
            desk: desk.clone(),
            actor: actor.clone(),
            request_id: request_id.to_string(),
            viewer,
            messages: history,
            seen,
            draft: String::new(),
            stream,
        })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn viewer(&self) -> SenderType {
        self.viewer
    }

    /// Messages in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    /// Wait for the next message not already in the view and append it.
    ///
    /// Returns `None` when the view has no live subscription or the feed
    /// shut down.
    pub async fn next_update(&mut self) -> Option<Message> {
        loop {
            let message = self.stream.as_mut()?.next_message().await?;
            if self.record(message.clone()) {
                return Some(message);
            }
        }
    }

    /// Send `content` as the viewer. The draft survives a failed send.
    pub async fn send(&mut self, content: &str) -> Result<Message, ConciergeError> {
        self.draft = content.to_string();
        let message = self
            .desk
            .send(&self.request_id, &self.actor, self.viewer, content)
            .await?;
        self.draft.clear();
        self.record(message.clone());
        Ok(message)
    }

    /// Send whatever is in the draft.
    pub async fn send_draft(&mut self) -> Result<Message, ConciergeError> {
        let content = self.draft.clone();
        self.send(&content).await
    }

    pub fn alignment(&self, message: &Message) -> Alignment {
        if message.sender_type == self.viewer {
            Alignment::Own
        } else {
            Alignment::Other
        }
    }

    /// Release the live subscription.
    pub fn close(self) {
        debug!(request_id = %self.request_id, "conversation closed");
    }

    fn record(&mut self, message: Message) -> bool {
        if !self.seen.insert(message.id.clone()) {
            return false;
        }
        self.messages.push(message);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use concierge_bus::MessageFeed;
    use concierge_core::RequestStatus;

    use super::*;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn open_loads_history_and_subscribes() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;
        fx.desk
            .send(&request.id, &player, SenderType::Player, "Bonjour")
            .await
            .unwrap();

        let view = ConversationView::open(&fx.desk, &player, &request.id, SenderType::Player)
            .await
            .unwrap();
        assert!(view.is_live());
        assert_eq!(view.messages().len(), 1);
        assert_eq!(fx.feed.subscriber_count(&request.id), 1);

        view.close();
        assert_eq!(fx.feed.subscriber_count(&request.id), 0);
    }

    #[tokio::test]
    async fn other_side_messages_arrive_live() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let concierge = Actor::concierge("c1");
        let request = fx.passport_request(&player).await;
        let mut view = ConversationView::open(&fx.desk, &player, &request.id, SenderType::Player)
            .await
            .unwrap();

        let sent = fx
            .desk
            .send(&request.id, &concierge, SenderType::Concierge, "Votre dossier avance")
            .await
            .unwrap();
        let received = tokio::time::timeout(Duration::from_secs(2), view.next_update())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.id, sent.id);
        assert_eq!(view.alignment(&received), Alignment::Other);
        assert_eq!(view.messages().len(), 1);
    }

    #[tokio::test]
    async fn own_echo_is_not_duplicated() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let concierge = Actor::concierge("c1");
        let request = fx.passport_request(&player).await;
        let mut view = ConversationView::open(&fx.desk, &player, &request.id, SenderType::Player)
            .await
            .unwrap();

        let mine = view.send("Bonjour").await.unwrap();
        assert_eq!(view.alignment(&mine), Alignment::Own);
        assert_eq!(view.draft(), "");

        let theirs = fx
            .desk
            .send(&request.id, &concierge, SenderType::Concierge, "Bonjour !")
            .await
            .unwrap();

        // The notification for our own message is skipped.
        let next = tokio::time::timeout(Duration::from_secs(2), view.next_update())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.id, theirs.id);
        let ids: Vec<_> = view.messages().iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, [mine.id, theirs.id]);
    }

    #[tokio::test]
    async fn failed_send_keeps_the_draft() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;
        fx.desk
            .transition(&request.id, &Actor::concierge("c1"), RequestStatus::Cancelled)
            .await
            .unwrap();
        let mut view = ConversationView::open(&fx.desk, &player, &request.id, SenderType::Player)
            .await
            .unwrap();

        view.set_draft("Toujours besoin d'aide");
        assert!(view.send_draft().await.is_err());
        assert_eq!(view.draft(), "Toujours besoin d'aide");
        assert!(view.messages().is_empty());
    }

    #[tokio::test]
    async fn open_fails_for_hidden_request() {
        let fx = Fixture::new().await;
        let request = fx.passport_request(&Actor::player("p1")).await;
        let result = ConversationView::open(
            &fx.desk,
            &Actor::player("p2"),
            &request.id,
            SenderType::Player,
        )
        .await;
        assert!(matches!(result, Err(ConciergeError::NotFound { .. })));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn view_opens_without_live_updates_when_feed_is_full() {
        let fx = Fixture::with_feed(MessageFeed::new(8, 1)).await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;
        let _hog = fx.feed.subscribe("elsewhere").unwrap();

        let mut view = ConversationView::open(&fx.desk, &player, &request.id, SenderType::Player)
            .await
            .unwrap();
        assert!(!view.is_live());
        assert!(logs_contain("live updates unavailable"));
        assert!(view.next_update().await.is_none());
        view.send("Bonjour").await.unwrap();
        assert_eq!(view.messages().len(), 1);
    }
}
