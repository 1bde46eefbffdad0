// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation messages: send, list, unread counts and the inbox.

use tracing::{debug, info};

use concierge_core::policy::{self, redact, may_speak_as};
use concierge_core::{
    Actor, Capability, ConciergeError, ConversationSummary, Message, NewMessage, RowScope,
    SenderType,
};

use crate::Desk;

fn send_capability(side: SenderType) -> Capability {
    match side {
        SenderType::Player => Capability::SendAsPlayer,
        SenderType::Concierge => Capability::SendAsConcierge,
    }
}

impl Desk {
    /// Post a message to a request's conversation as `sender_type`.
    ///
    /// The insert advances the request's `updated_at` in the same
    /// transaction; the stored row is then published on the feed.
    pub async fn send(
        &self,
        request_id: &str,
        actor: &Actor,
        sender_type: SenderType,
        content: &str,
    ) -> Result<Message, ConciergeError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ConciergeError::Validation("message content is empty".into()));
        }
        policy::require(actor, send_capability(sender_type))?;

        let request = self.visible_request(request_id, actor).await?;
        if !may_speak_as(actor, &request, sender_type) {
            return Err(ConciergeError::unauthorized(format!(
                "send as {sender_type}"
            )));
        }
        let message = self
            .messages
            .insert_message(&NewMessage {
                id: uuid::Uuid::new_v4().to_string(),
                request_id: request.id,
                sender_id: actor.user_id.clone(),
                sender_type,
                content: content.to_string(),
                require_open: sender_type == SenderType::Player,
            })
            .await?;
        self.feed.publish(&message);

        info!(
            request_id,
            message_id = %message.id,
            sender = %actor.user_id,
            %sender_type,
            "message sent"
        );
        Ok(message)
    }

    /// The full conversation, oldest first.
    pub async fn list_by_request(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> Result<Vec<Message>, ConciergeError> {
        self.visible_request(request_id, actor).await?;
        self.messages.list_messages(request_id).await
    }

    /// Unread messages written by the other side, as seen by `viewer`.
    pub async fn unread_count_for(
        &self,
        request_id: &str,
        actor: &Actor,
        viewer: SenderType,
    ) -> Result<u64, ConciergeError> {
        self.require_viewer(request_id, actor, viewer).await?;
        self.messages.count_unread(request_id, viewer.other()).await
    }

    /// Read receipt: mark the other side's messages read. Returns how many
    /// rows changed.
    pub async fn mark_read(
        &self,
        request_id: &str,
        actor: &Actor,
        viewer: SenderType,
    ) -> Result<u64, ConciergeError> {
        self.require_viewer(request_id, actor, viewer).await?;
        let changed = self.messages.mark_read(request_id, viewer.other()).await?;
        if changed > 0 {
            debug!(request_id, reader = %actor.user_id, changed, "messages marked read");
        }
        Ok(changed)
    }

    /// Conversations visible to `actor`, most recently active first.
    ///
    /// A player viewer only ever sees their own requests, whatever other
    /// roles the actor holds.
    pub async fn inbox(
        &self,
        actor: &Actor,
        viewer: SenderType,
    ) -> Result<Vec<ConversationSummary>, ConciergeError> {
        policy::require(actor, send_capability(viewer))?;
        let scope = match viewer {
            SenderType::Player => RowScope::OwnedBy(actor.user_id.clone()),
            SenderType::Concierge => actor.scope(),
        };
        let summaries = self
            .messages
            .conversation_summaries(&scope, viewer.other())
            .await?;
        Ok(summaries
            .into_iter()
            .map(|mut summary| {
                summary.request = redact(summary.request, actor);
                summary
            })
            .collect())
    }

    async fn require_viewer(
        &self,
        request_id: &str,
        actor: &Actor,
        viewer: SenderType,
    ) -> Result<(), ConciergeError> {
        let request = self.visible_request(request_id, actor).await?;
        if may_speak_as(actor, &request, viewer) {
            Ok(())
        } else {
            Err(ConciergeError::unauthorized(format!("read as {viewer}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use concierge_core::{MessageStore, RequestStatus};

    use super::*;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn blank_content_is_rejected_without_a_row() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;

        for content in ["", "   ", "\n\t"] {
            let err = fx
                .desk
                .send(&request.id, &player, SenderType::Player, content)
                .await
                .unwrap_err();
            assert!(matches!(err, ConciergeError::Validation(_)));
        }
        assert!(fx.store.list_messages(&request.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn content_is_trimmed_and_bumps_updated_at() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;

        let sent = fx
            .desk
            .send(&request.id, &player, SenderType::Player, "  Bonjour  ")
            .await
            .unwrap();
        assert_eq!(sent.content, "Bonjour");
        assert!(!sent.is_read);
        assert_eq!(sent.sender_id, "p1");

        let after = fx.desk.get(&request.id, &player).await.unwrap();
        assert!(after.updated_at > request.updated_at);
    }

    #[tokio::test]
    async fn create_then_list_is_empty_then_one() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;

        assert!(fx.desk.list_by_request(&request.id, &player).await.unwrap().is_empty());
        fx.desk
            .send(&request.id, &player, SenderType::Player, "Bonjour")
            .await
            .unwrap();
        assert_eq!(fx.desk.list_by_request(&request.id, &player).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_is_ordered_by_creation() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let concierge = Actor::concierge("c1");
        let request = fx.passport_request(&player).await;

        for i in 0..6 {
            let (actor, side) = if i % 2 == 0 {
                (&player, SenderType::Player)
            } else {
                (&concierge, SenderType::Concierge)
            };
            fx.desk
                .send(&request.id, actor, side, &format!("tour {i}"))
                .await
                .unwrap();
        }
        let listed = fx.desk.list_by_request(&request.id, &concierge).await.unwrap();
        assert_eq!(listed.len(), 6);
        assert!(listed.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert_eq!(listed[0].content, "tour 0");
        assert_eq!(listed[5].content, "tour 5");
    }

    #[tokio::test]
    async fn impersonation_is_unauthorized() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let other = Actor::player("p2");
        let concierge = Actor::concierge("c1");
        let request = fx.passport_request(&player).await;

        let err = fx
            .desk
            .send(&request.id, &player, SenderType::Concierge, "Je suis le concierge")
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Authorization { .. }));

        let err = fx
            .desk
            .send(&request.id, &concierge, SenderType::Player, "Je suis le joueur")
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Authorization { .. }));

        let err = fx
            .desk
            .send(&request.id, &other, SenderType::Player, "Bonjour")
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn player_cannot_post_to_closed_request() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let concierge = Actor::concierge("c1");
        let request = fx.passport_request(&player).await;
        fx.desk
            .transition(&request.id, &concierge, RequestStatus::Cancelled)
            .await
            .unwrap();

        let err = fx
            .desk
            .send(&request.id, &player, SenderType::Player, "Encore là ?")
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Validation(_)));

        fx.desk
            .send(&request.id, &concierge, SenderType::Concierge, "Demande annulée.")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unread_counts_follow_the_other_side() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let concierge = Actor::concierge("c1");
        let request = fx.passport_request(&player).await;
        let unread = || async {
            fx.desk
                .unread_count_for(&request.id, &player, SenderType::Player)
                .await
                .unwrap()
        };

        assert_eq!(unread().await, 0);
        fx.desk
            .send(&request.id, &concierge, SenderType::Concierge, "Bonjour !")
            .await
            .unwrap();
        assert_eq!(unread().await, 1);
        fx.desk
            .send(&request.id, &player, SenderType::Player, "Merci")
            .await
            .unwrap();
        assert_eq!(unread().await, 1);
        assert_eq!(
            fx.desk
                .unread_count_for(&request.id, &concierge, SenderType::Concierge)
                .await
                .unwrap(),
            1
        );

        assert_eq!(
            fx.desk
                .mark_read(&request.id, &player, SenderType::Player)
                .await
                .unwrap(),
            1
        );
        assert_eq!(unread().await, 0);
        assert_eq!(
            fx.desk
                .mark_read(&request.id, &player, SenderType::Player)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn send_publishes_to_subscribers() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;
        let mut sub = fx.feed.subscribe(&request.id).unwrap();

        let sent = fx
            .desk
            .send(&request.id, &player, SenderType::Player, "Bonjour")
            .await
            .unwrap();
        assert_eq!(sub.recv().await, Some(sent));
    }

    #[tokio::test]
    async fn inbox_lists_conversations_with_unread_counts() {
        let fx = Fixture::new().await;
        let alice = Actor::player("alice");
        let bob = Actor::player("bob");
        let concierge = Actor::concierge("c1");
        let quiet = fx.passport_request(&alice).await;
        let chatty = fx.passport_request(&alice).await;
        let other = fx.passport_request(&bob).await;

        fx.desk
            .set_internal_notes(&chatty.id, &concierge, "à rappeler")
            .await
            .unwrap();
        fx.desk
            .send(&chatty.id, &concierge, SenderType::Concierge, "Des nouvelles ?")
            .await
            .unwrap();
        fx.desk
            .send(&other.id, &bob, SenderType::Player, "Bonjour")
            .await
            .unwrap();

        let inbox = fx.desk.inbox(&alice, SenderType::Player).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].request.id, chatty.id);
        assert_eq!(inbox[0].unread_count, 1);
        assert_eq!(inbox[0].message_count, 1);
        assert_eq!(inbox[0].last_message.as_deref(), Some("Des nouvelles ?"));
        assert_eq!(inbox[0].request.internal_notes, None);
        assert!(inbox.iter().all(|s| s.request.id != quiet.id));

        let staff = fx.desk.inbox(&concierge, SenderType::Concierge).await.unwrap();
        assert_eq!(staff.len(), 2);
        assert_eq!(staff[0].request.id, other.id);
        assert_eq!(staff[0].unread_count, 1);
        assert_eq!(staff[1].unread_count, 0);
        assert_eq!(staff[1].request.internal_notes.as_deref(), Some("à rappeler"));
    }
}
