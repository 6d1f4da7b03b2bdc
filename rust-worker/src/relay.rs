//! Relay wiring: queue → handler → sink.

use std::sync::Arc;

use tracing::info;

use crate::error::TransportError;
use crate::handler::MessageHandler;
use crate::queue::{callback, MessageQueue};

/// Subscribe `handler` to `queue_name` on `queue`.
///
/// Transport failures while subscribing are returned; failures while
/// handling individual messages are not, they go to the handler's
/// diagnostics channel.
pub async fn bind<Q>(
    queue: &Q,
    queue_name: &str,
    handler: Arc<MessageHandler>,
) -> Result<(), TransportError>
where
    Q: MessageQueue + ?Sized,
{
    let endpoint = handler.endpoint().to_string();

    queue
        .subscribe(
            queue_name,
            callback(move |message: String| {
                let handler = Arc::clone(&handler);
                async move { handler.handle(&message).await }
            }),
        )
        .await?;

    info!(queue = %queue_name, endpoint = %endpoint, "relay_bound");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingDiagnostics, Diagnostics};
    use crate::message::{decode, transform};
    use crate::queue::InMemoryQueue;
    use crate::sink::{RecordingSink, Sink};

    const QUEUE_NAME: &str = "test-queue";
    const API_PATH: &str = "/process-data";

    fn sample(id: &str) -> String {
        serde_json::json!({
            "id": id,
            "timestamp": "2024-05-01T10:00:00.000Z",
            "data": {
                "type": "user_action",
                "details": { "action": "login", "userId": "User101" }
            }
        })
        .to_string()
    }

    struct Fixture {
        queue: InMemoryQueue,
        sink: Arc<RecordingSink>,
        diagnostics: Arc<CollectingDiagnostics>,
    }

    async fn fixture() -> Fixture {
        let queue = InMemoryQueue::new();
        let sink = Arc::new(RecordingSink::new());
        let diagnostics = Arc::new(CollectingDiagnostics::new());
        let handler = Arc::new(MessageHandler::with_diagnostics(
            Arc::clone(&sink) as Arc<dyn Sink>,
            API_PATH,
            Arc::clone(&diagnostics) as Arc<dyn Diagnostics>,
        ));
        bind(&queue, QUEUE_NAME, handler).await.unwrap();
        Fixture {
            queue,
            sink,
            diagnostics,
        }
    }

    #[tokio::test]
    async fn test_message_is_transformed_and_delivered() {
        let f = fixture().await;
        let message = sample("12345");

        f.queue.publish(QUEUE_NAME, message.clone()).await.unwrap();
        f.queue.flush().await;

        let calls = f.sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, API_PATH);
        assert_eq!(calls[0].payload, transform(&decode(&message).unwrap()));
        assert!(f.diagnostics.is_empty());

        f.queue.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_message_is_isolated() {
        let f = fixture().await;

        f.queue.publish(QUEUE_NAME, "{invalid-json}".to_string()).await.unwrap();
        f.queue.flush().await;

        assert!(f.sink.calls().is_empty());
        assert_eq!(f.diagnostics.len(), 1);

        // Relay is still usable.
        f.queue.publish(QUEUE_NAME, sample("after")).await.unwrap();
        f.queue.flush().await;
        assert_eq!(f.sink.event_ids(), vec!["after"]);

        f.queue.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_order_is_preserved() {
        let f = fixture().await;

        for id in ["1", "2", "3"] {
            f.queue.publish(QUEUE_NAME, sample(id)).await.unwrap();
        }
        f.queue.flush().await;

        assert_eq!(f.sink.event_ids(), vec!["1", "2", "3"]);

        f.queue.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_order_preserved_across_mixed_failures() {
        let f = fixture().await;

        f.queue.publish(QUEUE_NAME, sample("1")).await.unwrap();
        f.queue.publish(QUEUE_NAME, "garbage".to_string()).await.unwrap();
        f.queue.publish(QUEUE_NAME, sample("2")).await.unwrap();
        f.queue.publish(QUEUE_NAME, sample("3")).await.unwrap();
        f.queue.flush().await;

        assert_eq!(f.sink.event_ids(), vec!["1", "2", "3"]);
        assert_eq!(f.diagnostics.len(), 1);

        f.queue.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_nothing_delivered_after_close() {
        let f = fixture().await;
        f.queue.close().await.unwrap();

        f.queue.publish(QUEUE_NAME, sample("1")).await.unwrap();
        f.queue.flush().await;

        assert!(f.sink.calls().is_empty());
        assert!(f.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_sink_outage_does_not_stop_relay() {
        let f = fixture().await;

        f.sink.set_fail(true);
        f.queue.publish(QUEUE_NAME, sample("lost")).await.unwrap();
        f.queue.flush().await;
        f.sink.set_fail(false);
        f.queue.publish(QUEUE_NAME, sample("kept")).await.unwrap();
        f.queue.flush().await;

        assert_eq!(f.sink.event_ids(), vec!["kept"]);
        assert_eq!(f.diagnostics.reports()[0].kind, "relay_message_delivery_failed");

        f.queue.close().await.unwrap();
    }
}
