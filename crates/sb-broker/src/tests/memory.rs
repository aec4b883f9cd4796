use crate::{BrokerError, BrokerSettings, ConsumerFactory, MemoryBroker, StatsConsumer};

use std::time::Duration;

use sb_config::BrokerConfig;

const TOPIC: &str = "weblog-stats";

fn test_settings() -> BrokerSettings {
    let config = BrokerConfig {
        bootstrap_servers: Some(String::from("in-process")),
        topic: Some(String::from(TOPIC)),
        ..Default::default()
    };
    BrokerSettings::from_config(&config).unwrap()
}

async fn subscribed_consumer(broker: &MemoryBroker) -> Box<dyn StatsConsumer> {
    let mut consumer = broker
        .consumer_factory()
        .create(&test_settings())
        .await
        .unwrap();
    consumer.subscribe(TOPIC).await.unwrap();
    consumer
}

#[tokio::test]
async fn given_published_records_when_polled_then_all_received() {
    let broker = MemoryBroker::new(4);
    let mut consumer = subscribed_consumer(&broker).await;

    broker.publish(TOPIC, None, "m1").unwrap();
    broker.publish(TOPIC, None, "m2").unwrap();

    let batch = consumer.poll(Duration::from_millis(100)).await.unwrap();

    let values: Vec<&str> = batch.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values.len(), 2);
    assert!(values.contains(&"m1"));
    assert!(values.contains(&"m2"));
}

#[tokio::test]
async fn given_empty_topic_when_polled_then_empty_batch_within_bound() {
    let broker = MemoryBroker::new(4);
    let mut consumer = subscribed_consumer(&broker).await;

    let started = std::time::Instant::now();
    let batch = consumer.poll(Duration::from_millis(50)).await.unwrap();

    assert!(batch.is_empty());
    // Bounded poll: returns around the timeout, not immediately-forever
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn given_publish_during_poll_when_waiting_then_woken_early() {
    let broker = MemoryBroker::new(4);
    let mut consumer = subscribed_consumer(&broker).await;

    let producer = broker.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        producer.publish(TOPIC, None, "late").unwrap();
    });

    let batch = consumer.poll(Duration::from_secs(2)).await.unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].value, "late");
}

#[tokio::test]
async fn given_keyed_publish_when_routed_then_partition_matches_strategy() {
    let broker = MemoryBroker::new(4);

    assert_eq!(broker.publish(TOPIC, Some("10.0.0.6"), "a").unwrap(), 2);
    assert_eq!(broker.publish(TOPIC, Some("10.0.0.8"), "b").unwrap(), 0);
}

#[tokio::test]
async fn given_invalid_key_when_published_then_send_aborts() {
    let broker = MemoryBroker::new(4);
    let mut consumer = subscribed_consumer(&broker).await;

    let result = broker.publish(TOPIC, Some("host.name"), "bad");
    assert!(matches!(
        result.unwrap_err(),
        BrokerError::InvalidPartitionKey { .. }
    ));

    // Nothing was enqueued
    let batch = consumer.poll(Duration::from_millis(20)).await.unwrap();
    assert!(batch.is_empty());
}

#[tokio::test]
async fn given_keyless_publishes_when_routed_then_rotate_partitions() {
    let broker = MemoryBroker::new(3);

    let first = broker.publish(TOPIC, None, "a").unwrap();
    let second = broker.publish(TOPIC, None, "b").unwrap();
    let third = broker.publish(TOPIC, None, "c").unwrap();

    assert_ne!(first, second);
    assert_ne!(second, third);
}

#[tokio::test]
async fn given_closed_consumer_when_used_then_closed_error() {
    let broker = MemoryBroker::new(4);
    let mut consumer = subscribed_consumer(&broker).await;

    consumer.close().await.unwrap();

    let result = consumer.poll(Duration::from_millis(10)).await;
    assert!(matches!(result.unwrap_err(), BrokerError::Closed { .. }));
}

#[tokio::test]
async fn given_unsubscribed_consumer_when_polled_then_configuration_error() {
    let broker = MemoryBroker::new(4);
    let mut consumer = broker
        .consumer_factory()
        .create(&test_settings())
        .await
        .unwrap();

    let result = consumer.poll(Duration::from_millis(10)).await;
    assert!(matches!(
        result.unwrap_err(),
        BrokerError::Configuration { .. }
    ));
}

#[test]
fn given_config_without_topic_when_resolved_then_configuration_error() {
    let config = BrokerConfig {
        bootstrap_servers: Some(String::from("localhost:9092")),
        topic: None,
        ..Default::default()
    };

    let result = BrokerSettings::from_config(&config);
    assert!(matches!(
        result.unwrap_err(),
        BrokerError::Configuration { .. }
    ));
}

#[test]
fn given_config_without_servers_when_resolved_then_configuration_error() {
    let config = BrokerConfig {
        bootstrap_servers: None,
        topic: Some(String::from(TOPIC)),
        ..Default::default()
    };

    let result = BrokerSettings::from_config(&config);
    assert!(matches!(
        result.unwrap_err(),
        BrokerError::Configuration { .. }
    ));
}
