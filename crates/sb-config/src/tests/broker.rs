use crate::BrokerConfig;
use crate::broker_config::{MAX_PARTITIONS, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};

use googletest::assert_that;
use googletest::prelude::{anything, err, ok};

#[test]
fn given_default_broker_config_when_validated_then_ok() {
    let config = BrokerConfig::default();

    assert_that!(config.validate(), ok(anything()));
}

#[test]
fn given_missing_servers_and_topic_when_validated_then_ok() {
    // Presence of bootstrap_servers/topic is a consumer-start concern,
    // not a config-load concern.
    let config = BrokerConfig {
        bootstrap_servers: None,
        topic: None,
        ..Default::default()
    };

    assert_that!(config.validate(), ok(anything()));
}

#[test]
fn given_empty_group_id_when_validated_then_error() {
    let config = BrokerConfig {
        group_id: String::new(),
        ..Default::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_poll_interval_below_min_when_validated_then_error() {
    let config = BrokerConfig {
        poll_interval_ms: MIN_POLL_INTERVAL_MS - 1,
        ..Default::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_poll_interval_above_max_when_validated_then_error() {
    let config = BrokerConfig {
        poll_interval_ms: MAX_POLL_INTERVAL_MS + 1,
        ..Default::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_zero_partitions_when_validated_then_error() {
    let config = BrokerConfig {
        partitions: 0,
        ..Default::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_too_many_partitions_when_validated_then_error() {
    let config = BrokerConfig {
        partitions: MAX_PARTITIONS + 1,
        ..Default::default()
    };

    assert_that!(config.validate(), err(anything()));
}
