//! Test fixtures and helpers

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use apptest::proto::{ElementProto, ForwardMsg, TextProto};
use apptest::{parse_tree_from_messages, AppTest, AppTestConfig, AppTree, SessionSnapshot};
use serde_json::{json, Value};

/// Get path to test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get path to a specific fixture file
pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}

/// Tree built from `msgs` with an empty session
pub fn build(msgs: &[ForwardMsg]) -> AppTree {
    apptest::logging::init_tracing();
    parse_tree_from_messages(msgs, Arc::new(SessionSnapshot::new())).unwrap()
}

pub fn text_msg(path: Vec<usize>, body: &str) -> ForwardMsg {
    ForwardMsg::new_element(
        path,
        ElementProto::Text(TextProto {
            body: body.into(),
            ..Default::default()
        }),
    )
}

/// Fast polling, generous timeout
pub fn test_config() -> AppTestConfig {
    AppTestConfig::testing().with_default_timeout(Duration::from_secs(5))
}

pub fn options(labels: &[&str]) -> Vec<Value> {
    labels.iter().map(|l| json!(l)).collect()
}

/// Three radios with options a/b/c, each defaulting to "a"
pub fn radio_app() -> AppTest {
    apptest::logging::init_tracing();
    AppTest::from_script(|ctx| {
        let opts = options(&["a", "b", "c"]);
        ctx.radio("first", &opts, Some(0), None)?;
        ctx.radio("second", &opts, Some(0), None)?;
        ctx.radio("third", &opts, Some(0), None)?;
        Ok(())
    })
    .with_config(test_config())
}

/// `conditional` only exists while `cb` is "on"
pub fn conditional_app() -> AppTest {
    apptest::logging::init_tracing();
    AppTest::from_script(|ctx| {
        let toggle = ctx.radio("toggle", &options(&["off", "on"]), Some(0), Some("cb"))?;
        if toggle == Some(json!("on")) {
            ctx.radio(
                "conditional",
                &options(&["a", "b", "c"]),
                Some(0),
                Some("conditional"),
            )?;
        }
        Ok(())
    })
    .with_config(test_config())
}
