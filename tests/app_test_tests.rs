//! # Run/Rerun Tests
//!
//! Drives scripts through the in-process engine:
//! - widget declaration order and container nesting
//! - overlay -> rerun interaction (Scenario A)
//! - widgets appearing and disappearing between runs (Scenario B)
//! - timeout and forced stop (Scenario C)
//! - session state snapshots per run

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use apptest::{AppTest, AppTestError, ScriptError, Widget};
use common::{conditional_app, options, radio_app, test_config};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ============================================================================
// DECLARATION ORDER
// ============================================================================

#[test]
fn test_widgets_script_preorder() {
    let at = AppTest::from_script(|ctx| {
        ctx.title("Widgets")?;
        ctx.columns(2, |idx, ctx| {
            if idx == 0 {
                ctx.button("left", None)?;
            } else {
                ctx.checkbox("right", true, None)?;
            }
            Ok(())
        })?;
        ctx.expander("more", |ctx| {
            ctx.text_input("name", "anon", None, Some("name"))?;
            ctx.expander("nested", |ctx| ctx.markdown("deep"))
        })?;
        ctx.tabs(&["one", "two"], |idx, ctx| ctx.text(format!("tab {idx}")))?;
        ctx.sidebar(|ctx| ctx.selectbox("pick", &options(&["x", "y"]), Some(1), None))?;
        ctx.divider()?;
        Ok(())
    })
    .with_config(test_config());

    let tree = at.run().unwrap();
    let tags: Vec<&str> = tree.iter().map(|n| n.type_tag()).collect();
    assert_eq!(
        tags,
        vec![
            "root",
            "main",
            "title",
            "horizontal",
            "column",
            "button",
            "column",
            "checkbox",
            "expandable",
            "text_input",
            "expandable",
            "markdown",
            "tab_container",
            "tab",
            "text",
            "tab",
            "text",
            "divider",
            "sidebar",
            "selectbox",
        ]
    );
    assert_eq!(tree.expanders().len(), 2);
    assert_eq!(tree.expanders()[1].markdown()[0].value(), "deep");
    assert_eq!(tree.tabs()[1].text()[0].value(), "tab 1");
    assert_eq!(
        tree.sidebar().unwrap().selectbox()[0].value().unwrap(),
        Some(json!("y"))
    );
    assert!(tree.checkbox()[0].value().unwrap());
    at.join();
}

#[test]
fn test_form_widgets_carry_form_id() {
    let at = AppTest::from_script(|ctx| {
        ctx.form("signup", |ctx| {
            ctx.text_input("email", "", None, None)?;
            ctx.button("submit", None)?;
            Ok(())
        })?;
        ctx.checkbox("outside", false, None)?;
        Ok(())
    })
    .with_config(test_config());

    let tree = at.run().unwrap();
    assert_eq!(tree.forms().len(), 1);
    assert_eq!(tree.text_input()[0].form_id(), "signup");
    assert_eq!(tree.button()[0].form_id(), "signup");
    assert_eq!(tree.checkbox()[0].form_id(), "");
    at.join();
}

// ============================================================================
// SCENARIO A: overlay on one of several radios
// ============================================================================

#[test]
fn test_radio_overlay_only_changes_that_widget() {
    let at = radio_app();
    let tree = at.run().unwrap();

    let values: Vec<Option<Value>> = tree.radio().values().unwrap();
    assert_eq!(values, vec![Some(json!("a")); 3]);

    tree.radio()[0].set_value("b");
    let tree = tree.run().unwrap();

    let radios = tree.radio();
    assert_eq!(radios[0].value().unwrap(), Some(json!("b")));
    assert_eq!(radios[0].index().unwrap(), Some(1));
    assert_eq!(radios[1].value().unwrap(), Some(json!("a")));
    assert_eq!(radios[2].value().unwrap(), Some(json!("a")));
    at.join();
}

#[test]
fn test_overlay_is_not_carried_forward() {
    let at = radio_app();
    let tree = at.run().unwrap();
    tree.radio()[1].set_value("c");

    let next = tree.run().unwrap();
    assert!(!next.radio()[1].has_overlay());
    // the engine keeps the value, the new tree reports it from session state
    assert_eq!(next.radio()[1].value().unwrap(), Some(json!("c")));
    at.join();
}

// ============================================================================
// SCENARIO B: conditional widget
// ============================================================================

#[test]
fn test_conditional_widget_added_and_removed() {
    let at = conditional_app();

    let tree = at.run().unwrap();
    assert!(matches!(
        tree.radio().by_key("conditional"),
        Err(AppTestError::KeyNotFound { .. })
    ));

    tree.radio().by_key("cb").unwrap().set_value("on");
    let tree = tree.run().unwrap();
    let conditional = tree.radio().by_key("conditional").unwrap();
    assert_eq!(conditional.value().unwrap(), Some(json!("a")));

    tree.radio().by_key("cb").unwrap().set_value("off");
    let tree = tree.run().unwrap();
    assert!(tree.widget("conditional").is_err());
    assert!(tree.session_state().get("conditional").is_none());
    at.join();
}

// ============================================================================
// SCENARIO C: timeout
// ============================================================================

#[test]
fn test_timeout_then_join_is_immediate() {
    let at = AppTest::from_script(|ctx| {
        ctx.text("sleeping")?;
        ctx.sleep(Duration::from_secs(30))
    })
    .with_config(test_config());

    let started = Instant::now();
    let err = at.run_with_timeout(Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, AppTestError::Timeout { timeout_ms: 100 }));
    assert!(started.elapsed() < Duration::from_secs(5));

    let join_started = Instant::now();
    at.join();
    assert!(join_started.elapsed() < Duration::from_millis(200));
}

#[test]
fn test_run_after_timeout_starts_fresh() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let at = AppTest::from_script(move |ctx| {
        // only the first run hangs
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            ctx.sleep(Duration::from_secs(30))?;
        }
        ctx.text("done")
    })
    .with_config(test_config());

    assert!(at.run_with_timeout(Duration::from_millis(50)).is_err());
    let tree = at.run().unwrap();
    assert_eq!(tree.text()[0].value(), "done");
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    at.join();
}

// ============================================================================
// SESSION STATE
// ============================================================================

#[test]
fn test_session_snapshots_are_per_run() {
    let at = AppTest::from_script(|ctx| {
        let choice = ctx.radio("r", &options(&["a", "b"]), Some(0), Some("r"))?;
        if ctx.state("other").is_none() {
            ctx.set_state("other", json!(5));
        }
        if choice == Some(json!("b")) {
            ctx.set_state("other", json!(10));
        }
        Ok(())
    })
    .with_config(test_config());

    let first = at.run().unwrap();
    assert_eq!(first.session_state().get("other"), Some(&json!(5)));

    first.radio()[0].set_value("b");
    let second = first.run().unwrap();
    assert_eq!(second.session_state().get("other"), Some(&json!(10)));
    assert_eq!(second.session_state().get("r"), Some(&json!("b")));

    second.radio()[0].set_value("a");
    let third = second.run().unwrap();
    assert_eq!(third.session_state().get("other"), Some(&json!(10)));

    // earlier snapshots are untouched by later runs
    assert_eq!(first.session_state().get("other"), Some(&json!(5)));
    assert_eq!(first.session_state().get("r"), Some(&json!("a")));
    at.join();
}

#[test]
fn test_int_options_round_trip() {
    let at = AppTest::from_script(|ctx| {
        let n = ctx.radio("n", &[json!(1), json!(2), json!(3)], Some(0), Some("n"))?;
        ctx.text(format!("n = {}", n.unwrap_or_default()))
    })
    .with_config(test_config());

    let tree = at.run().unwrap();
    assert_eq!(tree.radio()[0].options(), &["1", "2", "3"]);
    assert_eq!(tree.radio()[0].value().unwrap(), Some(json!(1)));

    tree.radio()[0].set_value(3);
    let tree = tree.run().unwrap();
    assert_eq!(tree.radio()[0].value().unwrap(), Some(json!(3)));
    assert_eq!(tree.text()[0].value(), "n = 3");
    at.join();
}

#[test]
fn test_button_trigger_lasts_one_run() {
    let at = AppTest::from_script(|ctx| {
        let clicked = ctx.button("go", Some("go"))?;
        ctx.text(if clicked { "clicked" } else { "idle" })
    })
    .with_config(test_config());

    let tree = at.run().unwrap();
    assert_eq!(tree.text()[0].value(), "idle");

    tree.button().by_key("go").unwrap().click();
    let tree = tree.run().unwrap();
    assert_eq!(tree.text()[0].value(), "clicked");
    assert!(tree.button()[0].value().unwrap());

    let tree = tree.run().unwrap();
    assert_eq!(tree.text()[0].value(), "idle");
    at.join();
}

#[test]
fn test_user_key_ending_in_none_is_found() {
    let at = AppTest::from_script(|ctx| {
        ctx.radio("opt", &options(&["a", "b"]), Some(0), Some("opt-None"))?;
        ctx.radio("anon", &options(&["a", "b"]), Some(0), None)?;
        Ok(())
    })
    .with_config(test_config());

    let tree = at.run().unwrap();
    let radio = tree.radio().by_key("opt-None").unwrap();
    assert_eq!(radio.key(), Some("opt-None"));
    assert_eq!(tree.radio()[1].key(), None);

    radio.set_value("b");
    let tree = tree.run().unwrap();
    assert_eq!(
        tree.radio().by_key("opt-None").unwrap().value().unwrap(),
        Some(json!("b"))
    );
    at.join();
}

// ============================================================================
// SCRIPT ERRORS
// ============================================================================

#[test]
fn test_runtime_error_rendered_as_exception() {
    let at = AppTest::from_script(|ctx| {
        ctx.text("before")?;
        Err(ScriptError::runtime("division by zero"))
    })
    .with_config(test_config());

    let tree = at.run().unwrap();
    assert_eq!(tree.text().len(), 1);
    let exception = &tree.exception()[0];
    assert!(exception.value().contains("division by zero"));
    at.join();
}

#[test]
fn test_duplicate_widget_id_reported() {
    let at = AppTest::from_script(|ctx| {
        ctx.checkbox("same", false, None)?;
        ctx.checkbox("same", false, None)?;
        Ok(())
    })
    .with_config(test_config());

    let tree = at.run().unwrap();
    assert_eq!(tree.checkbox().len(), 1);
    assert_eq!(tree.exception().len(), 1);
    at.join();
}

#[test]
fn test_unlinked_tree_errors_on_run() {
    let tree = common::build(&[]);
    let err = tree.run().unwrap_err();
    assert_eq!(err.code(), "APPTEST-032");
}
