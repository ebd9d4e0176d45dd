//! AppTest - headless test harness for script-driven UI apps
//!
//! Runs an app script through a [`ScriptEngine`], rebuilds the rendered
//! element tree from the engine's delta messages, and lets tests query
//! widgets, set their values and rerun.
//!
//! ```no_run
//! use apptest::AppTest;
//! use serde_json::json;
//!
//! let at = AppTest::from_script(|ctx| {
//!     let choice = ctx.radio("pick", &[json!("a"), json!("b")], Some(0), Some("pick"))?;
//!     ctx.text(&format!("picked {}", choice.unwrap_or_default()))?;
//!     Ok(())
//! });
//!
//! let tree = at.run()?;
//! tree.radio().by_key("pick")?.set_value("b");
//! let tree = tree.run()?;
//! assert_eq!(tree.text()[0].value(), "picked \"b\"");
//! # Ok::<(), apptest::AppTestError>(())
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod proto;
pub mod session;
pub mod tree;
pub mod value;

pub use app_test::AppTest;
pub use codec::WidgetStateCodec;
pub use config::AppTestConfig;
pub use engine::{
    LifecycleEvent, LocalScriptEngine, RerunData, ScriptContext, ScriptEngine, ScriptError,
    ScriptResult,
};
pub use error::{AppTestError, FixSuggestion, Result};
pub use proto::{ForwardMsg, WidgetState, WidgetStateValue, WidgetStates};
pub use session::SessionSnapshot;
pub use tree::{
    parse_tree_from_messages, AppTree, Block, Element, ElementList, Node, NodeRef, Overlay,
    ResolveValue, Widget, WidgetList,
};
pub use value::{DateValue, RangeValue};
