//! In-process engine running a Rust closure on a background thread
//!
//! The worker thread waits for a run request, runs the script once and
//! goes back to waiting. Session state lives on the engine and carries
//! over between runs; a fresh `start` begins a new session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use serde_json::Value;
use tracing::{debug, warn};

use super::script::{Script, ScriptContext, ScriptError, ScriptResult};
use super::{EngineResources, LifecycleEvent, RerunData, ScriptEngine};
use crate::error::{AppTestError, Result};
use crate::proto::{ForwardMsg, ScriptFinishedStatus};
use crate::session::SessionSnapshot;

#[derive(Debug, Default)]
struct RunState {
    pending: Option<RerunData>,
    running: bool,
    shutdown: bool,
    run_count: u64,
    events: Vec<LifecycleEvent>,
    widgets: HashMap<String, Value>,
    user: HashMap<String, Value>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<RunState>,
    wake: Condvar,
    /// Checked by the script at every context call
    stop: Arc<AtomicBool>,
    queue: Arc<Mutex<Vec<ForwardMsg>>>,
}

pub struct LocalScriptEngine {
    script: Script,
    resources: EngineResources,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl LocalScriptEngine {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&mut ScriptContext) -> ScriptResult<()> + Send + Sync + 'static,
    {
        Self::from_script(Arc::new(script))
    }

    pub fn from_script(script: Script) -> Self {
        Self {
            script,
            resources: EngineResources::default(),
            shared: Arc::new(Shared::default()),
            handle: None,
        }
    }

    /// Share a script cache and upload store with this engine
    pub fn with_resources(mut self, resources: EngineResources) -> Self {
        self.resources = resources;
        self
    }

    pub fn resources(&self) -> &EngineResources {
        &self.resources
    }
}

impl ScriptEngine for LocalScriptEngine {
    fn name(&self) -> &str {
        "local"
    }

    fn start(&mut self, rerun: RerunData) -> Result<()> {
        if self.handle.is_some() {
            return Err(AppTestError::Engine {
                reason: "engine already started".to_string(),
            });
        }

        self.shared.stop.store(false, Ordering::SeqCst);
        self.shared.queue.lock().clear();
        *self.shared.state.lock() = RunState {
            pending: Some(rerun),
            ..Default::default()
        };

        let shared = Arc::clone(&self.shared);
        let script = Arc::clone(&self.script);
        let resources = self.resources.clone();
        let handle = std::thread::Builder::new()
            .name("apptest-script".to_string())
            .spawn(move || worker_loop(shared, script, resources))?;
        self.handle = Some(handle);
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.handle.is_some()
    }

    fn request_rerun(&mut self, rerun: RerunData) -> Result<()> {
        if self.handle.is_none() {
            return Err(AppTestError::Engine {
                reason: "engine not started".to_string(),
            });
        }

        let mut state = self.shared.state.lock();
        if state.running {
            // The live run ends early and reports StoppedForRerun
            self.shared.stop.store(true, Ordering::SeqCst);
        } else {
            state.events.clear();
            self.shared.queue.lock().clear();
        }
        state.pending = Some(rerun);
        self.shared.wake.notify_all();
        Ok(())
    }

    fn request_stop(&mut self) {
        let mut state = self.shared.state.lock();
        state.shutdown = true;
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.wake.notify_all();
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Without a prior stop request the worker would wait forever
            self.request_stop();
            if handle.join().is_err() {
                warn!(engine = self.name(), "script thread panicked");
            }
        }
    }

    fn lifecycle_events(&self) -> Vec<LifecycleEvent> {
        self.shared.state.lock().events.clone()
    }

    fn forward_msgs(&self) -> Vec<ForwardMsg> {
        self.shared.queue.lock().clone()
    }

    fn session_snapshot(&self) -> SessionSnapshot {
        let state = self.shared.state.lock();
        let mut snapshot = SessionSnapshot::new();
        for (id, value) in &state.widgets {
            snapshot.insert_widget(id.clone(), value.clone());
        }
        for (key, value) in &state.user {
            snapshot.insert_user(key.clone(), value.clone());
        }
        snapshot
    }
}

impl Drop for LocalScriptEngine {
    fn drop(&mut self) {
        self.join();
    }
}

fn worker_loop(shared: Arc<Shared>, script: Script, resources: EngineResources) {
    loop {
        let (rerun, previous, user, run_id) = {
            let mut state = shared.state.lock();
            while state.pending.is_none() && !state.shutdown {
                shared.wake.wait(&mut state);
            }
            if state.shutdown {
                break;
            }
            let Some(rerun) = state.pending.take() else {
                continue;
            };
            // Stop flag is only reset while holding the state lock
            shared.stop.store(false, Ordering::SeqCst);
            state.running = true;
            state.run_count += 1;
            state.events.clear();
            state.events.push(LifecycleEvent::ScriptStarted);
            (rerun, state.widgets.clone(), state.user.clone(), state.run_count)
        };

        {
            let mut queue = shared.queue.lock();
            queue.clear();
            queue.push(ForwardMsg::new_session(format!("run-{run_id}")));
        }

        let started = Instant::now();
        let mut ctx = ScriptContext::new(
            Arc::clone(&shared.queue),
            Arc::clone(&shared.stop),
            resources.clone(),
            rerun.widget_states,
            previous,
            user,
        );
        let outcome = script(&mut ctx);
        debug!(run_id, elapsed_ms = started.elapsed().as_millis() as u64, ?outcome, "script run ended");

        let event = match &outcome {
            Ok(()) => Some(LifecycleEvent::StoppedWithSuccess),
            Err(err @ ScriptError::Compile(_)) => {
                ctx.report_error(err);
                Some(LifecycleEvent::StoppedWithCompileError)
            }
            Err(err @ (ScriptError::Runtime(_) | ScriptError::DuplicateWidgetId(_))) => {
                ctx.report_error(err);
                Some(LifecycleEvent::StoppedWithSuccess)
            }
            Err(ScriptError::Stopped) => {
                let state = shared.state.lock();
                if state.shutdown {
                    None
                } else {
                    Some(LifecycleEvent::StoppedForRerun)
                }
            }
        };

        let finished = match event {
            Some(LifecycleEvent::StoppedWithCompileError) => {
                Some(ScriptFinishedStatus::FinishedWithCompileError)
            }
            Some(LifecycleEvent::StoppedForRerun) => Some(ScriptFinishedStatus::FinishedEarlyForRerun),
            Some(_) => Some(ScriptFinishedStatus::FinishedSuccessfully),
            None => None,
        };
        if let Some(status) = finished {
            shared.queue.lock().push(ForwardMsg::script_finished(status));
        }

        let commit = matches!(event, Some(LifecycleEvent::StoppedWithSuccess));
        let (widgets, user) = ctx.into_state();
        let mut state = shared.state.lock();
        if commit {
            state.widgets = widgets;
            state.user = user;
        }
        state.running = false;
        match event {
            Some(event) => state.events.push(event),
            None => break,
        }
    }

    shared.state.lock().events.push(LifecycleEvent::Shutdown);
    debug!("script thread exiting");
}
