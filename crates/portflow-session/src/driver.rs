//! The session loop and its handle.

use crate::error::SessionError;
use crate::llm::{LlmClient, LlmError};
use portflow_core::{
    DebounceTimer, LlmRequest, Notification, Outcome, PortRuntime, PortflowError, RetryPolicy,
    SubscriptionId, WidgetResult,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Queued commands per session before callers wait.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, PortflowError>>;

/// Requests from a [`SessionHandle`].
enum Command {
    Mount {
        widget: String,
        initial: BTreeMap<String, Value>,
        reply: Reply<()>,
    },
    Unmount {
        widget: String,
        reply: Reply<()>,
    },
    Emit {
        widget: String,
        port: String,
        value: Value,
        reply: Reply<()>,
    },
    Confirm {
        widget: String,
        reply: Reply<()>,
    },
    Read {
        path: String,
        reply: Reply<Value>,
    },
    Subscribe {
        path: String,
        sender: mpsc::UnboundedSender<Notification>,
        reply: Reply<SubscriptionId>,
    },
    Unsubscribe {
        id: SubscriptionId,
        reply: Reply<bool>,
    },
    GetResult {
        widget: String,
        timestamp: u64,
        reply: Reply<WidgetResult>,
    },
    Shutdown,
}

/// Reports from timer and `llm` tasks.
enum Event {
    DebounceFired { binding_id: String, seq: u64 },
    LlmCompleted { ticket: u64, result: Result<Value, LlmError> },
}

/// A live port subscription.
#[derive(Debug)]
pub struct Subscription {
    /// Pass to [`SessionHandle::unsubscribe`].
    pub id: SubscriptionId,
    /// Every write to the subscribed port, in order.
    pub updates: mpsc::UnboundedReceiver<Notification>,
}

// =============================================================================
// SESSION
// =============================================================================

/// Starts session loops.
pub struct Session;

impl Session {
    /// Spawn a loop owning `runtime` and return its handle.
    ///
    /// The loop stops when every handle is dropped or on
    /// [`SessionHandle::shutdown`]. Must be called inside a tokio runtime.
    pub fn spawn<L: LlmClient>(runtime: PortRuntime, llm: L) -> SessionHandle {
        Self::spawn_with_buffer(runtime, llm, DEFAULT_COMMAND_BUFFER)
    }

    /// Spawn a loop with a custom command buffer size.
    pub fn spawn_with_buffer<L: LlmClient>(
        runtime: PortRuntime,
        llm: L,
        buffer: usize,
    ) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(buffer.max(1));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = SessionLoop {
            retry: runtime.config().retry,
            runtime,
            llm: Arc::new(llm),
            events: events_tx,
            debounces: BTreeMap::new(),
            llm_tasks: BTreeMap::new(),
            subscribers: BTreeMap::new(),
        };
        tokio::spawn(session.run(commands_rx, events_rx));
        SessionHandle { commands: commands_tx }
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable client of one session loop.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    async fn call<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        match response.await {
            Ok(result) => result.map_err(SessionError::from),
            Err(_) => Err(SessionError::Closed),
        }
    }

    /// Mount a widget with optional initial port values.
    pub async fn mount(
        &self,
        widget: &str,
        initial: BTreeMap<String, Value>,
    ) -> Result<(), SessionError> {
        let widget = widget.to_string();
        self.call(|reply| Command::Mount {
            widget,
            initial,
            reply,
        })
        .await
    }

    /// Unmount a widget, cancelling its pending work.
    pub async fn unmount(&self, widget: &str) -> Result<(), SessionError> {
        let widget = widget.to_string();
        self.call(|reply| Command::Unmount { widget, reply }).await
    }

    /// Write a port. Realtime propagation has finished when this returns.
    pub async fn emit(&self, widget: &str, port: &str, value: Value) -> Result<(), SessionError> {
        let (widget, port) = (widget.to_string(), port.to_string());
        self.call(|reply| Command::Emit {
            widget,
            port,
            value,
            reply,
        })
        .await
    }

    /// Flush the widget's `on_confirm` bindings.
    pub async fn confirm(&self, widget: &str) -> Result<(), SessionError> {
        let widget = widget.to_string();
        self.call(|reply| Command::Confirm { widget, reply }).await
    }

    /// Read a `widget.port` value.
    pub async fn read(&self, path: &str) -> Result<Value, SessionError> {
        let path = path.to_string();
        self.call(|reply| Command::Read { path, reply }).await
    }

    /// Subscribe to writes of a `widget.port`.
    pub async fn subscribe(&self, path: &str) -> Result<Subscription, SessionError> {
        let path = path.to_string();
        let (sender, updates) = mpsc::unbounded_channel();
        let id = self
            .call(|reply| Command::Subscribe {
                path,
                sender,
                reply,
            })
            .await?;
        Ok(Subscription { id, updates })
    }

    /// Stop a subscription. Returns `false` if it did not exist.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, SessionError> {
        self.call(|reply| Command::Unsubscribe { id, reply }).await
    }

    /// Snapshot a mounted widget.
    pub async fn get_result(
        &self,
        widget: &str,
        timestamp: u64,
    ) -> Result<WidgetResult, SessionError> {
        let widget = widget.to_string();
        self.call(|reply| Command::GetResult {
            widget,
            timestamp,
            reply,
        })
        .await
    }

    /// Stop the loop and abort its pending tasks.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

// =============================================================================
// LOOP
// =============================================================================

struct SessionLoop<L> {
    runtime: PortRuntime,
    retry: RetryPolicy,
    llm: Arc<L>,
    events: mpsc::UnboundedSender<Event>,
    /// Latest window task per binding.
    debounces: BTreeMap<String, JoinHandle<()>>,
    /// In-flight calls per ticket.
    llm_tasks: BTreeMap<u64, JoinHandle<()>>,
    subscribers: BTreeMap<SubscriptionId, mpsc::UnboundedSender<Notification>>,
}

impl<L: LlmClient> SessionLoop<L> {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        info!("Session started");
        loop {
            tokio::select! {
                biased;
                Some(event) = events.recv() => self.on_event(event),
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.on_command(command),
                },
            }
        }
        for (_, task) in std::mem::take(&mut self.debounces) {
            task.abort();
        }
        for (_, task) in std::mem::take(&mut self.llm_tasks) {
            task.abort();
        }
        info!("Session stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Mount {
                widget,
                initial,
                reply,
            } => {
                let _ = reply.send(self.runtime.mount(&widget, initial));
            }
            Command::Unmount { widget, reply } => {
                let result = self.runtime.unmount(&widget).map(|o| self.apply(o));
                let _ = reply.send(result);
            }
            Command::Emit {
                widget,
                port,
                value,
                reply,
            } => {
                let result = self.runtime.emit(&widget, &port, value).map(|o| self.apply(o));
                let _ = reply.send(result);
            }
            Command::Confirm { widget, reply } => {
                let result = self.runtime.confirm(&widget).map(|o| self.apply(o));
                let _ = reply.send(result);
            }
            Command::Read { path, reply } => {
                let _ = reply.send(self.runtime.read(&path));
            }
            Command::Subscribe {
                path,
                sender,
                reply,
            } => {
                let result = self.runtime.subscribe(&path).inspect(|id| {
                    self.subscribers.insert(*id, sender);
                });
                let _ = reply.send(result);
            }
            Command::Unsubscribe { id, reply } => {
                self.subscribers.remove(&id);
                let _ = reply.send(Ok(self.runtime.unsubscribe(id)));
            }
            Command::GetResult {
                widget,
                timestamp,
                reply,
            } => {
                let _ = reply.send(self.runtime.get_result(&widget, timestamp));
            }
            Command::Shutdown => {}
        }
    }

    fn on_event(&mut self, event: Event) {
        let result = match event {
            Event::DebounceFired { binding_id, seq } => {
                self.debounces.remove(&binding_id);
                self.runtime.fire_debounce(&binding_id, seq)
            }
            Event::LlmCompleted { ticket, result } => {
                self.llm_tasks.remove(&ticket);
                match result {
                    Ok(value) => self.runtime.resolve_llm(ticket, value),
                    Err(e) => self.runtime.fail_llm(ticket, &e.to_string()),
                }
            }
        };
        match result {
            Ok(outcome) => self.apply(outcome),
            Err(e) => warn!(error = %e, "Deferred propagation failed"),
        }
    }

    /// Perform the effects a runtime call asked for.
    fn apply(&mut self, outcome: Outcome) {
        debug!(
            writes = outcome.writes.len(),
            timers = outcome.timers.len(),
            llm = outcome.llm_requests.len(),
            cancelled = outcome.cancelled.len(),
            "Applying outcome"
        );
        for ticket in outcome.cancelled {
            if let Some(task) = self.llm_tasks.remove(&ticket) {
                task.abort();
            }
        }
        for timer in outcome.timers {
            self.start_debounce(timer);
        }
        for request in outcome.llm_requests {
            self.start_llm(request);
        }
        for notification in outcome.notifications {
            let closed = self
                .subscribers
                .get(&notification.subscription)
                .is_some_and(|tx| tx.send(notification.clone()).is_err());
            if closed {
                self.subscribers.remove(&notification.subscription);
                let _ = self.runtime.unsubscribe(notification.subscription);
            }
        }
    }

    fn start_debounce(&mut self, timer: DebounceTimer) {
        let events = self.events.clone();
        let binding_id = timer.binding_id.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(timer.delay_ms)).await;
            let _ = events.send(Event::DebounceFired {
                binding_id: timer.binding_id,
                seq: timer.seq,
            });
        });
        if let Some(previous) = self.debounces.insert(binding_id, task) {
            previous.abort();
        }
    }

    fn start_llm(&mut self, request: LlmRequest) {
        let events = self.events.clone();
        let llm = Arc::clone(&self.llm);
        let policy = self.retry;
        let ticket = request.ticket;
        let task = tokio::spawn(async move {
            let result = call_with_retry(llm.as_ref(), request, policy).await;
            let _ = events.send(Event::LlmCompleted { ticket, result });
        });
        self.llm_tasks.insert(ticket, task);
    }
}

/// Run a request under the policy's timeout, retrying with backoff.
async fn call_with_retry<L: LlmClient>(
    llm: &L,
    request: LlmRequest,
    policy: RetryPolicy,
) -> Result<Value, LlmError> {
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let timeout = Duration::from_millis(policy.timeout_ms);
        let error = match tokio::time::timeout(timeout, llm.complete(request.clone())).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => LlmError::Timeout(policy.timeout_ms),
        };
        if !policy.should_retry(attempts) {
            return Err(error);
        }
        let delay = policy.delay_ms(attempts.saturating_sub(1));
        warn!(
            ticket = request.ticket,
            binding = %request.binding_id,
            attempt = attempts,
            delay_ms = delay,
            error = %error,
            "llm attempt failed; retrying"
        );
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}
