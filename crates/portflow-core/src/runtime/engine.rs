//! The propagation engine.

use super::relationship::{TransformRegistry, Verdict};
use super::result::{Interaction, InteractionKind, ResultMetadata, WidgetResult};
use super::store::PortStore;
use super::{
    DebounceTimer, LlmRequest, Notification, Outcome, PortWrite, RuntimeConfig, SubscriptionId,
};
use crate::controllers::WidgetState;
use crate::path::{WidgetPortPath, create_port_key, is_reserved_port, parse_widget_port_path};
use crate::primitives::{COMPLETED_PORT, ERROR_PORT, PATH_SEPARATOR};
use crate::registry::WidgetDefinition;
use crate::types::{Mechanism, PortflowError, Relationship};
use crate::ui_spec::{ReactiveBinding, UpdateMode};
use crate::validate::ValidatedUiSpec;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info, warn};

/// Runtime bookkeeping of one mounted widget.
#[derive(Debug, Clone)]
struct MountedWidget {
    generation: u64,
    /// Active error messages keyed by the binding that raised them.
    errors: BTreeMap<String, String>,
    interactions: Vec<Interaction>,
}

#[derive(Debug, Clone)]
struct PendingDebounce {
    seq: u64,
    value: Value,
}

/// An in-flight `llm` call and the widget generations it was issued against.
#[derive(Debug, Clone)]
struct PendingLlm {
    binding: usize,
    source: (String, u64),
    target: (String, u64),
}

/// Engine state captured before a propagating operation.
#[derive(Debug)]
struct Checkpoint {
    store: PortStore,
    mounted: BTreeMap<String, MountedWidget>,
    debounced: BTreeMap<usize, PendingDebounce>,
    confirm_buffer: BTreeMap<String, BTreeMap<usize, Value>>,
    llm: BTreeMap<u64, PendingLlm>,
    latest_ticket: BTreeMap<usize, u64>,
}

/// A queued port write.
#[derive(Debug, Clone)]
struct Write {
    widget: String,
    port: String,
    value: Value,
}

impl Write {
    fn new(widget: &str, port: &str, value: Value) -> Self {
        Self {
            widget: widget.to_string(),
            port: port.to_string(),
            value,
        }
    }
}

fn error_value(errors: &BTreeMap<String, String>) -> Value {
    json!({
        "hasError": !errors.is_empty(),
        "messages": errors.values().collect::<Vec<_>>(),
    })
}

/// Per-session port store and propagation engine.
///
/// Owns every port value. Widgets read and write only through
/// [`PortRuntime::emit`] and [`PortRuntime::read`].
#[derive(Debug)]
pub struct PortRuntime {
    spec: ValidatedUiSpec,
    config: RuntimeConfig,
    transforms: TransformRegistry,
    /// Enabled binding indices keyed by source port, in declaration order.
    routes: BTreeMap<String, Vec<usize>>,
    binding_index: BTreeMap<String, usize>,
    store: PortStore,
    mounted: BTreeMap<String, MountedWidget>,
    debounced: BTreeMap<usize, PendingDebounce>,
    /// Values held for `on_confirm` bindings, keyed by source widget.
    confirm_buffer: BTreeMap<String, BTreeMap<usize, Value>>,
    llm: BTreeMap<u64, PendingLlm>,
    latest_ticket: BTreeMap<usize, u64>,
    subscriptions: BTreeMap<SubscriptionId, String>,
    next_generation: u64,
    next_seq: u64,
    next_ticket: u64,
    next_subscription: u64,
    next_interaction: u64,
}

impl PortRuntime {
    /// Create a runtime for a validated spec. No widget is mounted yet.
    pub fn new(spec: ValidatedUiSpec, config: RuntimeConfig) -> Result<Self, PortflowError> {
        config.check()?;

        let mut routes: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut binding_index = BTreeMap::new();
        for (index, binding) in spec.spec().reactive_bindings.iter().enumerate() {
            binding_index.insert(binding.id.clone(), index);
            if !binding.enabled {
                continue;
            }
            let source = parse_widget_port_path(&binding.source)?;
            routes
                .entry(create_port_key(source.widget_id(), source.port_id()))
                .or_default()
                .push(index);
        }

        Ok(Self {
            spec,
            config,
            transforms: TransformRegistry::new(),
            routes,
            binding_index,
            store: PortStore::new(),
            mounted: BTreeMap::new(),
            debounced: BTreeMap::new(),
            confirm_buffer: BTreeMap::new(),
            llm: BTreeMap::new(),
            latest_ticket: BTreeMap::new(),
            subscriptions: BTreeMap::new(),
            next_generation: 0,
            next_seq: 0,
            next_ticket: 0,
            next_subscription: 0,
            next_interaction: 0,
        })
    }

    /// Replace the transform registry.
    #[must_use]
    pub fn with_transforms(mut self, transforms: TransformRegistry) -> Self {
        self.transforms = transforms;
        self
    }

    /// The spec this runtime drives.
    #[must_use]
    pub fn spec(&self) -> &ValidatedUiSpec {
        &self.spec
    }

    /// The runtime tunables.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Check if a widget is mounted.
    #[must_use]
    pub fn is_mounted(&self, widget_id: &str) -> bool {
        self.mounted.contains_key(widget_id)
    }

    /// Ids of mounted widgets, sorted.
    pub fn mounted_widgets(&self) -> impl Iterator<Item = &str> {
        self.mounted.keys().map(String::as_str)
    }

    /// Number of `llm` calls awaiting a result.
    #[must_use]
    pub fn pending_llm(&self) -> usize {
        self.llm.len()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Mount a widget, creating its port entries.
    ///
    /// Each declared port starts at the caller's initial value, else the
    /// port's `defaultValue`, else what the widget's controller publishes
    /// for its config, else `null`. Reserved ports start cleared.
    pub fn mount(
        &mut self,
        widget_id: &str,
        initial: BTreeMap<String, Value>,
    ) -> Result<(), PortflowError> {
        let definition = self.definition(widget_id)?;
        if self.mounted.contains_key(widget_id) {
            return Err(PortflowError::AlreadyMounted(widget_id.to_string()));
        }
        if let Some(port) = initial.keys().find(|p| definition.port(p).is_none()) {
            return Err(PortflowError::UnknownPort {
                widget: widget_id.to_string(),
                port: port.clone(),
            });
        }

        let published = self
            .spec
            .config(widget_id)
            .map(|c| WidgetState::from_config(c).emissions())
            .unwrap_or_default();

        let mut ports = BTreeMap::new();
        for port in definition.all_ports() {
            let value = initial
                .get(&port.id)
                .cloned()
                .or_else(|| port.default_value.clone())
                .or_else(|| published.get(port.id.as_str()).cloned())
                .unwrap_or(Value::Null);
            port.check(&value)
                .map_err(|reason| PortflowError::ConstraintViolation {
                    path: create_port_key(widget_id, &port.id),
                    reason,
                })?;
            ports.insert(port.id.clone(), value);
        }
        ports.insert(ERROR_PORT.to_string(), error_value(&BTreeMap::new()));
        ports.insert(COMPLETED_PORT.to_string(), Value::Null);
        self.store.insert_widget(widget_id, ports);

        let generation = self.next_generation;
        self.next_generation = self.next_generation.saturating_add(1);
        self.mounted.insert(
            widget_id.to_string(),
            MountedWidget {
                generation,
                errors: BTreeMap::new(),
                interactions: Vec::new(),
            },
        );

        let completion = self.completion(widget_id);
        self.store.set(widget_id, COMPLETED_PORT, completion);
        info!(widget = widget_id, generation, "Widget mounted");
        Ok(())
    }

    /// Unmount a widget.
    ///
    /// Drops its port entries and every pending debounce, buffered
    /// confirmation and `llm` call whose binding starts or ends at it.
    /// Cancelled tickets are listed in the outcome.
    pub fn unmount(&mut self, widget_id: &str) -> Result<Outcome, PortflowError> {
        if self.mounted.remove(widget_id).is_none() {
            return Err(PortflowError::NotMounted(widget_id.to_string()));
        }
        self.store.remove_widget(widget_id);
        self.confirm_buffer.remove(widget_id);

        let touching: BTreeSet<usize> = self
            .spec
            .spec()
            .reactive_bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                endpoint_widget(&b.source) == Some(widget_id)
                    || endpoint_widget(&b.target) == Some(widget_id)
            })
            .map(|(i, _)| i)
            .collect();
        self.debounced.retain(|index, _| !touching.contains(index));
        for buffer in self.confirm_buffer.values_mut() {
            buffer.retain(|index, _| !touching.contains(index));
        }

        let mut outcome = Outcome::default();
        self.llm.retain(|ticket, pending| {
            let involved = pending.source.0 == widget_id || pending.target.0 == widget_id;
            if involved {
                outcome.cancelled.push(*ticket);
            }
            !involved
        });
        self.latest_ticket
            .retain(|_, ticket| !outcome.cancelled.contains(ticket));

        info!(
            widget = widget_id,
            cancelled = outcome.cancelled.len(),
            "Widget unmounted"
        );
        Ok(outcome)
    }

    // =========================================================================
    // PORT ACCESS
    // =========================================================================

    /// Write a port and run realtime propagation to completion.
    ///
    /// A value violating the port's constraints is rejected and nothing is
    /// written. Reserved ports are written only by the runtime. If
    /// propagation exceeds the step budget every effect of the emission is
    /// rolled back.
    pub fn emit(
        &mut self,
        widget_id: &str,
        port_id: &str,
        value: Value,
    ) -> Result<Outcome, PortflowError> {
        self.ensure_port(widget_id, port_id)?;
        if is_reserved_port(port_id) {
            return Err(PortflowError::ReservedPort(create_port_key(widget_id, port_id)));
        }
        if let Some(port) = self.definition(widget_id)?.port(port_id) {
            port.check(&value)
                .map_err(|reason| PortflowError::ConstraintViolation {
                    path: create_port_key(widget_id, port_id),
                    reason,
                })?;
        }

        self.atomically(|rt| {
            rt.record(widget_id, InteractionKind::Emit, Some(port_id), value.clone());
            debug!(widget = widget_id, port = port_id, "Emit");

            let mut outcome = Outcome::default();
            let queue = VecDeque::from([Write::new(widget_id, port_id, value)]);
            rt.drain(queue, &mut outcome)?;
            Ok(outcome)
        })
    }

    /// Read the last known value of any mounted widget's port.
    pub fn read(&self, path: &str) -> Result<Value, PortflowError> {
        let path = parse_widget_port_path(path)?;
        self.ensure_port(path.widget_id(), path.port_id())?;
        Ok(self
            .store
            .get(path.widget_id(), path.port_id())
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Subscribe to writes of one port. The widget need not be mounted.
    pub fn subscribe(&mut self, path: &str) -> Result<SubscriptionId, PortflowError> {
        let path = parse_widget_port_path(path)?;
        let definition = self.definition(path.widget_id())?;
        if !path.is_reserved() && definition.port(path.port_id()).is_none() {
            return Err(PortflowError::UnknownPort {
                widget: path.widget_id().to_string(),
                port: path.port_id().to_string(),
            });
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.subscriptions.insert(id, path.to_string());
        Ok(id)
    }

    /// Stop a subscription. Returns `false` if it did not exist.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Flush the values buffered for the widget's `on_confirm` bindings.
    pub fn confirm(&mut self, widget_id: &str) -> Result<Outcome, PortflowError> {
        if !self.mounted.contains_key(widget_id) {
            self.definition(widget_id)?;
            return Err(PortflowError::NotMounted(widget_id.to_string()));
        }
        self.atomically(|rt| {
            rt.record(widget_id, InteractionKind::Confirm, None, Value::Null);

            let buffered = rt.confirm_buffer.remove(widget_id).unwrap_or_default();
            debug!(widget = widget_id, bindings = buffered.len(), "Confirm");

            let mut outcome = Outcome::default();
            let mut queue = VecDeque::new();
            for (index, value) in buffered {
                rt.dispatch(index, value, &mut queue, &mut outcome);
            }
            rt.drain(queue, &mut outcome)?;
            Ok(outcome)
        })
    }

    // =========================================================================
    // DRIVER CALLBACKS
    // =========================================================================

    /// A debounce window closed. Propagates only if `seq` is still the
    /// latest for the binding; each pending value fires at most once.
    pub fn fire_debounce(&mut self, binding_id: &str, seq: u64) -> Result<Outcome, PortflowError> {
        let Some(&index) = self.binding_index.get(binding_id) else {
            return Ok(Outcome::default());
        };
        if self.debounced.get(&index).is_none_or(|p| p.seq != seq) {
            debug!(binding = binding_id, seq, "Stale debounce ignored");
            return Ok(Outcome::default());
        }
        self.atomically(|rt| {
            let mut outcome = Outcome::default();
            let Some(pending) = rt.debounced.remove(&index) else {
                return Ok(outcome);
            };
            let mut queue = VecDeque::new();
            rt.dispatch(index, pending.value, &mut queue, &mut outcome);
            rt.drain(queue, &mut outcome)?;
            Ok(outcome)
        })
    }

    /// An `llm` call succeeded.
    ///
    /// The result is discarded if either endpoint widget unmounted (or was
    /// remounted) since the request, or a newer request superseded it.
    pub fn resolve_llm(&mut self, ticket: u64, value: Value) -> Result<Outcome, PortflowError> {
        self.atomically(|rt| {
            let mut outcome = Outcome::default();
            let Some((binding, target)) = rt.take_live(ticket) else {
                return Ok(outcome);
            };
            let mut queue = VecDeque::new();
            rt.apply(&binding, &target, value, &mut queue);
            rt.drain(queue, &mut outcome)?;
            Ok(outcome)
        })
    }

    /// An `llm` call failed for good. Sets the target's `_error` instead of
    /// propagating anything.
    pub fn fail_llm(&mut self, ticket: u64, message: &str) -> Result<Outcome, PortflowError> {
        self.atomically(|rt| {
            let mut outcome = Outcome::default();
            let Some((binding, target)) = rt.take_live(ticket) else {
                return Ok(outcome);
            };
            warn!(binding = %binding.id, ticket, error = message, "llm binding failed");
            let mut queue = VecDeque::new();
            rt.set_error(
                target.widget_id(),
                &binding.id,
                Some(format!("Binding {} failed: {}", binding.id, message)),
                &mut queue,
            );
            rt.drain(queue, &mut outcome)?;
            Ok(outcome)
        })
    }

    // =========================================================================
    // RESULTS
    // =========================================================================

    /// Snapshot a mounted widget for analytics.
    pub fn get_result(&self, widget_id: &str, timestamp: u64) -> Result<WidgetResult, PortflowError> {
        let definition = self.definition(widget_id)?;
        let (Some(mounted), Some(ports), Some(widget)) = (
            self.mounted.get(widget_id),
            self.store.ports(widget_id),
            self.spec.widget(widget_id),
        ) else {
            return Err(PortflowError::NotMounted(widget_id.to_string()));
        };

        let data: BTreeMap<String, Value> = ports
            .iter()
            .filter(|(port, _)| !is_reserved_port(port))
            .map(|(port, value)| (port.clone(), value.clone()))
            .collect();
        let summary = self
            .spec
            .config(widget_id)
            .map(|c| WidgetState::hydrate(c, &data).summary())
            .unwrap_or_default();
        let flag = |port: &str, field: &str| {
            ports
                .get(port)
                .and_then(|v| v.get(field))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };

        Ok(WidgetResult {
            widget_id: widget_id.to_string(),
            component: widget.component.clone(),
            timestamp,
            summary,
            metadata: ResultMetadata {
                stage: definition.stage,
                complexity: definition.metadata.complexity,
                interaction_count: mounted.interactions.len(),
                completed: flag(COMPLETED_PORT, "isCompleted"),
                has_error: flag(ERROR_PORT, "hasError"),
            },
            data,
            interactions: mounted.interactions.clone(),
        })
    }

    // =========================================================================
    // PROPAGATION
    // =========================================================================

    /// Run a propagating operation; on error restore the state it started from.
    fn atomically(
        &mut self,
        operation: impl FnOnce(&mut Self) -> Result<Outcome, PortflowError>,
    ) -> Result<Outcome, PortflowError> {
        let checkpoint = Checkpoint {
            store: self.store.clone(),
            mounted: self.mounted.clone(),
            debounced: self.debounced.clone(),
            confirm_buffer: self.confirm_buffer.clone(),
            llm: self.llm.clone(),
            latest_ticket: self.latest_ticket.clone(),
        };
        let result = operation(self);
        if result.is_err() {
            self.store = checkpoint.store;
            self.mounted = checkpoint.mounted;
            self.debounced = checkpoint.debounced;
            self.confirm_buffer = checkpoint.confirm_buffer;
            self.llm = checkpoint.llm;
            self.latest_ticket = checkpoint.latest_ticket;
            warn!("Propagation rolled back");
        }
        result
    }

    /// Apply queued writes until the queue is empty or the step budget runs out.
    fn drain(&mut self, mut queue: VecDeque<Write>, outcome: &mut Outcome) -> Result<(), PortflowError> {
        let budget = self.config.max_propagation_steps;
        let mut steps = 0usize;

        while let Some(write) = queue.pop_front() {
            steps = steps.saturating_add(1);
            if steps > budget {
                warn!(steps = budget, "Propagation did not settle");
                return Err(PortflowError::PropagationTimeout(budget));
            }
            if !self
                .store
                .set(&write.widget, &write.port, write.value.clone())
            {
                debug!(widget = %write.widget, port = %write.port, "Write to unmounted widget skipped");
                continue;
            }

            let key = create_port_key(&write.widget, &write.port);
            debug!(port = %key, step = steps, "Port written");
            for (id, path) in &self.subscriptions {
                if *path == key {
                    outcome.notifications.push(Notification {
                        subscription: *id,
                        path: key.clone(),
                        value: write.value.clone(),
                    });
                }
            }
            outcome.writes.push(PortWrite {
                path: key.clone(),
                value: write.value.clone(),
            });

            let routes = self.routes.get(&key).cloned().unwrap_or_default();
            for index in routes {
                self.route(index, &write.value, &mut queue, outcome);
            }

            if !is_reserved_port(&write.port) {
                let completion = self.completion(&write.widget);
                if self.store.get(&write.widget, COMPLETED_PORT) != Some(&completion) {
                    queue.push_back(Write::new(&write.widget, COMPLETED_PORT, completion));
                }
            }
        }
        Ok(())
    }

    /// Send a source value down one binding according to its update mode.
    fn route(&mut self, index: usize, value: &Value, queue: &mut VecDeque<Write>, outcome: &mut Outcome) {
        let Some(binding) = self.binding(index).cloned() else {
            return;
        };
        match binding.update_mode {
            UpdateMode::Realtime => self.dispatch(index, value.clone(), queue, outcome),
            UpdateMode::Debounced => {
                let timer = DebounceTimer {
                    binding_id: binding.id.clone(),
                    seq: self.next_seq,
                    delay_ms: binding.effective_debounce_ms(),
                };
                self.next_seq = self.next_seq.saturating_add(1);
                self.debounced.insert(
                    index,
                    PendingDebounce {
                        seq: timer.seq,
                        value: value.clone(),
                    },
                );
                outcome.timers.push(timer);
            }
            UpdateMode::OnConfirm => {
                if let Some(source) = endpoint_widget(&binding.source).map(str::to_string) {
                    self.confirm_buffer
                        .entry(source)
                        .or_default()
                        .insert(index, value.clone());
                }
            }
        }
    }

    /// Evaluate a binding now. Synchronous results are queued; `llm`
    /// relationships become requests.
    fn dispatch(&mut self, index: usize, value: Value, queue: &mut VecDeque<Write>, outcome: &mut Outcome) {
        let Some(binding) = self.binding(index).cloned() else {
            return;
        };
        let Ok(target) = parse_widget_port_path(&binding.target) else {
            return;
        };
        if !self.mounted.contains_key(target.widget_id()) {
            debug!(binding = %binding.id, target = %target, "Target not mounted; binding skipped");
            return;
        }

        if let Relationship::Llm { body } = &binding.relationship {
            self.request_llm(index, &binding, body, value, &target, outcome);
            return;
        }

        match self.transforms.evaluate(&binding.relationship, &value) {
            Ok(result) => self.apply(&binding, &target, result, queue),
            Err(reason) => {
                warn!(binding = %binding.id, error = %reason, "Relationship evaluation failed");
                self.set_error(
                    target.widget_id(),
                    &binding.id,
                    Some(format!("Binding {}: {}", binding.id, reason)),
                    queue,
                );
            }
        }
    }

    /// Apply an evaluated relationship result to the binding's target.
    fn apply(
        &mut self,
        binding: &ReactiveBinding,
        target: &WidgetPortPath,
        result: Value,
        queue: &mut VecDeque<Write>,
    ) {
        match binding.mechanism {
            Mechanism::Update => {
                let violation = self
                    .spec
                    .definition_of(target.widget_id())
                    .and_then(|d| d.port(target.port_id()))
                    .and_then(|p| p.check(&result).err());
                if let Some(reason) = violation {
                    self.set_error(
                        target.widget_id(),
                        &binding.id,
                        Some(format!("{}: {}", target, reason)),
                        queue,
                    );
                    return;
                }
                self.set_error(target.widget_id(), &binding.id, None, queue);
                queue.push_back(Write::new(target.widget_id(), target.port_id(), result));
            }
            Mechanism::Validate => {
                let message = match Verdict::from_value(&result, &binding.id) {
                    Verdict::Pass => None,
                    Verdict::Fail(message) => Some(message),
                };
                self.set_error(target.widget_id(), &binding.id, message, queue);
            }
        }
    }

    fn request_llm(
        &mut self,
        index: usize,
        binding: &ReactiveBinding,
        prompt: &str,
        input: Value,
        target: &WidgetPortPath,
        outcome: &mut Outcome,
    ) {
        let Some(source) = endpoint_widget(&binding.source) else {
            return;
        };
        let (Some(source_gen), Some(target_gen)) = (
            self.mounted.get(source).map(|m| m.generation),
            self.mounted.get(target.widget_id()).map(|m| m.generation),
        ) else {
            return;
        };

        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.saturating_add(1);
        if let Some(previous) = self.latest_ticket.insert(index, ticket)
            && self.llm.remove(&previous).is_some()
        {
            debug!(binding = %binding.id, ticket = previous, "Superseded llm request cancelled");
            outcome.cancelled.push(previous);
        }
        self.llm.insert(
            ticket,
            PendingLlm {
                binding: index,
                source: (source.to_string(), source_gen),
                target: (target.widget_id().to_string(), target_gen),
            },
        );
        outcome.llm_requests.push(LlmRequest {
            ticket,
            binding_id: binding.id.clone(),
            prompt: prompt.to_string(),
            input,
            target: target.to_string(),
        });
    }

    /// Remove a pending `llm` ticket, returning its binding if both
    /// endpoint widgets are still the instances it was issued against.
    fn take_live(&mut self, ticket: u64) -> Option<(ReactiveBinding, WidgetPortPath)> {
        let Some(pending) = self.llm.remove(&ticket) else {
            debug!(ticket, "Result for unknown or cancelled llm ticket discarded");
            return None;
        };
        if self.latest_ticket.get(&pending.binding) == Some(&ticket) {
            self.latest_ticket.remove(&pending.binding);
        }

        let live = |(widget, generation): &(String, u64)| {
            self.mounted
                .get(widget)
                .is_some_and(|m| m.generation == *generation)
        };
        if !live(&pending.source) || !live(&pending.target) {
            warn!(ticket, "Discarding llm result for unmounted widget");
            return None;
        }

        let binding = self.binding(pending.binding)?.clone();
        let target = parse_widget_port_path(&binding.target).ok()?;
        Some((binding, target))
    }

    /// Set or clear the error message a binding holds on a widget, queueing
    /// an `_error` write when the visible value changes.
    fn set_error(
        &mut self,
        widget_id: &str,
        key: &str,
        message: Option<String>,
        queue: &mut VecDeque<Write>,
    ) {
        let Some(mounted) = self.mounted.get_mut(widget_id) else {
            return;
        };
        let changed = match message {
            Some(message) => {
                let previous = mounted.errors.insert(key.to_string(), message.clone());
                previous.as_ref() != Some(&message)
            }
            None => mounted.errors.remove(key).is_some(),
        };
        if changed {
            queue.push_back(Write::new(widget_id, ERROR_PORT, error_value(&mounted.errors)));
        }
    }

    /// Current `_completed` value of a mounted widget.
    fn completion(&self, widget_id: &str) -> Value {
        let (Ok(definition), Some(ports)) = (self.definition(widget_id), self.store.ports(widget_id))
        else {
            return Value::Null;
        };
        let missing: Vec<&str> = definition
            .required_inputs()
            .filter(|port| ports.get(*port).is_none_or(Value::is_null))
            .collect();
        let controller_done = self
            .spec
            .config(widget_id)
            .is_none_or(|c| WidgetState::hydrate(c, ports).is_complete());
        json!({
            "isCompleted": missing.is_empty() && controller_done,
            "requiredFields": missing,
        })
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn binding(&self, index: usize) -> Option<&ReactiveBinding> {
        self.spec.spec().reactive_bindings.get(index)
    }

    fn definition(&self, widget_id: &str) -> Result<&WidgetDefinition, PortflowError> {
        self.spec
            .definition_of(widget_id)
            .ok_or_else(|| PortflowError::UnknownWidget(widget_id.to_string()))
    }

    fn ensure_port(&self, widget_id: &str, port_id: &str) -> Result<(), PortflowError> {
        let definition = self.definition(widget_id)?;
        if !self.mounted.contains_key(widget_id) {
            return Err(PortflowError::NotMounted(widget_id.to_string()));
        }
        if !is_reserved_port(port_id) && definition.port(port_id).is_none() {
            return Err(PortflowError::UnknownPort {
                widget: widget_id.to_string(),
                port: port_id.to_string(),
            });
        }
        Ok(())
    }

    fn record(&mut self, widget_id: &str, kind: InteractionKind, port: Option<&str>, value: Value) {
        let sequence = self.next_interaction;
        self.next_interaction = self.next_interaction.saturating_add(1);
        if let Some(mounted) = self.mounted.get_mut(widget_id) {
            mounted.interactions.push(Interaction {
                sequence,
                kind,
                port: port.map(str::to_string),
                value,
            });
        }
    }
}

/// Widget segment of a `widget.port` address.
fn endpoint_widget(address: &str) -> Option<&str> {
    address
        .split_once(PATH_SEPARATOR)
        .map(|(widget, _)| widget)
}

// =============================================================================
// TESTS
// =============================================================================
