use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use atmsim_core::prelude::*;

use super::{HandleRef, Scenario, Step, TranscriptEntry, WireValue};
use crate::error::ScenarioError;
use crate::manager::Request;
use crate::scenario::Transcript;
use crate::simulator::Simulator;

type Deliveries = Arc<Mutex<Vec<TranscriptEntry>>>;

/// Plays a [`Scenario`] against a [`Simulator`].
pub struct ScenarioRunner<'a> {
    sim: &'a Simulator,
    sinks: HashMap<String, Callback>,
    aliases: HashMap<String, Handle>,
    deliveries: Deliveries,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(sim: &'a Simulator) -> Self {
        Self {
            sim,
            sinks: HashMap::new(),
            aliases: HashMap::new(),
            deliveries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle registered under `alias` by an earlier step.
    pub fn handle(&self, alias: &str) -> Option<Handle> {
        self.aliases.get(alias).copied()
    }

    pub fn run(&mut self, scenario: &Scenario) -> Result<Transcript, ScenarioError> {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "Running scenario");
        for name in &scenario.sinks {
            let callback = self.recording_sink(name.clone());
            self.sinks.insert(name.clone(), callback);
        }

        let mut entries = Vec::new();
        for (index, step) in scenario.steps.iter().enumerate() {
            let entry = self.step(index, step)?;
            entries.push(entry);
            entries.append(&mut self.deliveries.lock());
        }

        // Callbacks still queued when the steps run out are released here.
        let jobs = self.sim.flush();
        if jobs > 0 {
            entries.push(TranscriptEntry::Flushed {
                step: scenario.steps.len(),
                jobs,
            });
        }
        entries.append(&mut self.deliveries.lock());

        Ok(Transcript {
            scenario: scenario.name.clone(),
            entries,
        })
    }

    fn recording_sink(&self, sink: String) -> Callback {
        let deliveries = self.deliveries.clone();
        Callback::new(move |context, correlator, batch| {
            deliveries.lock().push(TranscriptEntry::Delivered {
                sink: sink.clone(),
                context,
                correlator,
                batch: batch.clone(),
            });
        })
    }

    fn step(&mut self, index: usize, step: &Step) -> Result<TranscriptEntry, ScenarioError> {
        let sim = self.sim;
        let manager = sim.manager();
        debug!(step = index, "Scenario step");

        let entry = match step {
            Step::Register(s) => {
                let callback = s.callback.as_ref().and_then(|c| self.sinks.get(c)).cloned();
                match manager.register(UserContext(s.context), callback) {
                    Ok(registration) => {
                        if let Some(alias) = s.alias.as_ref().or(s.callback.as_ref()) {
                            self.aliases.insert(alias.clone(), registration.handle());
                        }
                        TranscriptEntry::returned(
                            index,
                            "register",
                            registration.status(),
                            Some(registration.handle()),
                        )
                    }
                    Err(e) => TranscriptEntry::returned(index, "register", Err(e), None),
                }
            }
            Step::Deregister(s) => {
                let handle = self.resolve(index, &s.handle)?;
                TranscriptEntry::returned(
                    index,
                    "deregister",
                    manager.deregister(handle),
                    Some(handle),
                )
            }
            Step::SetInterfaces(s) => {
                let request = self.request(index, &s.handle, s.correlator, &s.reporting)?
                    .on_block(s.fe_handle, s.block_id);
                let entries = s
                    .entries
                    .iter()
                    .map(|e| e.to_config(index))
                    .collect::<Result<Vec<_>, _>>()?;
                TranscriptEntry::returned(
                    index,
                    "set_interfaces",
                    manager.set_interfaces(&request, &entries),
                    None,
                )
            }
            Step::DeleteInterfaces(s) => {
                let request = self.request(index, &s.handle, s.correlator, &s.reporting)?
                    .on_block(s.fe_handle, s.block_id);
                TranscriptEntry::returned(
                    index,
                    "delete_interfaces",
                    manager.delete_interfaces(&request, s.delete_contained, &s.ids),
                    None,
                )
            }
            Step::SetVcs(s) => {
                let request = self.request(index, &s.handle, s.correlator, &s.reporting)?
                    .on_block(s.fe_handle, s.block_id);
                TranscriptEntry::returned(
                    index,
                    "set_vcs",
                    manager.set_vcs(&request, &s.entries),
                    None,
                )
            }
            Step::SetCrossConnects(s) => {
                let request = self.request(index, &s.handle, s.correlator, &s.reporting)?
                    .on_block(s.fe_handle, s.block_id);
                let entries = s
                    .entries
                    .iter()
                    .map(|e| e.to_config(index))
                    .collect::<Result<Vec<_>, _>>()?;
                TranscriptEntry::returned(
                    index,
                    "set_cross_connects",
                    manager.set_cross_connects(&request, &entries),
                    None,
                )
            }
            Step::SetDeferredMode => {
                manager.set_deferred_mode();
                TranscriptEntry::returned(index, "set_deferred_mode", Ok(()), None)
            }
            Step::Flush => TranscriptEntry::Flushed {
                step: index,
                jobs: sim.flush(),
            },
        };
        Ok(entry)
    }

    fn resolve(&self, step: usize, handle: &HandleRef) -> Result<Handle, ScenarioError> {
        match handle {
            HandleRef::Raw(raw) => Ok(Handle(*raw)),
            HandleRef::Alias(alias) => {
                self.handle(alias).ok_or_else(|| ScenarioError::UnknownAlias {
                    step,
                    alias: alias.clone(),
                })
            }
        }
    }

    fn request(
        &self,
        step: usize,
        handle: &HandleRef,
        correlator: Correlator,
        reporting: &WireValue,
    ) -> Result<Request, ScenarioError> {
        Ok(Request {
            handle: self.resolve(step, handle)?,
            correlator,
            reporting: reporting.reporting(step)?,
            fe_handle: 0,
            block_id: 0,
        })
    }
}
