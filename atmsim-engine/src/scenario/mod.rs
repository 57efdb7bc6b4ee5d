//! ## atmsim-engine::scenario
//! **Scripted request sequences**
//!
//! A scenario is a YAML file naming a set of recording callback sinks and a
//! list of steps. Enum-valued fields take either the wire integer or a
//! snake_case name, so invalid raw values can be scripted:
//!
//! ```yaml
//! name: single interface
//! sinks: [main]
//! steps:
//!   - register: { callback: main, context: 7 }
//!   - set_interfaces:
//!       handle: main
//!       correlator: 1
//!       reporting: report_all
//!       entries:
//!         - { if_id: 1, if_type: uni }
//!   - set_deferred_mode
//!   - flush
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use atmsim_core::types::{IfConfig, IfId, LinkId, VcConfig, XcConfig, XcId};

use crate::error::ScenarioError;

mod runner;
mod transcript;

pub use runner::ScenarioRunner;
pub use transcript::{Transcript, TranscriptEntry};

const IF_TYPES: &[(&str, u32)] = &[("uni", 1), ("nni", 2)];
const XC_TYPES: &[(&str, u32)] = &[
    ("ext_to_ext", 1),
    ("ext_to_int", 2),
    ("ext_to_back", 3),
    ("back_to_int", 4),
];
const REPORTING: &[(&str, u32)] = &[("report_errors", 0), ("report_all", 1), ("report_none", 2)];

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Recording callbacks that `register` steps may refer to.
    #[serde(default)]
    pub sinks: Vec<String>,
    /// Steps are written as single-key maps (`- register: {...}`) or bare
    /// names for unit steps (`- flush`).
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_yaml(source: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&source)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Register(RegisterStep),
    Deregister(DeregisterStep),
    SetInterfaces(RequestStep<IfEntry>),
    DeleteInterfaces(DeleteStep),
    SetVcs(RequestStep<VcConfig>),
    SetCrossConnects(RequestStep<XcEntry>),
    SetDeferredMode,
    Flush,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterStep {
    /// Sink name; absent or unknown registers without a function.
    pub callback: Option<String>,
    #[serde(default)]
    pub context: u64,
    /// Name later steps use for the handle. Defaults to the sink name.
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeregisterStep {
    pub handle: HandleRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestStep<T> {
    pub handle: HandleRef,
    #[serde(default)]
    pub correlator: u64,
    pub reporting: WireValue,
    #[serde(default)]
    pub fe_handle: u32,
    #[serde(default)]
    pub block_id: u32,
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteStep {
    pub handle: HandleRef,
    #[serde(default)]
    pub correlator: u64,
    pub reporting: WireValue,
    #[serde(default)]
    pub fe_handle: u32,
    #[serde(default)]
    pub block_id: u32,
    #[serde(default)]
    pub delete_contained: bool,
    #[serde(default)]
    pub ids: Vec<IfId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IfEntry {
    pub if_id: IfId,
    pub if_type: WireValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XcEntry {
    pub xc_id: XcId,
    pub link_a: LinkId,
    pub link_b: LinkId,
    pub xc_type: WireValue,
}

/// A registered handle, by alias or as a raw number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HandleRef {
    Raw(u32),
    Alias(String),
}

/// Enum field given as its wire code or its name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Code(u32),
    Name(String),
}

impl WireValue {
    fn resolve(
        &self,
        step: usize,
        field: &'static str,
        names: &[(&str, u32)],
    ) -> Result<u32, ScenarioError> {
        match self {
            WireValue::Code(code) => Ok(*code),
            WireValue::Name(name) => names
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, code)| *code)
                .ok_or_else(|| ScenarioError::UnknownName {
                    step,
                    field,
                    name: name.clone(),
                }),
        }
    }

    pub(crate) fn reporting(&self, step: usize) -> Result<u32, ScenarioError> {
        self.resolve(step, "reporting policy", REPORTING)
    }
}

impl IfEntry {
    pub(crate) fn to_config(&self, step: usize) -> Result<IfConfig, ScenarioError> {
        Ok(IfConfig {
            if_id: self.if_id,
            if_type: self.if_type.resolve(step, "interface type", IF_TYPES)?,
        })
    }
}

impl XcEntry {
    pub(crate) fn to_config(&self, step: usize) -> Result<XcConfig, ScenarioError> {
        Ok(XcConfig {
            xc_id: self.xc_id,
            link_a: self.link_a,
            link_b: self.link_b,
            xc_type: self.xc_type.resolve(step, "cross-connect type", XC_TYPES)?,
        })
    }
}
