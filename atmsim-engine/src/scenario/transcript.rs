use serde::Serialize;

use atmsim_core::error::result_code;
use atmsim_core::types::{Correlator, Handle, ResponseBatch, UserContext};
use atmsim_core::NpfError;

/// Everything a scenario run observed, in order.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub scenario: String,
    pub entries: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// Synchronous return of one step.
    Returned {
        step: usize,
        operation: &'static str,
        code: u32,
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        handle: Option<Handle>,
    },
    /// A response batch reached a recording sink.
    Delivered {
        sink: String,
        context: UserContext,
        correlator: Correlator,
        batch: ResponseBatch,
    },
    Flushed {
        step: usize,
        jobs: usize,
    },
}

impl TranscriptEntry {
    pub(crate) fn returned(
        step: usize,
        operation: &'static str,
        result: Result<(), NpfError>,
        handle: Option<Handle>,
    ) -> Self {
        TranscriptEntry::Returned {
            step,
            operation,
            code: result_code(&result),
            status: match result {
                Ok(()) => "NoError".to_string(),
                Err(e) => format!("{:?}", e),
            },
            handle,
        }
    }
}

impl Transcript {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Wire codes of every synchronous return, in step order.
    pub fn return_codes(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                TranscriptEntry::Returned { code, .. } => Some(*code),
                _ => None,
            })
            .collect()
    }

    pub fn deliveries(&self) -> impl Iterator<Item = (&str, Correlator, &ResponseBatch)> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Delivered {
                sink,
                correlator,
                batch,
                ..
            } => Some((sink.as_str(), *correlator, batch)),
            _ => None,
        })
    }
}
