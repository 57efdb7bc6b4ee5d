//! Per-request response batch delivered to completion callbacks.

use serde::{Serialize, Serializer};

use super::{IfId, LinkId, XcId};
use crate::error::NpfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestKind {
    IfSet,
    IfDelete,
    VcSet,
    VcLinkXcSet,
}

/// Object a response entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectId {
    Interface(IfId),
    VcLink(LinkId),
    CrossConnect(XcId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsyncResponse {
    pub object: ObjectId,
    #[serde(serialize_with = "serialize_status")]
    pub status: Result<(), NpfError>,
}

fn serialize_status<S: Serializer>(
    status: &Result<(), NpfError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match status {
        Ok(()) => serializer.serialize_str("NoError"),
        Err(e) => e.serialize(serializer),
    }
}

/// One response per request entry, in input order.
///
/// Built by the facade, filled by the resource table and then moved into the
/// dispatcher, which drops it once the callback has returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBatch {
    kind: RequestKind,
    all_ok: bool,
    responses: Vec<AsyncResponse>,
}

impl ResponseBatch {
    pub fn with_capacity(kind: RequestKind, capacity: usize) -> Self {
        Self {
            kind,
            all_ok: true,
            responses: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, object: ObjectId, status: Result<(), NpfError>) {
        if status.is_err() {
            self.all_ok = false;
        }
        self.responses.push(AsyncResponse { object, status });
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// `true` when no entry failed.
    pub fn all_ok(&self) -> bool {
        self.all_ok
    }

    pub fn responses(&self) -> &[AsyncResponse] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &AsyncResponse> {
        self.responses.iter().filter(|r| r.status.is_err())
    }
}
