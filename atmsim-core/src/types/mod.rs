//! Resource model and request/response value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NpfError;

pub mod cross_connect;
pub mod interface;
pub mod response;
pub mod vc;

pub use cross_connect::{CrossConnect, XcAttachment, XcConfig, XcType};
pub use interface::{IfConfig, IfType, Interface};
pub use response::{AsyncResponse, ObjectId, RequestKind, ResponseBatch};
pub use vc::{Vc, VcAddress, VcConfig};

pub type IfId = u32;
pub type LinkId = u32;
pub type XcId = u32;
pub type Correlator = u64;
pub type FeHandle = u32;
pub type BlockId = u32;

/// Opaque identifier of a registered (context, function) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pointer-sized token supplied by the client at registration and handed
/// back unchanged on every callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserContext(pub u64);

/// Client rule deciding whether a completion callback fires for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorReporting {
    ReportErrors = 0,
    ReportAll = 1,
    ReportNone = 2,
}

impl ErrorReporting {
    /// Whether a batch with the given aggregate outcome is delivered.
    pub fn should_dispatch(self, all_ok: bool) -> bool {
        match self {
            ErrorReporting::ReportAll => true,
            ErrorReporting::ReportNone => false,
            ErrorReporting::ReportErrors => !all_ok,
        }
    }
}

impl TryFrom<u32> for ErrorReporting {
    type Error = NpfError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(ErrorReporting::ReportErrors),
            1 => Ok(ErrorReporting::ReportAll),
            2 => Ok(ErrorReporting::ReportNone),
            _ => Err(NpfError::Unknown),
        }
    }
}

impl From<ErrorReporting> for u32 {
    fn from(policy: ErrorReporting) -> Self {
        policy as u32
    }
}
