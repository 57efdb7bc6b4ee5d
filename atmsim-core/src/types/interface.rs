use serde::{Deserialize, Serialize};

use super::IfId;
use crate::error::NpfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum IfType {
    Uni = 1,
    Nni = 2,
}

impl TryFrom<u32> for IfType {
    type Error = NpfError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(IfType::Uni),
            2 => Ok(IfType::Nni),
            _ => Err(NpfError::InvalidAttribute),
        }
    }
}

/// Interface entry of a set-interface request. `if_type` is the raw wire
/// value and is only decoded when the entry is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfConfig {
    pub if_id: IfId,
    pub if_type: u32,
}

impl IfConfig {
    pub fn new(if_id: IfId, if_type: IfType) -> Self {
        Self {
            if_id,
            if_type: if_type as u32,
        }
    }
}

/// Interface as stored in the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub id: IfId,
    pub if_type: IfType,
}
