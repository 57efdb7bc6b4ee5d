//! # atmsim-core
//!
//! Control-plane model of an ATM configuration manager: clients register a
//! completion callback, then create interfaces, VCs and cross-connects whose
//! per-entry outcomes are delivered back through that callback.
//!
//! ### Key Submodules:
//! - `registry`: handle table of registered (context, function) pairs
//! - `table`: interfaces, VCs and cross-connects with referential integrity
//! - `dispatch`: immediate or deferred callback delivery
//!
//! Nothing here is global; callers build the services and share them with `Arc`.

pub mod dispatch;
pub mod error;
pub mod registry;
pub mod table;
pub mod types;

pub mod prelude {
    pub use crate::dispatch::*;
    pub use crate::error::*;
    pub use crate::registry::*;
    pub use crate::table::*;
    pub use crate::types::*;
}

pub use error::NpfError;
