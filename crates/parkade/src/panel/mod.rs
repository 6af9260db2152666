//! Entry and exit panels: the only code paths that change occupancy.
//!
//! - `EntryPanel`: strategy proposes → spot claim → ticket registered, with a
//!   bounded retry when a concurrent admission wins the same spot.
//! - `ExitPanel`: ticket lookup → charge → payment → spot release → ticket
//!   removal, serialized per ticket so each ticket is released at most once.

mod entry;
mod exit;

pub use entry::{AdmissionFailure, AdmissionPolicy, EntryPanel};
pub use exit::{ExitError, ExitPanel, Receipt};
