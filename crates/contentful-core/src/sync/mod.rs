//! Entry synchronization pipeline

mod action;
mod backfill;
mod handler;

pub use action::{Effect, WebhookAction};
pub use backfill::{backfill, BackfillReport, SkippedEntry};
pub use handler::{EntryHandler, Outcome};
