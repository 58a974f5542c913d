//! Bulk load of published content into the mirror

use serde::Serialize;

use crate::api::{ContentKind, EntrySource};
use crate::error::{Error, Result};
use crate::services::MirrorService;

use super::action::WebhookAction;
use super::handler::Outcome;

/// Entry the backfill could not mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub kind: String,
    pub contentful_id: String,
    pub reason: String,
}

/// Summary of one backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl BackfillReport {
    /// Number of entries written to the mirror
    pub const fn written(&self) -> usize {
        self.created + self.updated
    }
}

/// Publish every asset, then every entry, from `source` into the mirror.
///
/// Entries whose content type has no model, or whose payload is malformed,
/// are recorded in the report and skipped. Any other failure aborts the run.
/// Rows for content deleted upstream are left alone; deletions arrive through
/// webhooks.
pub async fn backfill(source: &dyn EntrySource, mirror: &MirrorService) -> Result<BackfillReport> {
    let mut report = BackfillReport::default();
    for kind in [ContentKind::Assets, ContentKind::Entries] {
        backfill_kind(source, mirror, kind, &mut report).await?;
    }

    tracing::info!(
        created = report.created,
        updated = report.updated,
        skipped = report.skipped.len(),
        "Backfill finished"
    );
    Ok(report)
}

async fn backfill_kind(
    source: &dyn EntrySource,
    mirror: &MirrorService,
    kind: ContentKind,
    report: &mut BackfillReport,
) -> Result<()> {
    let mut skip = 0;
    loop {
        let page = source.published(kind, skip).await?;
        if page.items.is_empty() {
            break;
        }
        skip += page.items.len();

        for payload in &page.items {
            match mirror.apply(&WebhookAction::Publish, payload).await {
                Ok(Outcome::Created { .. }) => report.created += 1,
                Ok(Outcome::Updated { .. }) => report.updated += 1,
                Ok(_) => {}
                Err(error)
                    if error.is_unprocessable() || matches!(error, Error::MalformedPayload(_)) =>
                {
                    skipped(report, kind, payload.id(), &error);
                }
                Err(error) => return Err(error),
            }
        }

        tracing::debug!(kind = %kind, fetched = skip, total = page.total, "Backfilled page");
        if skip >= page.total {
            break;
        }
    }
    Ok(())
}

fn skipped(report: &mut BackfillReport, kind: ContentKind, id: Result<&str>, error: &Error) {
    let contentful_id = id.unwrap_or_default().to_string();
    tracing::warn!(kind = %kind, contentful_id = %contentful_id, "Skipping entry: {error}");
    report.skipped.push(SkippedEntry {
        kind: kind.to_string(),
        contentful_id,
        reason: error.to_string(),
    });
}
