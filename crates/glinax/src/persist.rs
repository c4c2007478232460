use anyhow::bail;
use glinax_store::{Collection, DocumentSink, JsonArtifacts, PersistenceError, Rows};
use log::{error, info};
use serde::Serialize;
use serde_json::json;

use crate::model::Snapshot;

pub const UNIVERSITIES_FILE: &str = "ghana_universities.json";
pub const SCHOLARSHIPS_FILE: &str = "scholarships.json";
pub const CUT_OFF_POINTS_FILE: &str = "cut_off_points.json";

/// Writes `snapshot` to the JSON artifacts and upserts it into the document
/// store.
///
/// Each destination receives the whole snapshot or keeps its previous
/// state. Both are always attempted; if either fails the returned error
/// names every destination that failed.
pub async fn persist<S>(snapshot: &Snapshot, files: &JsonArtifacts, store: &S) -> anyhow::Result<()>
where
    S: DocumentSink + ?Sized,
{
    let mut failures = Vec::new();

    match write_files(snapshot, files) {
        Ok(()) => info!("Wrote JSON artifacts to {}", files.dir().display()),
        Err(e) => {
            error!("Couldn't write JSON artifacts to {}: {}", files.dir().display(), e);
            failures.push(format!("files: {e}"));
        }
    }

    match upsert_documents(snapshot, store).await {
        Ok(()) => info!("Saved snapshot to the document store"),
        Err(e) => {
            error!("Couldn't save snapshot to the document store: {}", e);
            failures.push(format!("document store: {e}"));
        }
    }

    if !failures.is_empty() {
        bail!("Persistence failed ({})", failures.join("; "));
    }
    Ok(())
}

fn write_files(snapshot: &Snapshot, files: &JsonArtifacts) -> glinax_store::Result<()> {
    let mut batch = files.batch()?;
    batch.stage(UNIVERSITIES_FILE, &snapshot.universities)?;
    batch.stage(SCHOLARSHIPS_FILE, &snapshot.scholarships)?;
    batch.stage(CUT_OFF_POINTS_FILE, &snapshot.cut_off_points)?;
    batch.commit()?;
    Ok(())
}

async fn upsert_documents<S>(snapshot: &Snapshot, store: &S) -> glinax_store::Result<()>
where
    S: DocumentSink + ?Sized,
{
    let table = &snapshot.cut_off_points;
    let cut_offs = table
        .years
        .iter()
        .map(|(year, institutions)| {
            let data = json!({
                "source": table.source,
                "last_updated": table.last_updated,
                "institutions": institutions,
            });
            (year.clone(), data)
        })
        .collect();

    store
        .upsert_batch(vec![
            (Collection::UNIVERSITIES, rows(&snapshot.universities)?),
            (Collection::SCHOLARSHIPS, rows(&snapshot.scholarships)?),
            (Collection::CUT_OFF_POINTS, cut_offs),
        ])
        .await
}

fn rows<'a, T, I>(items: I) -> Result<Rows, PersistenceError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = (&'a String, &'a T)>,
{
    items
        .into_iter()
        .map(|(key, item)| Ok::<_, PersistenceError>((key.clone(), serde_json::to_value(item)?)))
        .collect()
}
