use std::path::PathBuf;

use anyhow::bail;
use azdocs_shared::types::AccessLevel;

use crate::render;
use crate::state::AppState;
use crate::views::{UploadStatus, UploadView};

pub async fn upload(state: &AppState, files: &[PathBuf], level: AccessLevel) -> anyhow::Result<()> {
    let mut view = UploadView::new().with_default_level(level);

    for rejected in view.add_files(files) {
        eprintln!("skipped {}: {}", rejected.path.display(), rejected.reason);
    }
    for item in view.items() {
        println!("{}", render::upload_item(item));
    }

    let Some(results) = view.upload_all(&state.api).await else {
        bail!("No PDF files selected.");
    };
    for result in results {
        println!("{}", render::upload_result(result));
    }

    let failed = results
        .iter()
        .filter(|r| r.status == UploadStatus::Error)
        .count();
    if failed > 0 {
        bail!("{failed} of {} uploads failed", results.len());
    }
    Ok(())
}
