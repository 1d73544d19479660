//! End-to-end insights lifecycle over in-memory adapters.

use super::helpers::{BUCKET, Workspace, entity, workspace};
use rstest::rstest;
use strata::{
    file::domain::UserId,
    insights::services::{BackgroundOutcome, InsightsError},
    pipeline::domain::{PAYLOAD_LANGUAGE_KEY, PipelineId, PipelineOutcome, PipelineReport},
    search::domain::QueryOptions,
    snapshot::domain::SnapshotStatus,
    task::domain::TaskStatus,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn insights_flow_from_request_to_listing(workspace: Workspace) -> eyre::Result<()> {
    let (file, snapshot) = workspace.upload("scan.png", "originals/scan.png").await?;

    let task = workspace.service.create(file.id(), "deu", workspace.owner).await?;
    let run = workspace.single_submission()?;
    assert_eq!(run.pipeline_id, PipelineId::Insights);
    assert_eq!(run.task_id, task.id());
    assert_eq!(run.bucket, BUCKET);
    assert_eq!(run.key, "originals/scan.png");
    assert_eq!(
        run.payload.get(PAYLOAD_LANGUAGE_KEY).map(String::as_str),
        Some("deu")
    );

    workspace
        .service
        .completion()
        .apply(PipelineReport {
            task_id: task.id(),
            snapshot_id: snapshot.id(),
            outcome: PipelineOutcome::Progress { percentage: 40 },
        })
        .await?;
    let running = workspace.service.tasks().find(task.id()).await?;
    assert_eq!(running.status(), TaskStatus::Running);
    assert_eq!(running.percentage(), Some(40));
    assert_eq!(
        workspace.stored_snapshot(&snapshot).await?.status(),
        SnapshotStatus::Processing
    );

    workspace
        .complete(&run, &[entity("ACME", 1), entity("Invoice", 7)])
        .await?;

    let settled = workspace.stored_snapshot(&snapshot).await?;
    assert_eq!(settled.status(), SnapshotStatus::Ready);
    assert_eq!(settled.task_id(), None);
    assert_eq!(settled.language(), Some("deu"));
    assert!(workspace.service.tasks().find_optional(task.id()).await?.is_none());

    let listed = workspace.first_page(file.id()).await?;
    assert_eq!(
        listed.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(),
        vec!["Invoice", "ACME"]
    );
    let text = workspace.service.download_text(file.id(), workspace.owner).await?;
    assert_eq!(text.bytes, b"ACME Corporation invoice".to_vec());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_run_can_be_requested_again(workspace: Workspace) -> eyre::Result<()> {
    let (file, snapshot) = workspace.upload("scan.png", "originals/scan.png").await?;
    let task = workspace.service.create(file.id(), "eng", workspace.owner).await?;

    workspace
        .service
        .completion()
        .apply(PipelineReport {
            task_id: task.id(),
            snapshot_id: snapshot.id(),
            outcome: PipelineOutcome::Failed {
                message: "tesseract crashed".to_owned(),
            },
        })
        .await?;

    let failed = workspace.service.tasks().find(task.id()).await?;
    assert_eq!(failed.status(), TaskStatus::Error);
    assert_eq!(failed.error(), Some("tesseract crashed"));
    assert_eq!(
        workspace.stored_snapshot(&snapshot).await?.status(),
        SnapshotStatus::Error
    );

    let retry = workspace.service.create(file.id(), "eng", workspace.owner).await?;
    assert_ne!(retry.id(), task.id());
    assert_eq!(retry.status(), TaskStatus::Waiting);
    assert_eq!(workspace.pipeline.submissions()?.len(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_insights_are_no_longer_listed(workspace: Workspace) -> eyre::Result<()> {
    let (file, snapshot) = workspace.upload("scan.png", "originals/scan.png").await?;
    workspace.service.create(file.id(), "eng", workspace.owner).await?;
    let run = workspace.single_submission()?;
    let artifacts = workspace.complete(&run, &[entity("ACME", 3)]).await?;

    let deletion = workspace.service.delete(file.id(), workspace.owner).await?;
    assert_eq!(deletion.task.status(), TaskStatus::Running);
    assert_eq!(deletion.cleanup.wait().await, BackgroundOutcome::Completed);
    workspace.service.runner().drain().await?;

    let cleared = workspace.stored_snapshot(&snapshot).await?;
    assert_eq!(cleared.status(), SnapshotStatus::Ready);
    assert!(!cleared.has_entities());
    assert!(!cleared.has_text());
    let entities_location = artifacts
        .entities
        .ok_or_else(|| eyre::eyre!("missing entities location"))?;
    assert!(!workspace.storage.contains(&entities_location)?);
    assert!(matches!(
        workspace.first_page(file.id()).await,
        Err(InsightsError::InsightsNotFound(id)) if id == file.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_version_serves_outdated_insights_until_refreshed(
    workspace: Workspace,
) -> eyre::Result<()> {
    let (mut file, first) = workspace.upload("scan.png", "originals/scan-v1.png").await?;
    workspace.service.create(file.id(), "fra", workspace.owner).await?;
    let run = workspace.single_submission()?;
    workspace.complete(&run, &[entity("Paris", 2)]).await?;

    let second = workspace
        .upload_version(&mut file, &first, "originals/scan-v2.png")
        .await?;

    let info = workspace.service.read_info(file.id(), workspace.owner).await?;
    assert!(info.is_available);
    assert!(info.is_outdated);
    let summary = info
        .snapshot
        .ok_or_else(|| eyre::eyre!("missing snapshot summary"))?;
    assert_eq!(summary.id, first.id().to_string());
    assert_eq!(summary.language.as_deref(), Some("fra"));

    let listed = workspace.first_page(file.id()).await?;
    assert_eq!(listed.len(), 1);

    workspace.service.patch(file.id(), workspace.owner).await?;
    let refreshed = workspace.stored_snapshot(&second).await?;
    assert_eq!(refreshed.status(), SnapshotStatus::Waiting);
    assert_eq!(refreshed.language(), Some("fra"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_search_only_returns_the_callers_tasks(workspace: Workspace) -> eyre::Result<()> {
    let (file, _) = workspace.upload("scan.png", "originals/scan.png").await?;
    let task = workspace.service.create(file.id(), "eng", workspace.owner).await?;

    let mine = workspace
        .service
        .tasks()
        .search("waiting", workspace.owner, QueryOptions::default())
        .await?;
    let theirs = workspace
        .service
        .tasks()
        .search("waiting", UserId::new(), QueryOptions::default())
        .await?;

    assert_eq!(mine.iter().map(|t| t.id()).collect::<Vec<_>>(), vec![task.id()]);
    assert!(theirs.is_empty());
    Ok(())
}
