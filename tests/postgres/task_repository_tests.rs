//! Task persistence tests for the `PostgreSQL` task repository.

use crate::postgres::helpers::{PgContext, pg_context, waiting_task};
use mockable::DefaultClock;
use rstest::rstest;
use strata::file::domain::UserId;
use strata::insights::services::WAITING_TASK_NAME;
use strata::task::{
    domain::{TASK_PAYLOAD_OBJECT_KEY, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};

#[rstest]
fn stored_task_is_found_with_its_payload(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let ctx = pg_context?;
    let owner = UserId::new();
    let task = waiting_task(owner)?;

    ctx.rt.block_on(ctx.tasks.store(&task))?;
    let found = ctx
        .rt
        .block_on(ctx.tasks.find_by_id(task.id()))?
        .ok_or_else(|| eyre::eyre!("task {} missing", task.id()))?;

    assert_eq!(found.id(), task.id());
    assert_eq!(found.name(), WAITING_TASK_NAME);
    assert_eq!(found.user_id(), owner);
    assert_eq!(found.status(), TaskStatus::Waiting);
    assert!(found.is_indeterminate());
    assert_eq!(found.percentage(), None);
    assert_eq!(found.payload_value(TASK_PAYLOAD_OBJECT_KEY), Some("scan.png"));
    Ok(())
}

#[rstest]
fn update_persists_progress_and_failure(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let ctx = pg_context?;
    let mut task = waiting_task(UserId::new())?;
    ctx.rt.block_on(ctx.tasks.store(&task))?;

    task.report_progress(60, &DefaultClock)?;
    ctx.rt.block_on(ctx.tasks.update(&task))?;
    let running = ctx
        .rt
        .block_on(ctx.tasks.find_by_id(task.id()))?
        .ok_or_else(|| eyre::eyre!("task {} missing", task.id()))?;
    assert_eq!(running.status(), TaskStatus::Running);
    assert_eq!(running.percentage(), Some(60));
    assert!(!running.is_indeterminate());

    task.fail("pipeline crashed", &DefaultClock)?;
    ctx.rt.block_on(ctx.tasks.update(&task))?;
    let failed = ctx
        .rt
        .block_on(ctx.tasks.find_by_id(task.id()))?
        .ok_or_else(|| eyre::eyre!("task {} missing", task.id()))?;
    assert_eq!(failed.status(), TaskStatus::Error);
    assert_eq!(failed.error(), Some("pipeline crashed"));
    assert!(failed.update_time().is_some());
    Ok(())
}

#[rstest]
fn unknown_tasks_are_not_found(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let ctx = pg_context?;
    let task = waiting_task(UserId::new())?;

    let found = ctx.rt.block_on(ctx.tasks.find_by_id(TaskId::new()))?;
    let updated = ctx.rt.block_on(ctx.tasks.update(&task));
    let deleted = ctx.rt.block_on(ctx.tasks.delete(task.id()));

    assert!(found.is_none());
    assert!(matches!(updated, Err(TaskRepositoryError::NotFound(id)) if id == task.id()));
    assert!(matches!(deleted, Err(TaskRepositoryError::NotFound(id)) if id == task.id()));
    Ok(())
}

#[rstest]
fn duplicate_task_ids_are_rejected(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let ctx = pg_context?;
    let task = waiting_task(UserId::new())?;
    ctx.rt.block_on(ctx.tasks.store(&task))?;

    let result = ctx.rt.block_on(ctx.tasks.store(&task));

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()));
    Ok(())
}

#[rstest]
fn deleted_tasks_are_gone(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let ctx = pg_context?;
    let task = waiting_task(UserId::new())?;
    ctx.rt.block_on(ctx.tasks.store(&task))?;

    ctx.rt.block_on(ctx.tasks.delete(task.id()))?;

    assert!(ctx.rt.block_on(ctx.tasks.find_by_id(task.id()))?.is_none());
    Ok(())
}

#[rstest]
fn listing_returns_only_the_users_tasks(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let ctx = pg_context?;
    let owner = UserId::new();
    let first = waiting_task(owner)?;
    let second = waiting_task(owner)?;
    let foreign = waiting_task(UserId::new())?;
    for task in [&first, &second, &foreign] {
        ctx.rt.block_on(ctx.tasks.store(task))?;
    }

    let listed = ctx.rt.block_on(ctx.tasks.list_by_user(owner))?;

    let mut listed_ids = listed.iter().map(|task| task.id()).collect::<Vec<_>>();
    let mut expected = vec![first.id(), second.id()];
    listed_ids.sort_by_key(|id| id.into_inner());
    expected.sort_by_key(|id| id.into_inner());
    assert_eq!(listed_ids, expected);
    assert!(listed.iter().all(|task| task.user_id() == owner));
    Ok(())
}
