//! When steps for insights lifecycle BDD scenarios.

use super::world::{InsightsWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use strata::{file::domain::UserId, insights::services::BackgroundOutcome};

fn request_insights(
    world: &mut InsightsWorld,
    user_id: UserId,
    language: &str,
) -> Result<(), eyre::Report> {
    let file_id = world.file()?.id();
    match run_async(world.service.create(file_id, language, user_id)) {
        Ok(task) => world.last_task = Some(task),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}

#[when(r#"the user requests insights in "{language}""#)]
fn user_requests_insights(world: &mut InsightsWorld, language: String) -> Result<(), eyre::Report> {
    let owner = world.owner;
    request_insights(world, owner, &language)
}

#[when(r#"the viewer requests insights in "{language}""#)]
fn viewer_requests_insights(
    world: &mut InsightsWorld,
    language: String,
) -> Result<(), eyre::Report> {
    let viewer = world
        .viewer
        .ok_or_else(|| eyre::eyre!("missing viewer in scenario world"))?;
    request_insights(world, viewer, &language)
}

#[when("the user deletes the insights")]
fn user_deletes_insights(world: &mut InsightsWorld) -> Result<(), eyre::Report> {
    let file_id = world.file()?.id();
    let deletion = run_async(world.service.delete(file_id, world.owner))
        .wrap_err("delete insights")?;
    world.last_task = Some(deletion.task.clone());
    world.deletion = Some(deletion);
    Ok(())
}

#[when("the background cleanup finishes")]
fn background_cleanup_finishes(world: &mut InsightsWorld) -> Result<(), eyre::Report> {
    let deletion = world
        .deletion
        .take()
        .ok_or_else(|| eyre::eyre!("missing deletion in scenario world"))?;
    match run_async(deletion.cleanup.wait()) {
        BackgroundOutcome::Completed => Ok(()),
        BackgroundOutcome::Interrupted => Err(eyre::eyre!("cleanup was interrupted")),
    }
}
