//! Given steps for insights lifecycle BDD scenarios.

use super::world::{InsightsWorld, run_async};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;
use strata::{
    file::{
        domain::{File, Permission, UserId},
        ports::FileRepository,
    },
    insights::domain::InsightsEntity,
    snapshot::{
        domain::{InsightsArtifacts, Snapshot, SnapshotStatus, SnapshotVersion},
        ports::SnapshotRepository,
    },
    storage::{domain::ObjectLocation, ports::ObjectStorage},
};

const BUCKET: &str = "workspace";

#[given(r#"an image file "{name}" owned by the user"#)]
fn image_file_owned_by_user(world: &mut InsightsWorld, name: String) -> Result<(), eyre::Report> {
    let mut file = File::new_file(name.as_str(), &DefaultClock)?;
    let snapshot = Snapshot::new(
        file.id(),
        SnapshotVersion::new(1)?,
        ObjectLocation::new(BUCKET, format!("originals/{name}")),
        &DefaultClock,
    );
    file.set_snapshot(snapshot.id(), &DefaultClock);
    run_async(world.snapshots.store(&snapshot)).wrap_err("store snapshot")?;
    run_async(world.files.store(&file)).wrap_err("store file")?;
    world.guard.grant(world.owner, file.id(), Permission::Owner)?;
    world.file = Some(file);
    world.snapshot = Some(snapshot);
    Ok(())
}

#[given("a viewer of the file")]
fn viewer_of_file(world: &mut InsightsWorld) -> Result<(), eyre::Report> {
    let viewer = UserId::new();
    let file_id = world.file()?.id();
    world.guard.grant(viewer, file_id, Permission::Viewer)?;
    world.viewer = Some(viewer);
    Ok(())
}

#[given(r#"the user has requested insights in "{language}""#)]
fn user_has_requested_insights(
    world: &mut InsightsWorld,
    language: String,
) -> Result<(), eyre::Report> {
    let file_id = world.file()?.id();
    let task = run_async(world.service.create(file_id, &language, world.owner))
        .wrap_err("request insights in scenario setup")?;
    world.last_task = Some(task);
    Ok(())
}

#[given("the current snapshot has insights")]
fn current_snapshot_has_insights(world: &mut InsightsWorld) -> Result<(), eyre::Report> {
    let mut snapshot = world.snapshot()?.clone();
    let entities = ObjectLocation::new(BUCKET, format!("{}/entities.json", snapshot.id()));
    let body = serde_json::to_vec(&[InsightsEntity {
        text: "ACME".to_owned(),
        label: "ORG".to_owned(),
        frequency: 2,
    }])?;
    run_async(world.storage.put_object(&entities, body)).wrap_err("write entities")?;
    snapshot.set_language("eng", &DefaultClock);
    snapshot.transition_to(SnapshotStatus::Waiting, &DefaultClock)?;
    snapshot.record_insights(
        InsightsArtifacts {
            entities: Some(entities),
            ..InsightsArtifacts::default()
        },
        &DefaultClock,
    );
    snapshot.transition_to(SnapshotStatus::Ready, &DefaultClock)?;
    run_async(world.snapshots.update(&snapshot)).wrap_err("update snapshot")?;
    world.snapshot = Some(snapshot);
    Ok(())
}
