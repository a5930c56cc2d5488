use std::collections::HashMap;

use storage::{
    ClubStore,
    dto::lesson_class::LessonClassResponse,
    error::{Result, StorageError},
    models::{Actor, LessonClassChanges, NewLessonClass, Player},
};
use uuid::Uuid;

/// Active lesson classes with their teacher labels
pub async fn list_classes(store: &dyn ClubStore) -> Result<Vec<LessonClassResponse>> {
    let players = store
        .active_players()
        .await?
        .into_iter()
        .map(|p| (p.player_id, p))
        .collect::<HashMap<_, _>>();

    let classes = store.lesson_classes().await?;

    Ok(classes
        .into_iter()
        .map(|class| {
            let teachers = class.teachers_label(&players);
            LessonClassResponse::new(class, teachers)
        })
        .collect())
}

fn unknown(role: &'static str, id: Uuid) -> impl FnOnce(StorageError) -> StorageError {
    move |e| match e {
        StorageError::NotFound => StorageError::ConstraintViolation(format!("unknown {} {}", role, id)),
        other => other,
    }
}

/// Looks up both teachers, failing when either is not an active player
async fn teachers(
    store: &dyn ClubStore,
    teacher_id: Uuid,
    co_teacher_id: Option<Uuid>,
) -> Result<HashMap<Uuid, Player>> {
    let teacher = store
        .find_player(teacher_id)
        .await
        .map_err(unknown("teacher", teacher_id))?;

    let mut players = HashMap::from([(teacher.player_id, teacher)]);
    if let Some(co_teacher_id) = co_teacher_id {
        let co_teacher = store
            .find_player(co_teacher_id)
            .await
            .map_err(unknown("co-teacher", co_teacher_id))?;
        players.insert(co_teacher.player_id, co_teacher);
    }

    Ok(players)
}

/// Creates a lesson class once both teachers resolve to active players
pub async fn create_class(
    store: &dyn ClubStore,
    class: NewLessonClass,
    actor: &Actor,
) -> Result<LessonClassResponse> {
    let players = teachers(store, class.teacher_id, class.co_teacher_id).await?;

    let class = store.create_lesson_class(class, actor).await?;
    let teachers = class.teachers_label(&players);

    Ok(LessonClassResponse::new(class, teachers))
}

/// Writes a new version of a class. Teachers named by the change must be
/// active players; a teacher left as is is not checked again.
pub async fn update_class(
    store: &dyn ClubStore,
    class_id: Uuid,
    changes: LessonClassChanges,
    actor: &Actor,
) -> Result<LessonClassResponse> {
    if let Some(teacher_id) = changes.teacher_id {
        store
            .find_player(teacher_id)
            .await
            .map_err(unknown("teacher", teacher_id))?;
    }
    if let Some(Some(co_teacher_id)) = changes.co_teacher_id {
        store
            .find_player(co_teacher_id)
            .await
            .map_err(unknown("co-teacher", co_teacher_id))?;
    }

    let class = store.update_lesson_class(class_id, changes, actor).await?;
    let players = store
        .active_players()
        .await?
        .into_iter()
        .map(|p| (p.player_id, p))
        .collect::<HashMap<_, _>>();
    let teachers = class.teachers_label(&players);

    Ok(LessonClassResponse::new(class, teachers))
}

/// Closes a class that no active player is enrolled in
pub async fn deactivate_class(store: &dyn ClubStore, class_id: Uuid, actor: &Actor) -> Result<()> {
    let enrolled = store
        .active_players()
        .await?
        .iter()
        .filter(|p| p.lesson_class_id == Some(class_id))
        .count();
    if enrolled > 0 {
        return Err(StorageError::ConstraintViolation(format!(
            "{} active player(s) still enrolled in class {}",
            enrolled, class_id
        )));
    }

    store.deactivate_lesson_class(class_id, actor).await
}
