use checklist_core::{
    open_db, CategoryPatch, CategoryService, NewQuest, NewStep, QuestService, ServiceError,
    SqliteCategoryRepository, SqliteObjectRepository, SqliteQuestRepository, StepService,
};
use std::collections::HashSet;
use std::thread;

const WRITERS: usize = 4;
const STEPS_PER_WRITER: usize = 10;

#[test]
fn parallel_appends_on_separate_connections_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steps.db");
    let quest_id = {
        let conn = open_db(&path).unwrap();
        let quests = QuestService::new(SqliteQuestRepository::try_new(&conn).unwrap());
        quests.create_quest(NewQuest::named("Defeat Dragon")).unwrap().id
    };

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let path = path.as_path();
            scope.spawn(move || {
                let conn = open_db(path).unwrap();
                let steps = StepService::new(SqliteQuestRepository::try_new(&conn).unwrap());
                for index in 0..STEPS_PER_WRITER {
                    steps
                        .append_step(quest_id, NewStep::text(format!("w{writer}-s{index}")))
                        .unwrap();
                }
            });
        }
    });

    let conn = open_db(&path).unwrap();
    let steps = StepService::new(SqliteQuestRepository::try_new(&conn).unwrap());
    let stored = steps.list_steps(quest_id).unwrap();
    assert_eq!(stored.len(), WRITERS * STEPS_PER_WRITER);

    let unique_ids: HashSet<_> = stored.iter().map(|step| step.id).collect();
    assert_eq!(unique_ids.len(), stored.len());

    for writer in 0..WRITERS {
        let own: Vec<_> = stored
            .iter()
            .filter(|step| step.text.starts_with(&format!("w{writer}-")))
            .map(|step| step.text.clone())
            .collect();
        let expected: Vec<_> = (0..STEPS_PER_WRITER)
            .map(|index| format!("w{writer}-s{index}"))
            .collect();
        assert_eq!(own, expected);
    }
}

#[test]
fn crossing_reparent_requests_never_store_a_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");
    let (first, second) = {
        let conn = open_db(&path).unwrap();
        let service = category_service(&conn);
        (
            service.create_category("First", None, None).unwrap().id,
            service.create_category("Second", None, None).unwrap().id,
        )
    };

    let outcomes: Vec<Result<(), ServiceError>> = thread::scope(|scope| {
        let handles: Vec<_> = [(first, second), (second, first)]
            .into_iter()
            .map(|(node, parent)| {
                let path = path.as_path();
                scope.spawn(move || {
                    let conn = open_db(path).unwrap();
                    let patch = CategoryPatch {
                        parent_id: Some(parent),
                        ..CategoryPatch::default()
                    };
                    category_service(&conn)
                        .update_category(node, patch)
                        .map(|_| ())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(succeeded, 1);
    assert!(outcomes
        .iter()
        .any(|outcome| matches!(outcome, Err(ServiceError::Cycle { .. }))));

    let conn = open_db(&path).unwrap();
    let service = category_service(&conn);
    assert_eq!(service.list_roots().unwrap().len(), 1);
    for path in service.category_tree().unwrap() {
        assert!(path.depth() <= 1);
    }
}

fn category_service(
    conn: &rusqlite::Connection,
) -> CategoryService<SqliteCategoryRepository<'_>, SqliteObjectRepository<'_>> {
    CategoryService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteObjectRepository::try_new(conn).unwrap(),
    )
}

