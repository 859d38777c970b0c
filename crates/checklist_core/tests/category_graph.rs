use checklist_core::{
    open_db_in_memory, CategoryPatch, CategoryService, EntityRef, ErrorKind, NewObject,
    ObjectService, ServiceError, SqliteCategoryRepository, SqliteObjectRepository,
    ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

type Categories<'conn> =
    CategoryService<SqliteCategoryRepository<'conn>, SqliteObjectRepository<'conn>>;
type Objects<'conn> = ObjectService<SqliteObjectRepository<'conn>, SqliteCategoryRepository<'conn>>;

#[test]
fn child_category_resolves_chain_through_parent() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    let swords = service
        .create_category("Swords", Some("https://wiki/swords".to_string()), Some(weapons.id))
        .unwrap();

    assert!(weapons.is_root());
    assert_eq!(swords.parent_id, Some(weapons.id));
    assert_eq!(names(&service.ancestor_chain(swords.id).unwrap()), ["Swords", "Weapons"]);
    assert_eq!(names(&service.ancestor_chain(weapons.id).unwrap()), ["Weapons"]);
    assert_eq!(names(&service.list_roots().unwrap()), ["Weapons"]);
    assert_eq!(names(&service.list_children(weapons.id).unwrap()), ["Swords"]);
    assert!(service.list_children(swords.id).unwrap().is_empty());
    assert!(service.list_children(Uuid::new_v4()).unwrap().is_empty());
}

#[test]
fn reparenting_under_descendant_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    let swords = service
        .create_category("Swords", None, Some(weapons.id))
        .unwrap();
    let katanas = service
        .create_category("Katanas", None, Some(swords.id))
        .unwrap();

    let err = service
        .update_category(weapons.id, parent_patch(swords.id))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Cycle { category_id, parent_id }
            if category_id == weapons.id && parent_id == swords.id
    ));
    assert_eq!(err.kind(), ErrorKind::Cycle);
    assert_eq!(err.http_status(), 422);

    let err = service
        .update_category(weapons.id, parent_patch(katanas.id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Cycle { .. }));

    let err = service
        .update_category(swords.id, parent_patch(swords.id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Cycle { .. }));

    assert!(service.get_category(weapons.id).unwrap().is_root());
    assert_eq!(
        service.get_category(swords.id).unwrap().parent_id,
        Some(weapons.id)
    );
}

#[test]
fn reparenting_to_unrelated_branch_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    let armor = service.create_category("Armor", None, None).unwrap();
    let swords = service
        .create_category("Swords", None, Some(weapons.id))
        .unwrap();

    let moved = service
        .update_category(swords.id, parent_patch(armor.id))
        .unwrap();

    assert_eq!(moved.parent_id, Some(armor.id));
    assert_eq!(names(&service.ancestor_chain(swords.id).unwrap()), ["Swords", "Armor"]);
    assert!(service.list_children(weapons.id).unwrap().is_empty());
}

#[test]
fn missing_parent_is_reported_as_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);
    let ghost = Uuid::new_v4();

    let err = service.create_category("Swords", None, Some(ghost)).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(EntityRef::Category(id)) if id == ghost));
    assert_eq!(err.http_status(), 404);
    assert!(service.list_categories().unwrap().is_empty());
}

#[test]
fn names_are_normalized_and_unique() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);

    let weapons = service.create_category("  Weapons ", None, None).unwrap();
    assert_eq!(weapons.name, "Weapons");

    let err = service.create_category("Weapons", None, None).unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateName { entity: "category", .. }));
    assert_eq!(err.http_status(), 422);

    let armor = service.create_category("Armor", None, None).unwrap();
    let rename = CategoryPatch {
        name: Some("Weapons".to_string()),
        ..CategoryPatch::default()
    };
    assert!(matches!(
        service.update_category(armor.id, rename).unwrap_err(),
        ServiceError::DuplicateName { .. }
    ));

    let same_name = CategoryPatch {
        name: Some("Weapons".to_string()),
        link: Some("https://wiki/weapons".to_string()),
        ..CategoryPatch::default()
    };
    let updated = service.update_category(weapons.id, same_name).unwrap();
    assert_eq!(updated.link.as_deref(), Some("https://wiki/weapons"));
}

#[test]
fn blank_name_and_empty_patch_are_validation_errors() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);

    let err = service.create_category("   ", None, None).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::BlankField("name"))
    ));
    assert_eq!(err.http_status(), 422);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    let err = service
        .update_category(weapons.id, CategoryPatch::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyPatch("category"))
    ));
}

#[test]
fn updating_unknown_category_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);
    let ghost = Uuid::new_v4();

    let err = service
        .update_category(
            ghost,
            CategoryPatch {
                link: Some("https://wiki".to_string()),
                ..CategoryPatch::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(EntityRef::Category(id)) if id == ghost));
}

#[test]
fn delete_cascades_objects_and_orphans_children() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);
    let catalog = objects(&conn);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    let swords = service
        .create_category("Swords", None, Some(weapons.id))
        .unwrap();
    catalog
        .create_object(NewObject::named(weapons.id, "Club"))
        .unwrap();
    catalog
        .create_object(NewObject::named(weapons.id, "Spear"))
        .unwrap();
    let katana = catalog
        .create_object(NewObject::named(swords.id, "Katana"))
        .unwrap();

    let report = service.delete_category(weapons.id).unwrap();

    assert_eq!(report.category_id, weapons.id);
    assert_eq!(report.objects_deleted, 2);
    assert_eq!(report.orphaned_children, 1);
    assert!(matches!(
        service.get_category(weapons.id).unwrap_err(),
        ServiceError::NotFound(EntityRef::Category(_))
    ));
    assert!(catalog
        .list_objects_in_category(weapons.id)
        .unwrap()
        .is_empty());
    assert_eq!(catalog.list_objects().unwrap(), vec![katana]);

    let orphan = service.get_category(swords.id).unwrap();
    assert_eq!(orphan.parent_id, Some(weapons.id));
    assert_eq!(names(&service.ancestor_chain(swords.id).unwrap()), ["Swords"]);

    let err = service.delete_category(weapons.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Category(id)) if id == weapons.id));
}

#[test]
fn cascade_objects_can_be_rerun_after_partial_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);
    let catalog = objects(&conn);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    catalog
        .create_object(NewObject::named(weapons.id, "Club"))
        .unwrap();
    conn.execute(
        "DELETE FROM categories WHERE category_uuid = ?1;",
        [weapons.id.to_string()],
    )
    .unwrap();

    assert_eq!(service.cascade_objects(weapons.id).unwrap(), 1);
    assert_eq!(service.cascade_objects(weapons.id).unwrap(), 0);
    assert!(catalog.list_objects().unwrap().is_empty());
}

#[test]
fn failed_object_cascade_keeps_category_removed_and_can_be_rerun() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);
    let catalog = objects(&conn);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    catalog
        .create_object(NewObject::named(weapons.id, "Club"))
        .unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_object_delete BEFORE DELETE ON objects
         BEGIN SELECT RAISE(ABORT, 'object delete blocked'); END;",
    )
    .unwrap();

    let err = service.delete_category(weapons.id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::CascadeIncomplete { category_id, .. } if category_id == weapons.id
    ));
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(err.http_status(), 500);
    assert!(matches!(
        service.get_category(weapons.id).unwrap_err(),
        ServiceError::NotFound(EntityRef::Category(_))
    ));
    assert_eq!(
        catalog.list_objects_in_category(weapons.id).unwrap().len(),
        1
    );

    conn.execute_batch("DROP TRIGGER block_object_delete;")
        .unwrap();
    assert_eq!(service.cascade_objects(weapons.id).unwrap(), 1);
    assert!(catalog.list_objects().unwrap().is_empty());
}

#[test]
fn stored_cycle_is_reported_instead_of_looping() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    insert_raw_category(&conn, first, "First", Some(second));
    insert_raw_category(&conn, second, "Second", Some(first));

    let err = service.ancestor_chain(first).unwrap_err();
    assert!(matches!(err, ServiceError::Cycle { .. }));
    assert_eq!(err.kind(), ErrorKind::Cycle);

    assert!(matches!(
        service.category_tree().unwrap_err(),
        ServiceError::Cycle { .. }
    ));
}

#[test]
fn category_tree_resolves_every_chain_from_one_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let service = categories(&conn);

    let weapons = service.create_category("Weapons", None, None).unwrap();
    let swords = service
        .create_category("Swords", None, Some(weapons.id))
        .unwrap();
    let katanas = service
        .create_category("Katanas", None, Some(swords.id))
        .unwrap();

    let tree = service.category_tree().unwrap();
    assert_eq!(tree.len(), 3);

    let katana_path = tree
        .iter()
        .find(|path| path.category_id == katanas.id)
        .unwrap();
    assert_eq!(katana_path.depth(), 2);
    assert_eq!(names(&katana_path.chain), ["Katanas", "Swords", "Weapons"]);
    assert_eq!(katana_path.top().map(|top| top.id), Some(weapons.id));

    let weapons_path = tree
        .iter()
        .find(|path| path.category_id == weapons.id)
        .unwrap();
    assert_eq!(weapons_path.depth(), 0);
}

fn categories(conn: &Connection) -> Categories<'_> {
    CategoryService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteObjectRepository::try_new(conn).unwrap(),
    )
}

fn objects(conn: &Connection) -> Objects<'_> {
    ObjectService::new(
        SqliteObjectRepository::try_new(conn).unwrap(),
        SqliteCategoryRepository::try_new(conn).unwrap(),
    )
}

fn parent_patch(parent_id: Uuid) -> CategoryPatch {
    CategoryPatch {
        parent_id: Some(parent_id),
        ..CategoryPatch::default()
    }
}

fn names(categories: &[checklist_core::Category]) -> Vec<&str> {
    categories
        .iter()
        .map(|category| category.name.as_str())
        .collect()
}

fn insert_raw_category(conn: &Connection, id: Uuid, name: &str, parent_id: Option<Uuid>) {
    conn.execute(
        "INSERT INTO categories (category_uuid, name, parent_uuid) VALUES (?1, ?2, ?3);",
        rusqlite::params![id.to_string(), name, parent_id.map(|id| id.to_string())],
    )
    .unwrap();
}
