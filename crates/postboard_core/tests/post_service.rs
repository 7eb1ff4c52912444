use postboard_core::db::open_db_in_memory;
use postboard_core::{PostService, RepoError, SqlitePostRepository};

#[test]
fn service_adds_lists_and_deletes_by_id() {
    let conn = open_db_in_memory().unwrap();
    let service = PostService::new(SqlitePostRepository::try_new(&conn).unwrap());

    let first = service
        .add_post("first", "one", Some("ana".to_string()))
        .unwrap();
    let second = service.add_post("second", "two", None).unwrap();

    let listed = service.find_all().unwrap();
    assert_eq!(listed, vec![first.clone(), second.clone()]);

    let removed = service.delete_by_id(first.id.unwrap()).unwrap();
    assert_eq!(removed, first);
    assert_eq!(service.find_all().unwrap(), vec![second]);
}

#[test]
fn delete_by_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = PostService::new(SqlitePostRepository::try_new(&conn).unwrap());

    let err = service.delete_by_id(404).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
}

#[test]
fn listed_posts_serialize_as_json_array() {
    let conn = open_db_in_memory().unwrap();
    let service = PostService::new(SqlitePostRepository::try_new(&conn).unwrap());
    service.add_post("json", "payload", None).unwrap();

    let value = serde_json::to_value(service.find_all().unwrap()).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "json");
    assert_eq!(items[0]["content"], "payload");
}
