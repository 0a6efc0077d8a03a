mod common;

use facilities_server::{
    entities::{provider_activity, service_provider, tool, user},
    seed::{seed, SeedError},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn seeds_sample_data_once() {
    let db = common::database().await;

    let report = seed(&db, false).await.expect("first seed");
    assert_eq!(report.users, 3);
    assert_eq!(report.providers, 5);
    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 3);
    assert_eq!(provider_activity::Entity::find().count(&db).await.unwrap(), 20);

    let multimeter = tool::Entity::find()
        .filter(tool::Column::SerialNumber.eq("MM-001"))
        .one(&db)
        .await
        .unwrap()
        .expect("multimeter seeded");
    assert!(multimeter.checked_out_to.is_some());
    assert!(multimeter.checked_out_at.is_some());

    let again = seed(&db, false).await;
    assert!(matches!(again, Err(SeedError::AlreadySeeded)));
}

#[tokio::test]
async fn reset_replaces_existing_rows() {
    let db = common::database().await;
    seed(&db, false).await.expect("first seed");
    seed(&db, true).await.expect("reseed");

    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 3);
    assert_eq!(service_provider::Entity::find().count(&db).await.unwrap(), 5);
}
