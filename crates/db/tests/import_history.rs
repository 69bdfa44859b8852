//! Integration tests for import run history.

use serde_json::json;
use sqlx::PgPool;

use opsboard_core::import::conflict::ConflictStrategy;
use opsboard_db::models::import_run::CreateImportRun;
use opsboard_db::models::user::CreateUser;
use opsboard_db::repositories::{ImportRunRepo, OrganizationRepo, UserRepo};

fn run(org: i64, user: i64, file_name: &str) -> CreateImportRun {
    CreateImportRun {
        organization_id: org,
        team_id: None,
        user_id: user,
        kind: "scorecard",
        file_name: file_name.to_string(),
        strategy: ConflictStrategy::Merge,
        created_count: 3,
        updated_count: 1,
        skipped_count: 0,
        error_count: 1,
        scores_added: 12,
        scores_skipped: 2,
        groups_created: 1,
        errors: json!([{"row_identifier": "Revenue", "message": "boom"}]),
        unmapped_names: json!(["Jordan"]),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_runs_list_newest_first(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, "Acme").await.unwrap();
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            organization_id: org.id,
            first_name: "Pam".to_string(),
            last_name: "Beesly".to_string(),
            email: "pam@acme.test".to_string(),
            role: None,
        },
    )
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    ImportRunRepo::create(&mut conn, &run(org.id, user.id, "first.csv"))
        .await
        .unwrap();
    ImportRunRepo::create(&mut conn, &run(org.id, user.id, "second.csv"))
        .await
        .unwrap();
    drop(conn);

    let runs = ImportRunRepo::list_recent(&pool, org.id, 50).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].file_name, "second.csv");
    assert_eq!(runs[1].file_name, "first.csv");
    assert_eq!(runs[0].strategy, "merge");
    assert_eq!(runs[0].error_count, 1);
    assert_eq!(runs[0].unmapped_names, json!(["Jordan"]));

    let limited = ImportRunRepo::list_recent(&pool, org.id, 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    // Another organization sees nothing.
    let other = OrganizationRepo::create(&pool, "Globex").await.unwrap();
    let none = ImportRunRepo::list_recent(&pool, other.id, 50).await.unwrap();
    assert!(none.is_empty());
}
