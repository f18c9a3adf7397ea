//! End-to-end invite flow against a real Postgres.
//!
//! These tests run only when `TEST_DATABASE_URL` points at a database; they
//! skip silently otherwise so the default `cargo test` run stays green.

mod common;

use classlink::modules::invites::code::CodeGenerator;
use classlink::modules::invites::model::RedemptionOutcome;
use classlink::modules::invites::service::InviteService;
use classlink::modules::invites::store::{InviteStore, PgInviteStore, StoreError};

#[tokio::test]
async fn full_redemption_flow() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let teacher = common::create_test_user(&pool, "teacher", None).await;
    let student = common::create_test_user(&pool, "student", None).await;
    let other_student = common::create_test_user(&pool, "student", None).await;

    let store = PgInviteStore::new(pool.clone());
    let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
        .await
        .unwrap();
    assert_eq!(invite.code.len(), 6);
    assert!(!invite.used);

    let outcome = InviteService::redeem(&store, &invite.code, student)
        .await
        .unwrap();
    assert_eq!(outcome, RedemptionOutcome::Success);

    let link = store.find_relation(teacher, student).await.unwrap();
    assert!(link.is_some());

    let consumed = store.find_any_invite_by_code(&invite.code).await.unwrap();
    assert!(consumed.unwrap().used);

    // The code is spent: anyone else gets InvalidCode now.
    let outcome = InviteService::redeem(&store, &invite.code, other_student)
        .await
        .unwrap();
    assert_eq!(outcome, RedemptionOutcome::InvalidCode);
}

#[tokio::test]
async fn expired_invite_stays_unused() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let teacher = common::create_test_user(&pool, "teacher", None).await;
    let student = common::create_test_user(&pool, "student", None).await;

    let store = PgInviteStore::new(pool.clone());
    let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
        .await
        .unwrap();

    sqlx::query("UPDATE invite_codes SET created_at = NOW() - INTERVAL '8 days' WHERE id = $1")
        .bind(invite.id)
        .execute(&pool)
        .await
        .unwrap();

    let outcome = InviteService::redeem(&store, &invite.code, student)
        .await
        .unwrap();
    assert_eq!(outcome, RedemptionOutcome::Expired);

    let row = store.find_any_invite_by_code(&invite.code).await.unwrap();
    assert!(!row.unwrap().used);
}

#[tokio::test]
async fn already_linked_student_gets_already_linked() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let teacher = common::create_test_user(&pool, "teacher", None).await;
    let student = common::create_test_user(&pool, "student", None).await;

    let store = PgInviteStore::new(pool.clone());

    let first = InviteService::issue(&store, &CodeGenerator::new(), teacher)
        .await
        .unwrap();
    assert_eq!(
        InviteService::redeem(&store, &first.code, student)
            .await
            .unwrap(),
        RedemptionOutcome::Success
    );

    let second = InviteService::issue(&store, &CodeGenerator::new(), teacher)
        .await
        .unwrap();
    let outcome = InviteService::redeem(&store, &second.code, student)
        .await
        .unwrap();
    assert_eq!(outcome, RedemptionOutcome::AlreadyLinked);

    let row = store.find_any_invite_by_code(&second.code).await.unwrap();
    assert!(!row.unwrap().used, "already-linked must not consume the code");
}

#[tokio::test]
async fn store_enforces_code_and_relation_uniqueness() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let teacher = common::create_test_user(&pool, "teacher", None).await;
    let student = common::create_test_user(&pool, "student", None).await;

    let store = PgInviteStore::new(pool.clone());

    // Unique code constraint.
    let code = CodeGenerator::new().generate(12);
    store.insert_invite(&code, teacher).await.unwrap();
    let err = store.insert_invite(&code, teacher).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateCode));

    // Unique (teacher, student) pair, and the losing transaction leaves the
    // second invite untouched.
    let first = store
        .insert_invite(&CodeGenerator::new().generate(12), teacher)
        .await
        .unwrap();
    let second = store
        .insert_invite(&CodeGenerator::new().generate(12), teacher)
        .await
        .unwrap();

    store
        .link_and_mark_used(first.id, teacher, student)
        .await
        .unwrap();
    let err = store
        .link_and_mark_used(second.id, teacher, student)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateRelation));

    let row = store.find_any_invite_by_code(&second.code).await.unwrap();
    assert!(!row.unwrap().used);
}

#[tokio::test]
async fn consumed_invite_cannot_be_linked_again() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let teacher = common::create_test_user(&pool, "teacher", None).await;
    let first_student = common::create_test_user(&pool, "student", None).await;
    let second_student = common::create_test_user(&pool, "student", None).await;

    let store = PgInviteStore::new(pool.clone());
    let invite = store
        .insert_invite(&CodeGenerator::new().generate(12), teacher)
        .await
        .unwrap();

    store
        .link_and_mark_used(invite.id, teacher, first_student)
        .await
        .unwrap();

    let err = store
        .link_and_mark_used(invite.id, teacher, second_student)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InviteConsumed));
}
