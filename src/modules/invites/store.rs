//! Persistence contract for the invite flow.
//!
//! The service only talks to [`InviteStore`]; the Postgres implementation
//! lives here too. Marking an invite used and inserting the link must happen
//! in one transaction, so the atomic step is a single contract method
//! ([`InviteStore::link_and_mark_used`]) instead of separate `insert_relation`
//! and `mark_used` calls.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::model::{InviteCode, TeacherStudentLink, UserRef};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The generated code collided with an existing row (unique constraint).
    #[error("invite code already exists")]
    DuplicateCode,
    /// The `(teacher_id, student_id)` pair already has a link row.
    #[error("teacher-student link already exists")]
    DuplicateRelation,
    /// The invite was consumed by a concurrent redemption.
    #[error("invite code is no longer redeemable")]
    InviteConsumed,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Persists a new invite with `used = false`. Fails with
    /// [`StoreError::DuplicateCode`] when the code is taken.
    async fn insert_invite(&self, code: &str, teacher_id: Uuid) -> Result<InviteCode, StoreError>;

    async fn find_unused_invite_by_code(
        &self,
        code: &str,
    ) -> Result<Option<InviteCode>, StoreError>;

    /// Lookup ignoring the `used` flag. Only used to tell "never existed"
    /// from "already used" in diagnostics.
    async fn find_any_invite_by_code(&self, code: &str) -> Result<Option<InviteCode>, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError>;

    async fn find_relation(
        &self,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<TeacherStudentLink>, StoreError>;

    /// Atomically inserts the link and flips the invite's `used` flag.
    ///
    /// The invite row is locked for the duration of the transaction, so a
    /// concurrent redeemer of the same code either no longer sees it as
    /// unused or fails here with [`StoreError::InviteConsumed`].
    async fn link_and_mark_used(
        &self,
        invite_id: Uuid,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<TeacherStudentLink, StoreError>;
}

pub struct PgInviteStore {
    db: PgPool,
}

impl PgInviteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_unique_violation(err: sqlx::Error, mapped: StoreError) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return mapped;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl InviteStore for PgInviteStore {
    async fn insert_invite(&self, code: &str, teacher_id: Uuid) -> Result<InviteCode, StoreError> {
        sqlx::query_as::<_, InviteCode>(
            "INSERT INTO invite_codes (code, teacher_id)
             VALUES ($1, $2)
             RETURNING id, code, teacher_id, created_at, used",
        )
        .bind(code)
        .bind(teacher_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, StoreError::DuplicateCode))
    }

    async fn find_unused_invite_by_code(
        &self,
        code: &str,
    ) -> Result<Option<InviteCode>, StoreError> {
        let invite = sqlx::query_as::<_, InviteCode>(
            "SELECT id, code, teacher_id, created_at, used
             FROM invite_codes
             WHERE code = $1 AND used = FALSE",
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        Ok(invite)
    }

    async fn find_any_invite_by_code(&self, code: &str) -> Result<Option<InviteCode>, StoreError> {
        let invite = sqlx::query_as::<_, InviteCode>(
            "SELECT id, code, teacher_id, created_at, used
             FROM invite_codes
             WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        Ok(invite)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError> {
        let user = sqlx::query_as::<_, UserRef>("SELECT id, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_relation(
        &self,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<TeacherStudentLink>, StoreError> {
        let link = sqlx::query_as::<_, TeacherStudentLink>(
            "SELECT id, teacher_id, student_id
             FROM teacher_student_links
             WHERE teacher_id = $1 AND student_id = $2",
        )
        .bind(teacher_id)
        .bind(student_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(link)
    }

    async fn link_and_mark_used(
        &self,
        invite_id: Uuid,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<TeacherStudentLink, StoreError> {
        let mut tx = self.db.begin().await?;

        // Row lock: concurrent redemptions of the same code serialize here.
        let invite = sqlx::query_as::<_, InviteCode>(
            "SELECT id, code, teacher_id, created_at, used
             FROM invite_codes
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(invite_id)
        .fetch_optional(&mut *tx)
        .await?;

        match invite {
            Some(invite) if !invite.used => {}
            _ => return Err(StoreError::InviteConsumed),
        }

        let link = sqlx::query_as::<_, TeacherStudentLink>(
            "INSERT INTO teacher_student_links (teacher_id, student_id)
             VALUES ($1, $2)
             RETURNING id, teacher_id, student_id",
        )
        .bind(teacher_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, StoreError::DuplicateRelation))?;

        sqlx::query("UPDATE invite_codes SET used = TRUE WHERE id = $1")
            .bind(invite_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(link)
    }
}
