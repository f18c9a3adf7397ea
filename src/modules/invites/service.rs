use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;

use super::code::{CODE_LENGTH, CodeGenerator};
use super::model::{InviteCode, InviteSummary, LinkedStudent, LinkedTeacher, RedemptionOutcome};
use super::store::{InviteStore, StoreError};

/// Upper bound on code-generation attempts. Collisions are rare (32^6
/// combinations), so running out of attempts signals a saturated code space
/// or a misbehaving store, not bad luck.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// Days a code stays redeemable, measured from `created_at`.
pub const DEFAULT_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("Failed to generate a unique invite code after {0} attempts")]
    ExhaustedRetries(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct InviteService;

impl InviteService {
    /// Issues a fresh invite code for a teacher.
    ///
    /// Retries on code collision; any other store failure aborts
    /// immediately. [`InviteError::ExhaustedRetries`] is fatal for the call
    /// and surfaces to the client as an operational 500.
    pub async fn issue(
        store: &impl InviteStore,
        generator: &CodeGenerator,
        teacher_id: Uuid,
    ) -> Result<InviteCode, InviteError> {
        Self::issue_with_attempts(store, generator, teacher_id, MAX_CODE_ATTEMPTS).await
    }

    #[instrument(skip(store, generator))]
    pub(crate) async fn issue_with_attempts(
        store: &impl InviteStore,
        generator: &CodeGenerator,
        teacher_id: Uuid,
        max_attempts: u32,
    ) -> Result<InviteCode, InviteError> {
        for attempt in 1..=max_attempts {
            let code = generator.generate(CODE_LENGTH);

            match store.insert_invite(&code, teacher_id).await {
                Ok(invite) => {
                    debug!(code = %invite.code, %teacher_id, "invite code issued");
                    return Ok(invite);
                }
                Err(StoreError::DuplicateCode) => {
                    warn!(attempt, max_attempts, "invite code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(InviteError::ExhaustedRetries(max_attempts))
    }

    /// Redeems a code on behalf of a student, linking them to the issuing
    /// teacher.
    ///
    /// Business rejections come back as [`RedemptionOutcome`] variants; only
    /// infrastructure failures are errors.
    pub async fn redeem(
        store: &impl InviteStore,
        code: &str,
        student_id: Uuid,
    ) -> Result<RedemptionOutcome, InviteError> {
        Self::redeem_at(store, code, student_id, DEFAULT_TTL_DAYS, Utc::now()).await
    }

    /// Redemption with an explicit clock and TTL. Checks run strictly in
    /// this order, each short-circuiting to its outcome:
    /// unused lookup, expiry, student exists, student role, existing link,
    /// atomic link+consume.
    #[instrument(skip(store, now))]
    pub(crate) async fn redeem_at(
        store: &impl InviteStore,
        code: &str,
        student_id: Uuid,
        ttl_days: i64,
        now: DateTime<Utc>,
    ) -> Result<RedemptionOutcome, InviteError> {
        let Some(invite) = store.find_unused_invite_by_code(code).await? else {
            // Diagnostics only: the caller sees InvalidCode either way.
            match store.find_any_invite_by_code(code).await? {
                Some(_) => debug!(code, "invite code exists but is already used"),
                None => debug!(code, "invite code not found"),
            }
            return Ok(RedemptionOutcome::InvalidCode);
        };

        // Expired codes stay un-"used": expiry must be re-checked on every
        // lookup, the flag alone is not enough.
        if now - invite.created_at > Duration::days(ttl_days) {
            debug!(code, %invite.created_at, "invite code expired");
            return Ok(RedemptionOutcome::Expired);
        }

        let Some(student) = store.find_user(student_id).await? else {
            debug!(%student_id, "redeeming student not found");
            return Ok(RedemptionOutcome::StudentNotFound);
        };

        if student.role != UserRole::Student.as_str() {
            warn!(%student_id, role = %student.role, "non-student tried to redeem an invite");
            return Ok(RedemptionOutcome::InvalidCode);
        }

        if store
            .find_relation(invite.teacher_id, student.id)
            .await?
            .is_some()
        {
            // The code is not consumed: it stays redeemable by other
            // students.
            debug!(%student_id, teacher_id = %invite.teacher_id, "student already linked");
            return Ok(RedemptionOutcome::AlreadyLinked);
        }

        match store
            .link_and_mark_used(invite.id, invite.teacher_id, student.id)
            .await
        {
            Ok(_) => Ok(RedemptionOutcome::Success),
            // Lost a race: another redemption consumed the code or created
            // the same link first. Conservative failure, no partial state.
            Err(StoreError::DuplicateRelation | StoreError::InviteConsumed) => {
                warn!(code, %student_id, "redemption lost a concurrent race");
                Ok(RedemptionOutcome::InvalidCode)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(db))]
    pub async fn invites_for_teacher(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<InviteSummary>, AppError> {
        let invites = sqlx::query_as::<_, InviteSummary>(
            "SELECT id, code, created_at, used
             FROM invite_codes
             WHERE teacher_id = $1
             ORDER BY created_at DESC",
        )
        .bind(teacher_id)
        .fetch_all(db)
        .await?;

        Ok(invites)
    }

    #[instrument(skip(db))]
    pub async fn linked_students(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<LinkedStudent>, AppError> {
        let students = sqlx::query_as::<_, LinkedStudent>(
            "SELECT u.id, u.full_name, u.email
             FROM users u
             JOIN teacher_student_links l ON l.student_id = u.id
             WHERE l.teacher_id = $1
             ORDER BY u.full_name",
        )
        .bind(teacher_id)
        .fetch_all(db)
        .await?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn linked_teachers(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<LinkedTeacher>, AppError> {
        let teachers = sqlx::query_as::<_, LinkedTeacher>(
            "SELECT u.id, u.full_name, u.email
             FROM users u
             JOIN teacher_student_links l ON l.teacher_id = u.id
             WHERE l.student_id = $1
             ORDER BY u.full_name",
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(teachers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::invites::code::CODE_ALPHABET;
    use crate::modules::invites::model::{TeacherStudentLink, UserRef};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryState {
        invites: Vec<InviteCode>,
        links: Vec<TeacherStudentLink>,
        users: HashMap<Uuid, UserRef>,
    }

    /// In-memory store honoring the same uniqueness and atomicity rules as
    /// the Postgres implementation.
    #[derive(Default)]
    struct MemoryInviteStore {
        state: Mutex<MemoryState>,
    }

    impl MemoryInviteStore {
        fn new() -> Self {
            Self::default()
        }

        fn add_user(&self, role: UserRole) -> Uuid {
            let id = Uuid::new_v4();
            self.state.lock().unwrap().users.insert(
                id,
                UserRef {
                    id,
                    role: role.as_str().to_string(),
                },
            );
            id
        }

        fn set_created_at(&self, invite_id: Uuid, created_at: DateTime<Utc>) {
            let mut state = self.state.lock().unwrap();
            let invite = state
                .invites
                .iter_mut()
                .find(|i| i.id == invite_id)
                .expect("invite must exist");
            invite.created_at = created_at;
        }

        fn invite(&self, invite_id: Uuid) -> InviteCode {
            self.state
                .lock()
                .unwrap()
                .invites
                .iter()
                .find(|i| i.id == invite_id)
                .cloned()
                .expect("invite must exist")
        }

        fn link_count(&self, teacher_id: Uuid, student_id: Uuid) -> usize {
            self.state
                .lock()
                .unwrap()
                .links
                .iter()
                .filter(|l| l.teacher_id == teacher_id && l.student_id == student_id)
                .count()
        }
    }

    #[async_trait]
    impl InviteStore for MemoryInviteStore {
        async fn insert_invite(
            &self,
            code: &str,
            teacher_id: Uuid,
        ) -> Result<InviteCode, StoreError> {
            let mut state = self.state.lock().unwrap();
            if state.invites.iter().any(|i| i.code == code) {
                return Err(StoreError::DuplicateCode);
            }
            let invite = InviteCode {
                id: Uuid::new_v4(),
                code: code.to_string(),
                teacher_id,
                created_at: Utc::now(),
                used: false,
            };
            state.invites.push(invite.clone());
            Ok(invite)
        }

        async fn find_unused_invite_by_code(
            &self,
            code: &str,
        ) -> Result<Option<InviteCode>, StoreError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .invites
                .iter()
                .find(|i| i.code == code && !i.used)
                .cloned())
        }

        async fn find_any_invite_by_code(
            &self,
            code: &str,
        ) -> Result<Option<InviteCode>, StoreError> {
            let state = self.state.lock().unwrap();
            Ok(state.invites.iter().find(|i| i.code == code).cloned())
        }

        async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError> {
            let state = self.state.lock().unwrap();
            Ok(state.users.get(&id).cloned())
        }

        async fn find_relation(
            &self,
            teacher_id: Uuid,
            student_id: Uuid,
        ) -> Result<Option<TeacherStudentLink>, StoreError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .links
                .iter()
                .find(|l| l.teacher_id == teacher_id && l.student_id == student_id)
                .cloned())
        }

        async fn link_and_mark_used(
            &self,
            invite_id: Uuid,
            teacher_id: Uuid,
            student_id: Uuid,
        ) -> Result<TeacherStudentLink, StoreError> {
            let mut state = self.state.lock().unwrap();

            let used = state
                .invites
                .iter()
                .find(|i| i.id == invite_id)
                .map(|i| i.used);
            match used {
                Some(false) => {}
                _ => return Err(StoreError::InviteConsumed),
            }

            if state
                .links
                .iter()
                .any(|l| l.teacher_id == teacher_id && l.student_id == student_id)
            {
                return Err(StoreError::DuplicateRelation);
            }

            let link = TeacherStudentLink {
                id: Uuid::new_v4(),
                teacher_id,
                student_id,
            };
            state.links.push(link.clone());

            let invite = state
                .invites
                .iter_mut()
                .find(|i| i.id == invite_id)
                .expect("invite checked above");
            invite.used = true;

            Ok(link)
        }
    }

    /// Delegating store whose `find_relation` always misses, simulating the
    /// window where a concurrent redemption commits between the service's
    /// relation check and its transaction.
    struct RacyStore {
        inner: MemoryInviteStore,
    }

    #[async_trait]
    impl InviteStore for RacyStore {
        async fn insert_invite(
            &self,
            code: &str,
            teacher_id: Uuid,
        ) -> Result<InviteCode, StoreError> {
            self.inner.insert_invite(code, teacher_id).await
        }

        async fn find_unused_invite_by_code(
            &self,
            code: &str,
        ) -> Result<Option<InviteCode>, StoreError> {
            self.inner.find_unused_invite_by_code(code).await
        }

        async fn find_any_invite_by_code(
            &self,
            code: &str,
        ) -> Result<Option<InviteCode>, StoreError> {
            self.inner.find_any_invite_by_code(code).await
        }

        async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>, StoreError> {
            self.inner.find_user(id).await
        }

        async fn find_relation(
            &self,
            _teacher_id: Uuid,
            _student_id: Uuid,
        ) -> Result<Option<TeacherStudentLink>, StoreError> {
            Ok(None)
        }

        async fn link_and_mark_used(
            &self,
            invite_id: Uuid,
            teacher_id: Uuid,
            student_id: Uuid,
        ) -> Result<TeacherStudentLink, StoreError> {
            self.inner
                .link_and_mark_used(invite_id, teacher_id, student_id)
                .await
        }
    }

    #[tokio::test]
    async fn issue_persists_an_unused_six_symbol_code() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();

        assert_eq!(invite.code.len(), CODE_LENGTH);
        assert!(invite.code.chars().all(|c| CODE_ALPHABET.contains(c)));
        assert!(!invite.used);
        assert_eq!(invite.teacher_id, teacher);
    }

    #[tokio::test]
    async fn issued_codes_never_repeat() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let generator = CodeGenerator::new();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let invite = InviteService::issue(&store, &generator, teacher)
                .await
                .unwrap();
            assert!(seen.insert(invite.code), "duplicate code issued");
        }
    }

    #[tokio::test]
    async fn issue_fails_after_exhausting_attempts_on_saturated_code_space() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        // One symbol means every generated code is identical.
        let generator = CodeGenerator::with_alphabet("A");

        InviteService::issue(&store, &generator, teacher)
            .await
            .unwrap();

        let err = InviteService::issue(&store, &generator, teacher)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InviteError::ExhaustedRetries(MAX_CODE_ATTEMPTS)
        ));
    }

    #[tokio::test]
    async fn redeem_links_student_and_consumes_the_code() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let student = store.add_user(UserRole::Student);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();

        let outcome = InviteService::redeem(&store, &invite.code, student)
            .await
            .unwrap();

        assert_eq!(outcome, RedemptionOutcome::Success);
        assert_eq!(store.link_count(teacher, student), 1);
        assert!(store.invite(invite.id).used);
    }

    #[tokio::test]
    async fn used_code_is_invalid_for_the_next_student() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let first = store.add_user(UserRole::Student);
        let second = store.add_user(UserRole::Student);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();
        InviteService::redeem(&store, &invite.code, first)
            .await
            .unwrap();

        let outcome = InviteService::redeem(&store, &invite.code, second)
            .await
            .unwrap();

        assert_eq!(outcome, RedemptionOutcome::InvalidCode);
        assert_eq!(store.link_count(teacher, second), 0);
    }

    #[tokio::test]
    async fn expired_code_is_rejected_but_never_consumed() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let student = store.add_user(UserRole::Student);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();
        store.set_created_at(invite.id, Utc::now() - Duration::days(8));

        let outcome = InviteService::redeem(&store, &invite.code, student)
            .await
            .unwrap();

        assert_eq!(outcome, RedemptionOutcome::Expired);
        assert!(!store.invite(invite.id).used);
        assert_eq!(store.link_count(teacher, student), 0);
    }

    #[tokio::test]
    async fn expiry_is_monotonic() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let student = store.add_user(UserRole::Student);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();
        let created_at = store.invite(invite.id).created_at;

        // Exactly at the TTL boundary the code is still redeemable.
        let boundary = created_at + Duration::days(DEFAULT_TTL_DAYS);
        let outcome =
            InviteService::redeem_at(&store, &invite.code, student, DEFAULT_TTL_DAYS, boundary)
                .await
                .unwrap();
        assert_eq!(outcome, RedemptionOutcome::Success);

        // Once past it, every later attempt (by a fresh student) is expired.
        let other = store.add_user(UserRole::Student);
        for days in [8, 30, 365] {
            let later = created_at + Duration::days(days);
            let outcome =
                InviteService::redeem_at(&store, &invite.code, other, DEFAULT_TTL_DAYS, later)
                    .await
                    .unwrap();
            // The earlier successful redemption already consumed this code,
            // so the post-expiry state is "invalid", never "success".
            assert_eq!(outcome, RedemptionOutcome::InvalidCode);
        }
    }

    #[tokio::test]
    async fn expired_code_stays_expired_on_later_attempts() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let student = store.add_user(UserRole::Student);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();
        let created_at = store.invite(invite.id).created_at;

        for days in [8, 9, 100] {
            let now = created_at + Duration::days(days);
            let outcome =
                InviteService::redeem_at(&store, &invite.code, student, DEFAULT_TTL_DAYS, now)
                    .await
                    .unwrap();
            assert_eq!(outcome, RedemptionOutcome::Expired);
            assert!(!store.invite(invite.id).used);
        }
    }

    #[tokio::test]
    async fn unknown_student_is_reported_as_missing() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();

        let outcome = InviteService::redeem(&store, &invite.code, Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(outcome, RedemptionOutcome::StudentNotFound);
        assert!(!store.invite(invite.id).used);
    }

    #[tokio::test]
    async fn non_student_roles_are_conflated_with_invalid_code() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();

        for role in [UserRole::Teacher, UserRole::SchoolAdmin, UserRole::Parent] {
            let redeemer = store.add_user(role);
            let outcome = InviteService::redeem(&store, &invite.code, redeemer)
                .await
                .unwrap();
            assert_eq!(outcome, RedemptionOutcome::InvalidCode);
        }
        assert!(!store.invite(invite.id).used);
    }

    #[tokio::test]
    async fn already_linked_student_leaves_code_redeemable_by_others() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let first = store.add_user(UserRole::Student);
        let second = store.add_user(UserRole::Student);
        let generator = CodeGenerator::new();

        // First link via a first code.
        let first_invite = InviteService::issue(&store, &generator, teacher).await.unwrap();
        let outcome = InviteService::redeem(&store, &first_invite.code, first)
            .await
            .unwrap();
        assert_eq!(outcome, RedemptionOutcome::Success);

        // The already-linked student redeems a second code: rejected without
        // consuming it, and no duplicate link row appears.
        let second_invite = InviteService::issue(&store, &generator, teacher).await.unwrap();
        let outcome = InviteService::redeem(&store, &second_invite.code, first)
            .await
            .unwrap();
        assert_eq!(outcome, RedemptionOutcome::AlreadyLinked);
        assert!(!store.invite(second_invite.id).used);
        assert_eq!(store.link_count(teacher, first), 1);

        // A different eligible student can still use it.
        let outcome = InviteService::redeem(&store, &second_invite.code, second)
            .await
            .unwrap();
        assert_eq!(outcome, RedemptionOutcome::Success);
        assert!(store.invite(second_invite.id).used);
    }

    #[tokio::test]
    async fn duplicate_relation_race_is_reported_as_invalid_code() {
        let store = RacyStore {
            inner: MemoryInviteStore::new(),
        };
        let teacher = store.inner.add_user(UserRole::Teacher);
        let student = store.inner.add_user(UserRole::Student);
        let generator = CodeGenerator::new();

        // Establish the link, then redeem a second code with a store that
        // pretends the relation check misses: the transaction's duplicate
        // guard has to catch it.
        let first = InviteService::issue(&store, &generator, teacher).await.unwrap();
        assert_eq!(
            InviteService::redeem(&store, &first.code, student)
                .await
                .unwrap(),
            RedemptionOutcome::Success
        );

        let second = InviteService::issue(&store, &generator, teacher).await.unwrap();
        let outcome = InviteService::redeem(&store, &second.code, student)
            .await
            .unwrap();

        assert_eq!(outcome, RedemptionOutcome::InvalidCode);
        assert_eq!(store.inner.link_count(teacher, student), 1);
        // The failed transaction rolled back: the second code is untouched.
        assert!(!store.inner.invite(second.id).used);
    }

    #[tokio::test]
    async fn consumed_invite_rejects_further_link_attempts() {
        let store = MemoryInviteStore::new();
        let teacher = store.add_user(UserRole::Teacher);
        let student = store.add_user(UserRole::Student);
        let winner = store.add_user(UserRole::Student);

        let invite = InviteService::issue(&store, &CodeGenerator::new(), teacher)
            .await
            .unwrap();

        // Another redemption commits between our unused-lookup and the
        // transaction.
        store
            .link_and_mark_used(invite.id, teacher, winner)
            .await
            .unwrap();

        let racing = store
            .link_and_mark_used(invite.id, teacher, student)
            .await
            .unwrap_err();
        assert!(matches!(racing, StoreError::InviteConsumed));
    }
}
