use classlink::utils::password::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

/// Pool against `TEST_DATABASE_URL`, with migrations applied.
/// Returns None (so the caller can skip) when the variable is unset.
pub async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        }
    };

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    Some(pool)
}

pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.example", Uuid::new_v4())
}

pub async fn create_test_user(pool: &PgPool, role: &str, school_id: Option<Uuid>) -> Uuid {
    let hashed = hash_password("test-password").unwrap();

    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (full_name, email, password, role, school_id, is_verified)
         VALUES ($1, $2, $3, $4, $5, TRUE)
         RETURNING id",
    )
    .bind(format!("Test {role}"))
    .bind(unique_email(role))
    .bind(hashed)
    .bind(role)
    .bind(school_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_school(pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO schools (name, code)
         VALUES ($1, $2)
         RETURNING id",
    )
    .bind(format!("Test School {}", Uuid::new_v4()))
    .bind(Uuid::new_v4().to_string()[..8].to_uppercase())
    .fetch_one(pool)
    .await
    .unwrap()
}
