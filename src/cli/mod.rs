//! Commands for the `classlink-cli` binary.

use sqlx::PgPool;

use crate::modules::users::model::UserRole;
use crate::utils::password::hash_password;

/// Creates a superadmin account. Superadmins have no school scope and can
/// only be created here, never through the API.
pub async fn create_superadmin(
    db: &PgPool,
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let hashed_password = hash_password(password)
        .map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let result = sqlx::query(
        "INSERT INTO users (full_name, email, password, role, school_id, is_verified)
         VALUES ($1, $2, $3, $4, NULL, TRUE)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(full_name)
    .bind(email)
    .bind(hashed_password)
    .bind(UserRole::Superadmin.as_str())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err("User with this email already exists".into());
    }

    Ok(())
}

/// Seeds a demo school with one teacher and one student account.
/// Safe to run repeatedly.
pub async fn seed_demo(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    sqlx::query(
        "INSERT INTO schools (name, code)
         VALUES ($1, $2)
         ON CONFLICT (code) DO NOTHING",
    )
    .bind("ClassLink Demo School")
    .bind("DEMO125")
    .execute(db)
    .await?;

    let school_id = sqlx::query_scalar::<_, uuid::Uuid>("SELECT id FROM schools WHERE code = $1")
        .bind("DEMO125")
        .fetch_one(db)
        .await?;

    let hashed_password =
        hash_password("1234").map_err(|e| format!("Failed to hash password: {}", e.error))?;

    for (full_name, email, role) in [
        ("Demo Teacher", "teacher@example.com", UserRole::Teacher),
        ("Demo Student", "student@example.com", UserRole::Student),
    ] {
        sqlx::query(
            "INSERT INTO users (full_name, email, password, role, school_id, is_verified)
             VALUES ($1, $2, $3, $4, $5, TRUE)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(full_name)
        .bind(email)
        .bind(&hashed_password)
        .bind(role.as_str())
        .bind(school_id)
        .execute(db)
        .await?;
    }

    Ok(())
}
