//! User repository
//!
//! Account rows plus the badge join table. Email uniqueness is enforced by
//! the DB constraint; the pre-checks in the handlers only exist to produce
//! friendlier errors, the constraint is the backstop.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{is_unique_violation, DbError};

/// User record from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub neighborhood: String,
    pub city: String,
    pub active: bool,
    pub points: i32,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Badge record from database
#[derive(Debug, Clone, FromRow)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub threshold: i32,
}

/// Fields for a new user row (password already hashed)
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub neighborhood: String,
    pub city: String,
}

/// Profile fields that can change on update; `None` leaves the column alone
#[derive(Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. Duplicate email maps to `DbError::Conflict`.
    pub async fn create(&self, new: NewUser) -> Result<User, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, phone, neighborhood, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.phone)
        .bind(&new.neighborhood)
        .bind(&new.city)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict("email is already registered".into())
            } else {
                e.into()
            }
        })
    }

    /// Fetch a user by id.
    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Look up a user by email (exact match on the stored form).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Whether another user already owns this email.
    pub async fn email_taken_by_other(&self, email: &str, user_id: i64) -> Result<bool, DbError> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DbError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// List all users, newest first.
    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(self.pool)
            .await?;
        Ok(users)
    }

    /// Users ordered by points, highest first.
    pub async fn ranking(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY points DESC, id ASC")
            .fetch_all(self.pool)
            .await?;
        Ok(users)
    }

    /// Apply profile changes; absent fields keep their current value.
    pub async fn update(&self, id: i64, changes: UserChanges) -> Result<User, DbError> {
        sqlx::query_as(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash),
                phone = COALESCE($6, phone),
                neighborhood = COALESCE($7, neighborhood),
                city = COALESCE($8, city),
                active = COALESCE($9, active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.phone)
        .bind(&changes.neighborhood)
        .bind(&changes.city)
        .bind(changes.active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict("email is already registered by another user".into())
            } else {
                DbError::from(e)
            }
        })?
        .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Replace the stored password hash.
    pub async fn set_password(&self, id: i64, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        Ok(())
    }

    /// Delete a user. Owned pets are detached; postings and sightings cascade.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        Ok(())
    }

    /// Badges earned by a user, in award order.
    pub async fn badges(&self, user_id: i64) -> Result<Vec<Badge>, DbError> {
        let badges = sqlx::query_as(
            r#"
            SELECT b.id, b.name, b.description, b.threshold
            FROM badges b
            JOIN user_badges ub ON ub.badge_id = b.id
            WHERE ub.user_id = $1
            ORDER BY ub.awarded_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(badges)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests - run with DATABASE_URL set:
    // cargo test -p patitas-server -- --ignored

    use super::*;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ana".into(),
            last_name: "Suarez".into(),
            email: email.into(),
            password_hash: "$2b$12$fakefakefakefakefakefake".into(),
            phone: "+54 221 555 0000".into(),
            neighborhood: "Centro".into(),
            city: "La Plata".into(),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_get_round_trip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let repo = UserRepo::new(&pool);
        let email = format!("roundtrip-{}@example.com", std::process::id());
        let created = repo.create(sample_user(&email)).await.unwrap();
        assert!(created.active);
        assert_eq!(created.points, 0);
        assert_eq!(created.role, "user");

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched.email, created.email);
        assert_eq!(fetched.first_name, "Ana");

        repo.delete(created.id).await.unwrap();
        assert!(matches!(
            repo.get(created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_email_conflicts() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let repo = UserRepo::new(&pool);
        let email = format!("dup-{}@example.com", std::process::id());
        let first = repo.create(sample_user(&email)).await.unwrap();
        let second = repo.create(sample_user(&email)).await;
        assert!(matches!(second, Err(DbError::Conflict(_))));

        repo.delete(first.id).await.unwrap();
    }
}
