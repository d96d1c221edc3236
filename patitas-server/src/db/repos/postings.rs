//! Posting repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use patitas_core::PostingStatus;

use super::DbError;

/// Posting record from database
#[derive(Debug, Clone, FromRow)]
pub struct Posting {
    pub id: i64,
    pub date: NaiveDate,
    pub close_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: String,
    pub pet_id: i64,
    pub user_id: i64,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Posting {
    /// Stored status parsed into the enum; unknown text falls back to active.
    pub fn status(&self) -> PostingStatus {
        self.status.parse().unwrap_or(PostingStatus::Active)
    }
}

/// Fields for creating or replacing a posting
#[derive(Debug, Clone)]
pub struct NewPosting {
    /// Publication date; `None` means today
    pub date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// `None` means `active`
    pub status: Option<PostingStatus>,
    pub pet_id: i64,
    pub user_id: i64,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Posting repository
pub struct PostingRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostingRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewPosting) -> Result<Posting, DbError> {
        let posting = sqlx::query_as(
            r#"
            INSERT INTO postings (date, close_date, description, status, pet_id, user_id, lat, lng)
            VALUES (COALESCE($1, CURRENT_DATE), $2, $3, COALESCE($4, 'active'), $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.date)
        .bind(new.close_date)
        .bind(&new.description)
        .bind(new.status.map(|s| s.as_str()))
        .bind(new.pet_id)
        .bind(new.user_id)
        .bind(new.lat)
        .bind(new.lng)
        .fetch_one(self.pool)
        .await?;
        Ok(posting)
    }

    pub async fn get(&self, id: i64) -> Result<Posting, DbError> {
        sqlx::query_as("SELECT * FROM postings WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("posting", id))
    }

    /// List postings, newest publication first, optionally filtered by status.
    pub async fn list(&self, status: Option<PostingStatus>) -> Result<Vec<Posting>, DbError> {
        let postings = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT * FROM postings WHERE status = $1 ORDER BY date DESC, id DESC",
                )
                .bind(status.as_str())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM postings ORDER BY date DESC, id DESC")
                    .fetch_all(self.pool)
                    .await?
            }
        };
        Ok(postings)
    }

    /// Replace an existing posting's fields.
    pub async fn update(&self, id: i64, new: NewPosting) -> Result<Posting, DbError> {
        sqlx::query_as(
            r#"
            UPDATE postings SET
                date = COALESCE($2, date),
                close_date = $3,
                description = $4,
                status = COALESCE($5, status),
                pet_id = $6,
                user_id = $7,
                lat = $8,
                lng = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new.date)
        .bind(new.close_date)
        .bind(&new.description)
        .bind(new.status.map(|s| s.as_str()))
        .bind(new.pet_id)
        .bind(new.user_id)
        .bind(new.lat)
        .bind(new.lng)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("posting", id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM postings WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("posting", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_defaults_to_active_today() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let users = crate::db::UserRepo::new(&pool);
        let pets = crate::db::PetRepo::new(&pool);
        let user = users
            .create(crate::db::NewUser {
                first_name: "Pau".into(),
                last_name: "Gomez".into(),
                email: format!("posting-{}@example.com", std::process::id()),
                password_hash: "$2b$12$fakefakefakefakefakefake".into(),
                phone: "+54 221 555 1111".into(),
                neighborhood: "Norte".into(),
                city: "La Plata".into(),
            })
            .await
            .unwrap();
        let pet = pets
            .create(crate::db::NewPet {
                name: "Manchas".into(),
                species: Some("cat".into()),
                breed: None,
                color: None,
                size: None,
                description: None,
                birth_date: None,
                photo_url: None,
                status: Some(patitas_core::PetStatus::LostByOwner),
                owner_id: Some(user.id),
            })
            .await
            .unwrap();

        let repo = PostingRepo::new(&pool);
        let posting = repo
            .create(NewPosting {
                date: None,
                close_date: None,
                description: Some("last seen near the square".into()),
                status: None,
                pet_id: pet.id,
                user_id: user.id,
                lat: Some(-34.92),
                lng: Some(-57.95),
            })
            .await
            .unwrap();

        assert_eq!(posting.status(), PostingStatus::Active);
        assert_eq!(posting.date, Utc::now().date_naive());

        let active = repo.list(Some(PostingStatus::Active)).await.unwrap();
        assert!(active.iter().any(|p| p.id == posting.id));

        users.delete(user.id).await.unwrap();
        pets.delete(pet.id).await.ok();
    }
}
