//! Pet repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use patitas_core::PetStatus;

use super::DbError;

/// Pet record from database
#[derive(Debug, Clone, FromRow)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub status: Option<String>,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    /// Stored status parsed into the enum; unknown/absent becomes `None`.
    pub fn status(&self) -> Option<PetStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Fields for creating or replacing a pet row
#[derive(Debug, Clone)]
pub struct NewPet {
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub status: Option<PetStatus>,
    pub owner_id: Option<i64>,
}

/// Pet repository
pub struct PetRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PetRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewPet) -> Result<Pet, DbError> {
        let pet = sqlx::query_as(
            r#"
            INSERT INTO pets (name, species, breed, color, size, description,
                              birth_date, photo_url, status, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.species)
        .bind(&new.breed)
        .bind(&new.color)
        .bind(&new.size)
        .bind(&new.description)
        .bind(new.birth_date)
        .bind(&new.photo_url)
        .bind(new.status.map(|s| s.as_str()))
        .bind(new.owner_id)
        .fetch_one(self.pool)
        .await?;
        Ok(pet)
    }

    pub async fn get(&self, id: i64) -> Result<Pet, DbError> {
        sqlx::query_as("SELECT * FROM pets WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("pet", id))
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DbError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pets WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn list(&self) -> Result<Vec<Pet>, DbError> {
        let pets = sqlx::query_as("SELECT * FROM pets ORDER BY created_at DESC")
            .fetch_all(self.pool)
            .await?;
        Ok(pets)
    }

    pub async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Pet>, DbError> {
        let pets =
            sqlx::query_as("SELECT * FROM pets WHERE owner_id = $1 ORDER BY created_at DESC")
                .bind(owner_id)
                .fetch_all(self.pool)
                .await?;
        Ok(pets)
    }

    /// Pets still missing: either lost flavor.
    pub async fn list_lost(&self) -> Result<Vec<Pet>, DbError> {
        let pets = sqlx::query_as(
            r#"
            SELECT * FROM pets
            WHERE status IN ($1, $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(PetStatus::LostByOwner.as_str())
        .bind(PetStatus::FoundStray.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(pets)
    }

    /// Replace every editable field of an existing pet.
    ///
    /// The photo is only overwritten when a new one is provided.
    pub async fn update(&self, id: i64, new: NewPet) -> Result<Pet, DbError> {
        sqlx::query_as(
            r#"
            UPDATE pets SET
                name = $2,
                species = $3,
                breed = $4,
                color = $5,
                size = $6,
                description = $7,
                birth_date = $8,
                photo_url = COALESCE($9, photo_url),
                status = COALESCE($10, status),
                owner_id = COALESCE($11, owner_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.species)
        .bind(&new.breed)
        .bind(&new.color)
        .bind(&new.size)
        .bind(&new.description)
        .bind(new.birth_date)
        .bind(&new.photo_url)
        .bind(new.status.map(|s| s.as_str()))
        .bind(new.owner_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("pet", id))
    }

    pub async fn set_status(&self, id: i64, status: PetStatus) -> Result<Pet, DbError> {
        sqlx::query_as("UPDATE pets SET status = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("pet", id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("pet", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pet(name: &str) -> NewPet {
        NewPet {
            name: name.into(),
            species: Some("dog".into()),
            breed: Some("mestizo".into()),
            color: Some("brown".into()),
            size: Some("medium".into()),
            description: Some("friendly, answers to whistles".into()),
            birth_date: None,
            photo_url: None,
            status: Some(PetStatus::LostByOwner),
            owner_id: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_update_delete_round_trip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let repo = PetRepo::new(&pool);
        let created = repo.create(sample_pet("Firulais")).await.unwrap();
        assert_eq!(created.status(), Some(PetStatus::LostByOwner));

        let mut changes = sample_pet("Firulais");
        changes.color = Some("black".into());
        let updated = repo.update(created.id, changes).await.unwrap();
        assert_eq!(updated.color.as_deref(), Some("black"));

        let reunited = repo.set_status(created.id, PetStatus::Reunited).await.unwrap();
        assert_eq!(reunited.status(), Some(PetStatus::Reunited));

        repo.delete(created.id).await.unwrap();
        assert!(matches!(
            repo.get(created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn lost_listing_covers_both_flavors() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let repo = PetRepo::new(&pool);
        let own = repo.create(sample_pet("lost-own")).await.unwrap();
        let mut stray = sample_pet("lost-stray");
        stray.status = Some(PetStatus::FoundStray);
        let stray = repo.create(stray).await.unwrap();

        let lost = repo.list_lost().await.unwrap();
        assert!(lost.iter().any(|p| p.id == own.id));
        assert!(lost.iter().any(|p| p.id == stray.id));

        repo.delete(own.id).await.unwrap();
        repo.delete(stray.id).await.unwrap();
    }
}
