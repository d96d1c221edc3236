//! Sighting repository
//!
//! Sighting creation is the one multi-step write in the system: optional
//! location insert, the sighting row itself, and the reporter's points/badge
//! award all commit in a single transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::db::migrations::BADGES;

use super::DbError;

/// Points a reporter earns per logged sighting
pub const POINTS_PER_SIGHTING: i32 = 10;

/// Location attached to a sighting
#[derive(Debug, Clone)]
pub struct Location {
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
}

/// Sighting record with its location joined in
#[derive(Debug, Clone)]
pub struct Sighting {
    pub id: i64,
    pub date: NaiveDate,
    pub comment: Option<String>,
    pub pet_id: i64,
    pub reporter_id: i64,
    pub location: Option<Location>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new location row
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub lat: f64,
    pub lng: f64,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
}

/// Fields for a new sighting
#[derive(Debug, Clone)]
pub struct NewSighting {
    /// Sighting date; `None` means today
    pub date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub pet_id: i64,
    pub reporter_id: i64,
    pub location: Option<NewLocation>,
}

const SELECT_WITH_LOCATION: &str = r#"
    SELECT
        s.id, s.date, s.comment, s.pet_id, s.reporter_id, s.created_at,
        l.id as location_id, l.lat, l.lng, l.neighborhood, l.address
    FROM sightings s
    LEFT JOIN locations l ON l.id = s.location_id
"#;

fn row_to_sighting(row: &sqlx::postgres::PgRow) -> Sighting {
    let location = row
        .get::<Option<i64>, _>("location_id")
        .map(|id| Location {
            id,
            lat: row.get("lat"),
            lng: row.get("lng"),
            neighborhood: row.get("neighborhood"),
            address: row.get("address"),
        });

    Sighting {
        id: row.get("id"),
        date: row.get("date"),
        comment: row.get("comment"),
        pet_id: row.get("pet_id"),
        reporter_id: row.get("reporter_id"),
        location,
        created_at: row.get("created_at"),
    }
}

/// Sighting repository
pub struct SightingRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SightingRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a sighting: location insert, sighting row, and the reporter's
    /// points/badge award in one transaction.
    pub async fn create(&self, new: NewSighting) -> Result<Sighting, DbError> {
        // Verify referenced rows up front for precise errors
        let (pet_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pets WHERE id = $1)")
                .bind(new.pet_id)
                .fetch_one(self.pool)
                .await?;
        if !pet_exists {
            return Err(DbError::not_found("pet", new.pet_id));
        }

        let (reporter_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(new.reporter_id)
                .fetch_one(self.pool)
                .await?;
        if !reporter_exists {
            return Err(DbError::not_found("user", new.reporter_id));
        }

        let mut tx = self.pool.begin().await?;

        let location = match &new.location {
            Some(loc) => {
                let (id,): (i64,) = sqlx::query_as(
                    r#"
                    INSERT INTO locations (lat, lng, neighborhood, address)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(loc.lat)
                .bind(loc.lng)
                .bind(&loc.neighborhood)
                .bind(&loc.address)
                .fetch_one(&mut *tx)
                .await?;

                Some(Location {
                    id,
                    lat: loc.lat,
                    lng: loc.lng,
                    neighborhood: loc.neighborhood.clone(),
                    address: loc.address.clone(),
                })
            }
            None => None,
        };

        let row = sqlx::query(
            r#"
            INSERT INTO sightings (date, comment, pet_id, reporter_id, location_id)
            VALUES (COALESCE($1, CURRENT_DATE), $2, $3, $4, $5)
            RETURNING id, date, comment, pet_id, reporter_id, created_at
            "#,
        )
        .bind(new.date)
        .bind(&new.comment)
        .bind(new.pet_id)
        .bind(new.reporter_id)
        .bind(location.as_ref().map(|l| l.id))
        .fetch_one(&mut *tx)
        .await?;

        award_points(&mut tx, new.reporter_id, POINTS_PER_SIGHTING).await?;

        tx.commit().await?;

        Ok(Sighting {
            id: row.get("id"),
            date: row.get("date"),
            comment: row.get("comment"),
            pet_id: row.get("pet_id"),
            reporter_id: row.get("reporter_id"),
            location,
            created_at: row.get("created_at"),
        })
    }

    pub async fn get(&self, id: i64) -> Result<Sighting, DbError> {
        let query = format!("{} WHERE s.id = $1", SELECT_WITH_LOCATION);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("sighting", id))?;
        Ok(row_to_sighting(&row))
    }

    pub async fn list(&self) -> Result<Vec<Sighting>, DbError> {
        let query = format!("{} ORDER BY s.date DESC, s.id DESC", SELECT_WITH_LOCATION);
        let rows = sqlx::query(&query).fetch_all(self.pool).await?;
        Ok(rows.iter().map(row_to_sighting).collect())
    }

    pub async fn list_for_pet(&self, pet_id: i64) -> Result<Vec<Sighting>, DbError> {
        let query = format!(
            "{} WHERE s.pet_id = $1 ORDER BY s.date DESC, s.id DESC",
            SELECT_WITH_LOCATION
        );
        let rows = sqlx::query(&query)
            .bind(pet_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.iter().map(row_to_sighting).collect())
    }

    pub async fn list_for_reporter(&self, reporter_id: i64) -> Result<Vec<Sighting>, DbError> {
        let query = format!(
            "{} WHERE s.reporter_id = $1 ORDER BY s.date DESC, s.id DESC",
            SELECT_WITH_LOCATION
        );
        let rows = sqlx::query(&query)
            .bind(reporter_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.iter().map(row_to_sighting).collect())
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM sightings WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("sighting", id));
        }
        Ok(())
    }
}

/// Add points to a user and grant any badge whose threshold is now met.
///
/// Badge grants use ON CONFLICT DO NOTHING, so re-crossing a threshold is a
/// no-op.
async fn award_points(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    delta: i32,
) -> Result<(), DbError> {
    let (points,): (i32,) = sqlx::query_as(
        "UPDATE users SET points = points + $2 WHERE id = $1 RETURNING points",
    )
    .bind(user_id)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await?;

    for (name, _, threshold) in BADGES {
        if points >= *threshold {
            sqlx::query(
                r#"
                INSERT INTO user_badges (user_id, badge_id)
                SELECT $1, id FROM badges WHERE name = $2
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(name)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewPet, NewUser, PetRepo, UserRepo};

    async fn fixture(pool: &PgPool) -> (i64, i64) {
        let user = UserRepo::new(pool)
            .create(NewUser {
                first_name: "Vale".into(),
                last_name: "Ruiz".into(),
                email: format!("sighting-{}@example.com", std::process::id()),
                password_hash: "$2b$12$fakefakefakefakefakefake".into(),
                phone: "+54 221 555 2222".into(),
                neighborhood: "Sur".into(),
                city: "La Plata".into(),
            })
            .await
            .unwrap();
        let pet = PetRepo::new(pool)
            .create(NewPet {
                name: "Rocco".into(),
                species: Some("dog".into()),
                breed: None,
                color: None,
                size: None,
                description: None,
                birth_date: None,
                photo_url: None,
                status: Some(patitas_core::PetStatus::LostByOwner),
                owner_id: None,
            })
            .await
            .unwrap();
        (user.id, pet.id)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_awards_points_and_first_badge() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let (user_id, pet_id) = fixture(&pool).await;
        let repo = SightingRepo::new(&pool);

        let sighting = repo
            .create(NewSighting {
                date: None,
                comment: Some("spotted by the tracks".into()),
                pet_id,
                reporter_id: user_id,
                location: Some(NewLocation {
                    lat: -34.92,
                    lng: -57.95,
                    neighborhood: Some("Tolosa".into()),
                    address: None,
                }),
            })
            .await
            .unwrap();

        assert!(sighting.location.is_some());

        let users = UserRepo::new(&pool);
        let reporter = users.get(user_id).await.unwrap();
        assert_eq!(reporter.points, POINTS_PER_SIGHTING);

        // 10 points crosses the first threshold
        let badges = users.badges(user_id).await.unwrap();
        assert!(badges.iter().any(|b| b.name == "first-report"));

        users.delete(user_id).await.unwrap();
        PetRepo::new(&pool).delete(pet_id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_rejects_unknown_pet() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let repo = SightingRepo::new(&pool);
        let result = repo
            .create(NewSighting {
                date: None,
                comment: None,
                pet_id: i64::MAX,
                reporter_id: 1,
                location: None,
            })
            .await;
        assert!(matches!(result, Err(DbError::NotFound { resource: "pet", .. })));
    }
}
