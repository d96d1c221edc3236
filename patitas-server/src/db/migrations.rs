//! Schema migrations, run at startup.
//!
//! Idempotent CREATE TABLE / CREATE INDEX statements plus badge seed data.

use sqlx::PgPool;

/// Badge seed: (name, description, points threshold)
pub const BADGES: &[(&str, &str, i32)] = &[
    ("first-report", "Reported a first sighting", 10),
    ("neighborhood-watch", "Reported sightings around the neighborhood", 50),
    ("guardian", "A pillar of the lost & found community", 100),
];

/// Run all migrations.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            phone TEXT NOT NULL,
            neighborhood TEXT NOT NULL,
            city TEXT NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            points INTEGER NOT NULL DEFAULT 0,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS badges (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            threshold INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_badges (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            badge_id BIGINT NOT NULL REFERENCES badges(id) ON DELETE CASCADE,
            awarded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, badge_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pets (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            species TEXT,
            breed TEXT,
            color TEXT,
            size TEXT,
            description TEXT,
            birth_date DATE,
            photo_url TEXT,
            status TEXT,
            owner_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS postings (
            id BIGSERIAL PRIMARY KEY,
            date DATE NOT NULL DEFAULT CURRENT_DATE,
            close_date DATE,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            pet_id BIGINT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            lat DOUBLE PRECISION,
            lng DOUBLE PRECISION,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            id BIGSERIAL PRIMARY KEY,
            lat DOUBLE PRECISION NOT NULL,
            lng DOUBLE PRECISION NOT NULL,
            neighborhood TEXT,
            address TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sightings (
            id BIGSERIAL PRIMARY KEY,
            date DATE NOT NULL DEFAULT CURRENT_DATE,
            comment TEXT,
            pet_id BIGINT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
            reporter_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            location_id BIGINT REFERENCES locations(id) ON DELETE SET NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;
    seed_badges(pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_points ON users(points DESC)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pets_owner ON pets(owner_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pets_status ON pets(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_postings_pet ON postings(pet_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_postings_user ON postings(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_postings_status ON postings(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sightings_pet ON sightings(pet_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sightings_reporter ON sightings(reporter_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sightings_date ON sightings(date)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn seed_badges(pool: &PgPool) -> Result<(), sqlx::Error> {
    for (name, description, threshold) in BADGES {
        sqlx::query(
            r#"
            INSERT INTO badges (name, description, threshold)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(threshold)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_thresholds_ascend() {
        let mut prev = 0;
        for (_, _, threshold) in BADGES {
            assert!(*threshold > prev);
            prev = *threshold;
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();
    }
}
