use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("Failed to create database pool");

    // Run pending migrations on startup
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");

    pool
}

#[cfg(test)]
pub mod testing {
    use super::MIGRATIONS;
    use crate::models::{NewRecipe, NewUser};
    use crate::schema::{recipes, users};
    use diesel::prelude::*;
    use diesel_migrations::MigrationHarness;
    use uuid::Uuid;

    /// Connection to the database named by DATABASE_URL, migrated and wrapped
    /// in a transaction that is never committed. Tests that need a live
    /// database call this and return early when it yields None, so the suite
    /// still passes in environments without Postgres.
    pub fn test_conn() -> Option<PgConnection> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let mut conn = PgConnection::establish(&url).ok()?;
        conn.run_pending_migrations(MIGRATIONS).ok()?;
        conn.begin_test_transaction().ok()?;
        Some(conn)
    }

    /// Insert a user with a unique username. The prefix keeps failures
    /// attributable to the test that created the row.
    pub fn insert_user(conn: &mut PgConnection, prefix: &str) -> Uuid {
        let username = format!("{}_{}", prefix, Uuid::new_v4().simple());
        diesel::insert_into(users::table)
            .values(&NewUser {
                username: &username,
                display_name: &username,
                password_hash: "x",
            })
            .returning(users::id)
            .get_result(conn)
            .expect("insert test user")
    }

    pub fn insert_recipe(conn: &mut PgConnection, user_id: Uuid, status: &str) -> Uuid {
        let ingredients = vec![Some("rice".to_string())];
        let steps = vec![Some("cook it".to_string())];
        diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                user_id,
                title: "Plain rice",
                ingredients: &ingredients,
                steps: &steps,
                preparation_minutes: 20,
                meal_type: None,
                calories: None,
                protein: None,
                carbs: None,
                fat: None,
                photo_id: None,
                status,
            })
            .returning(recipes::id)
            .get_result(conn)
            .expect("insert test recipe")
    }
}

/// Get a pooled connection inside a handler, or bail out with a 500 response.
#[macro_export]
macro_rules! get_conn {
    ($pool:expr) => {
        match $pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Database connection failed: {}", e);
                return (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json($crate::api::ErrorResponse {
                        error: "Database connection failed".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    };
}
