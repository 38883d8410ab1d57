//! Fixtures for database-backed service tests

use shared::{Actor, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn seed_admin(db: &PgPool) -> Actor {
    let email = "camille@bar.test";
    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (email, password_hash, name, role)
        VALUES ($1, 'not-a-hash', 'Camille', 'admin')
        RETURNING id
        "#,
    )
    .bind(email)
    .fetch_one(db)
    .await
    .unwrap();

    Actor {
        user_id,
        email: email.to_string(),
        name: Some("Camille".to_string()),
        role: UserRole::Admin,
    }
}

pub async fn seed_ingredient(db: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO ingredients (name, category) VALUES ($1, 'Spirits') RETURNING id",
    )
    .bind(name)
    .fetch_one(db)
    .await
    .unwrap()
}
