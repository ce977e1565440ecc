// Database queries for users

use crate::db::schema::UserRecord;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn insert(pool: &SqlitePool, user: &UserRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, name, role, password_hash, avatar, status, created_at, last_login)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.role)
    .bind(&user.password_hash)
    .bind(&user.avatar)
    .bind(&user.status)
    .bind(user.created_at)
    .bind(user.last_login)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<UserRecord>> {
    let users = sqlx::query_as::<_, UserRecord>(
        "SELECT * FROM users ORDER BY last_login DESC, created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn update_last_login(
    pool: &SqlitePool,
    id: &str,
    timestamp: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(timestamp)
        .bind(id)
        .execute(pool)
        .await?;

    tracing::debug!("Updated last login for user {}", id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;

    fn sample_user(username: &str, role: &str) -> UserRecord {
        UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: format!("{}@contentgen.local", username),
            name: username.to_string(),
            role: role.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            avatar: None,
            status: "active".to_string(),
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let pool = test_pool().await;
        let user = sample_user("alice", "manager");

        insert(&pool, &user).await.unwrap();

        let by_id = get_by_id(&pool, &user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        let by_name = get_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        assert!(get_by_username(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = test_pool().await;
        let user = sample_user("bob", "redacteur");
        insert(&pool, &user).await.unwrap();

        let mut dup = sample_user("bob", "redacteur");
        dup.email = "other@contentgen.local".to_string();
        assert!(insert(&pool, &dup).await.is_err());
    }
}
