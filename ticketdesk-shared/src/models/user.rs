/// User model and database operations
///
/// Users open tickets. A user owns every ticket created on its behalf and
/// deleting the user deletes those tickets.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     user_id SERIAL PRIMARY KEY,
///     user_name TEXT NOT NULL UNIQUE,
///     age INTEGER NOT NULL,
///     pronouns TEXT NOT NULL,
///     country TEXT NOT NULL,
///     email TEXT NOT NULL,
///     is_active BOOLEAN NOT NULL,
///     social_links TEXT
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use ticketdesk_shared::models::user::{CreateUser, Pronouns, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let mut conn = pool.acquire().await?;
///
/// let user = User::create(&mut conn, CreateUser {
///     user_name: "johndoe".to_string(),
///     age: 30,
///     pronouns: Pronouns::He,
///     country: "USA".to_string(),
///     email: "john.doe@example.com".to_string(),
///     is_active: true,
///     social_links: None,
/// }).await?;
///
/// let found = User::find_by_user_name(&mut conn, "johndoe").await?;
/// assert_eq!(found.map(|u| u.user_id), Some(user.user_id));
/// # Ok(())
/// # }
/// ```

use super::ParseEnumError;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use std::{fmt, str::FromStr};

/// Pronoun category shown on a user profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pronouns {
    #[default]
    Unspecified,
    He,
    She,
    They,
}

impl Pronouns {
    /// Returns the stored text form
    pub fn as_str(&self) -> &'static str {
        match self {
            Pronouns::Unspecified => "Unspecified",
            Pronouns::He => "He",
            Pronouns::She => "She",
            Pronouns::They => "They",
        }
    }
}

impl fmt::Display for Pronouns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pronouns {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unspecified" => Ok(Pronouns::Unspecified),
            "He" => Ok(Pronouns::He),
            "She" => Ok(Pronouns::She),
            "They" => Ok(Pronouns::They),
            other => Err(ParseEnumError::new("pronouns", other)),
        }
    }
}

impl TryFrom<String> for Pronouns {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// User model representing a ticket owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Database-assigned identifier
    pub user_id: i32,

    /// Login name, unique across users
    pub user_name: String,

    pub age: i32,

    #[sqlx(try_from = "String")]
    pub pronouns: Pronouns,

    pub country: String,

    pub email: String,

    /// Inactive users keep their tickets but can be filtered out
    pub is_active: bool,

    /// Free-form social profile links
    pub social_links: Option<String>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_name: String,
    pub age: i32,
    pub pronouns: Pronouns,
    pub country: String,
    pub email: String,
    pub is_active: bool,
    pub social_links: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the user name is already taken or the
    /// database operation fails
    pub async fn create(conn: &mut PgConnection, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_name, age, pronouns, country, email, is_active, social_links)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING user_id, user_name, age, pronouns, country, email, is_active, social_links
            "#,
        )
        .bind(data.user_name)
        .bind(data.age)
        .bind(data.pronouns.as_str())
        .bind(data.country)
        .bind(data.email)
        .bind(data.is_active)
        .bind(data.social_links)
        .fetch_one(conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, user_id: i32) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, age, pronouns, country, email, is_active, social_links
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact user name
    pub async fn find_by_user_name(
        conn: &mut PgConnection,
        user_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, age, pronouns, country, email, is_active, social_links
            FROM users
            WHERE user_name = $1
            "#,
        )
        .bind(user_name)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Locks a user row for the rest of the enclosing transaction
    ///
    /// Used by ticket creation so the owner cannot disappear between the
    /// existence check and the insert.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        user_id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, age, pronouns, country, email, is_active, social_links
            FROM users
            WHERE user_id = $1
            FOR SHARE
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Returns the user with the lowest ID
    pub async fn first(conn: &mut PgConnection) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, age, pronouns, country, email, is_active, social_links
            FROM users
            ORDER BY user_id
            LIMIT 1
            "#,
        )
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Counts all users
    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(conn)
            .await?;

        Ok(count.0)
    }
}
