/// Employee model and database operations
///
/// Employees are support staff. Tickets reference them weakly: deleting an
/// employee clears the assignment instead of deleting tickets.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE employees (
///     employee_id SERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     email TEXT NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Employee model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    /// Database-assigned identifier
    pub employee_id: i32,

    /// Display name
    pub name: String,

    /// Contact email
    pub email: String,
}

/// Input for creating a new employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub name: String,
    pub email: String,
}

impl Employee {
    /// Creates a new employee
    pub async fn create(conn: &mut PgConnection, data: CreateEmployee) -> Result<Self, sqlx::Error> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (name, email)
            VALUES ($1, $2)
            RETURNING employee_id, name, email
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .fetch_one(conn)
        .await?;

        Ok(employee)
    }

    /// Finds an employee by ID
    pub async fn find_by_id(
        conn: &mut PgConnection,
        employee_id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT employee_id, name, email
            FROM employees
            WHERE employee_id = $1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(conn)
        .await?;

        Ok(employee)
    }

    /// Lists every employee ordered by ID
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT employee_id, name, email
            FROM employees
            ORDER BY employee_id
            "#,
        )
        .fetch_all(conn)
        .await?;

        Ok(employees)
    }

    /// Counts all employees
    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
            .fetch_one(conn)
            .await?;

        Ok(count.0)
    }
}
