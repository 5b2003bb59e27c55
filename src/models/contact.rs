//! Contact message model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Contact form; the phone field is submitted as `number`
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContact {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[serde(rename = "number")]
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: i64,
    pub received: bool,
}

impl Contact {
    pub async fn create(pool: &SqlitePool, data: CreateContact) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (name, subject, email, phone, message)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#
        )
        .bind(&data.name)
        .bind(&data.subject)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.message)
        .fetch_one(pool)
        .await
    }
}
