// src/persona/store.rs

use anyhow::Result;
use chrono::{NaiveDateTime, TimeZone, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::persona::types::Persona;

#[derive(Clone)]
pub struct PersonaStore {
    pub pool: SqlitePool,
}

impl PersonaStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: String, system_prompt: String) -> Result<Persona> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO personas (id, name, system_prompt, is_active, created_at, updated_at)
            VALUES (?, ?, ?, TRUE, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&name)
        .bind(&system_prompt)
        .bind(now.naive_utc())
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(Persona {
            id,
            name,
            system_prompt,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<Persona>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, system_prompt, is_active, created_at, updated_at
            FROM personas
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_persona).transpose()
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Persona>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, system_prompt, is_active, created_at, updated_at
            FROM personas
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_persona).transpose()
    }

    /// All personas, newest first.
    pub async fn list(&self) -> Result<Vec<Persona>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, system_prompt, is_active, created_at, updated_at
            FROM personas
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_persona).collect()
    }

    /// Personas eligible for rotation.
    pub async fn list_active(&self) -> Result<Vec<Persona>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, system_prompt, is_active, created_at, updated_at
            FROM personas
            WHERE is_active = TRUE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_persona).collect()
    }

    /// Active personas other than `id`. Used by the deactivation guard:
    /// an update may never leave zero active personas.
    pub async fn count_active_excluding(&self, id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM personas WHERE is_active = TRUE AND id != ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn count_active(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM personas WHERE is_active = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM personas")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn set_active(&self, id: &str, is_active: bool) -> Result<Option<Persona>> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE personas SET is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(is_active)
        .bind(now.naive_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Update name and/or prompt; untouched fields keep their values.
    pub async fn update_fields(
        &self,
        id: &str,
        name: Option<String>,
        system_prompt: Option<String>,
    ) -> Result<Option<Persona>> {
        let Some(mut persona) = self.get(id).await? else {
            return Ok(None);
        };

        if let Some(n) = name {
            persona.name = n;
        }
        if let Some(p) = system_prompt {
            persona.system_prompt = p;
        }
        persona.updated_at = Utc::now();

        sqlx::query(
            "UPDATE personas SET name = ?, system_prompt = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&persona.name)
        .bind(&persona.system_prompt)
        .bind(persona.updated_at.naive_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(persona))
    }
}

fn row_to_persona(row: sqlx::sqlite::SqliteRow) -> Result<Persona> {
    let created_at: NaiveDateTime = row.get("created_at");
    let updated_at: NaiveDateTime = row.get("updated_at");

    Ok(Persona {
        id: row.get("id"),
        name: row.get("name"),
        system_prompt: row.get("system_prompt"),
        is_active: row.get("is_active"),
        created_at: Utc.from_utc_datetime(&created_at),
        updated_at: Utc.from_utc_datetime(&updated_at),
    })
}
