// src/settings/store.rs

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::{Row, SqlitePool};

use crate::settings::{Settings, SettingsUpdate, SETTINGS_ROW_ID};

#[derive(Clone)]
pub struct SettingsStore {
    pub pool: SqlitePool,
}

impl SettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<Option<Settings>> {
        let row = sqlx::query(
            r#"
            SELECT id, temperature, max_tokens, rotation_interval, model_name,
                   selected_persona_id, last_rotation
            FROM settings
            WHERE id = ?
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_settings).transpose()
    }

    /// Read the singleton row, inserting the defaults on first access.
    pub async fn get_or_create(&self) -> Result<Settings> {
        if let Some(settings) = self.get().await? {
            return Ok(settings);
        }

        let defaults = Settings::default_row();
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO settings
                (id, temperature, max_tokens, rotation_interval, model_name,
                 selected_persona_id, last_rotation)
            VALUES (?, ?, ?, ?, ?, NULL, NULL)
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(defaults.temperature)
        .bind(defaults.max_tokens)
        .bind(defaults.rotation_interval)
        .bind(&defaults.model_name)
        .execute(&self.pool)
        .await?;

        // Re-read: a concurrent creator may have won the INSERT OR IGNORE.
        self.get()
            .await?
            .ok_or_else(|| anyhow::anyhow!("settings row missing after insert"))
    }

    pub async fn upsert(&self, update: SettingsUpdate) -> Result<Settings> {
        sqlx::query(
            r#"
            INSERT INTO settings
                (id, temperature, max_tokens, rotation_interval, model_name, selected_persona_id)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                temperature = excluded.temperature,
                max_tokens = excluded.max_tokens,
                rotation_interval = excluded.rotation_interval,
                model_name = excluded.model_name,
                selected_persona_id = excluded.selected_persona_id
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(update.temperature)
        .bind(update.max_tokens)
        .bind(update.rotation_interval)
        .bind(&update.model_name)
        .bind(&update.selected_persona_id)
        .execute(&self.pool)
        .await?;

        self.get()
            .await?
            .ok_or_else(|| anyhow::anyhow!("settings row missing after upsert"))
    }

    /// Select a persona without touching the rotation clock. Used when the
    /// chat handler picks an initial persona before any rotation happened.
    pub async fn set_selected_persona(&self, persona_id: &str) -> Result<()> {
        sqlx::query("UPDATE settings SET selected_persona_id = ? WHERE id = ?")
            .bind(persona_id)
            .bind(SETTINGS_ROW_ID)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// One rotation event: new persona and timestamp in a single write, so
    /// concurrent ticks degrade to last-write-wins on the whole pair.
    pub async fn apply_rotation(&self, persona_id: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE settings SET selected_persona_id = ?, last_rotation = ? WHERE id = ?",
        )
        .bind(persona_id)
        .bind(at.naive_utc())
        .bind(SETTINGS_ROW_ID)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Change the interval and restart the schedule's clock.
    pub async fn set_rotation_interval(&self, minutes: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE settings SET rotation_interval = ?, last_rotation = ? WHERE id = ?",
        )
        .bind(minutes)
        .bind(at.naive_utc())
        .bind(SETTINGS_ROW_ID)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_settings(row: sqlx::sqlite::SqliteRow) -> Result<Settings> {
    let last_rotation = row
        .get::<Option<NaiveDateTime>, _>("last_rotation")
        .map(|naive| Utc.from_utc_datetime(&naive));

    Ok(Settings {
        id: row.get("id"),
        temperature: row.get("temperature"),
        max_tokens: row.get("max_tokens"),
        rotation_interval: row.get("rotation_interval"),
        model_name: row.get("model_name"),
        selected_persona_id: row.get("selected_persona_id"),
        last_rotation,
    })
}
