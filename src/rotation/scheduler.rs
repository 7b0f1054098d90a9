// src/rotation/scheduler.rs
//! Persona rotation scheduler (SQLite-backed).
//!
//! One pass reads the settings row, decides via [`RotationCurve`] whether a
//! swap is due, and if so picks a random active persona other than the
//! current one and writes the new selection plus rotation timestamp back.
//! The settings row is the only rotation state; there is no in-memory clock,
//! so the periodic timer and the inline check in the chat flow can share
//! `tick` without coordinating.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::persona::{Persona, PersonaRef, PersonaStore};
use crate::rotation::policy::RotationCurve;
use crate::settings::{Settings, SettingsStore};

/// A completed persona swap.
#[derive(Debug, Clone)]
pub struct RotationEvent {
    pub previous: Option<PersonaRef>,
    pub current: PersonaRef,
    pub rotated_at: DateTime<Utc>,
}

/// Snapshot for the rotation status endpoint.
#[derive(Debug, Clone)]
pub struct RotationStatus {
    pub current_interval: i64,
    pub last_rotation: Option<DateTime<Utc>>,
    /// Whole minutes until rotation is guaranteed; negative when overdue,
    /// `None` until the first rotation has happened.
    pub next_rotation_in: Option<i64>,
    pub timer_running: bool,
}

pub struct RotationScheduler {
    settings: SettingsStore,
    personas: PersonaStore,
    curve: RotationCurve,
    timer_started: AtomicBool,
}

impl RotationScheduler {
    pub fn new(settings: SettingsStore, personas: PersonaStore, curve: RotationCurve) -> Self {
        Self {
            settings,
            personas,
            curve,
            timer_started: AtomicBool::new(false),
        }
    }

    /// One scheduler pass. Establishes a selection immediately when none has
    /// ever been made, otherwise rolls the probability curve.
    pub async fn tick(&self) -> Result<Option<RotationEvent>> {
        let settings = self.settings.get_or_create().await?;

        let due = match settings.last_rotation {
            Some(last) => {
                let elapsed_minutes = (Utc::now() - last).num_milliseconds() as f64 / 60_000.0;
                let draw = rand::rng().random::<f64>();
                self.curve
                    .should_rotate(elapsed_minutes, settings.rotation_interval as f64, draw)
            }
            None => true,
        };

        if !due {
            return Ok(None);
        }
        self.rotate(&settings).await
    }

    /// Rotate now, skipping the probability curve. Still a no-op when no
    /// alternate active persona exists.
    pub async fn force_rotation(&self) -> Result<Option<RotationEvent>> {
        let settings = self.settings.get_or_create().await?;
        self.rotate(&settings).await
    }

    async fn rotate(&self, settings: &Settings) -> Result<Option<RotationEvent>> {
        let active = self.personas.list_active().await?;
        if active.is_empty() {
            info!("no active personas available for rotation");
            return Ok(None);
        }

        let candidates: Vec<&Persona> = active
            .iter()
            .filter(|p| Some(p.id.as_str()) != settings.selected_persona_id.as_deref())
            .collect();
        if candidates.is_empty() {
            info!("no alternate persona to rotate to");
            return Ok(None);
        }

        let next = candidates[rand::rng().random_range(0..candidates.len())];
        let now = Utc::now();
        self.settings.apply_rotation(&next.id, now).await?;

        let previous = match settings.selected_persona_id.as_deref() {
            Some(id) => self
                .personas
                .get(id)
                .await?
                .map(|p| PersonaRef { id: p.id, name: p.name }),
            None => None,
        };

        info!(persona = %next.name, "rotated persona");
        Ok(Some(RotationEvent {
            previous,
            current: PersonaRef {
                id: next.id.clone(),
                name: next.name.clone(),
            },
            rotated_at: now,
        }))
    }

    /// Change the rotation interval and restart the rotation clock.
    pub async fn update_interval(&self, minutes: i64) -> Result<()> {
        self.settings.set_rotation_interval(minutes, Utc::now()).await
    }

    pub async fn status(&self) -> Result<RotationStatus> {
        let settings = self.settings.get_or_create().await?;

        let next_rotation_in = settings.last_rotation.map(|last| {
            let due_at = last + TimeDelta::minutes(settings.rotation_interval);
            (due_at - Utc::now()).num_seconds().div_euclid(60)
        });

        Ok(RotationStatus {
            current_interval: settings.rotation_interval,
            last_rotation: settings.last_rotation,
            next_rotation_in,
            timer_running: self.timer_started.load(Ordering::SeqCst),
        })
    }

    pub fn timer_running(&self) -> bool {
        self.timer_started.load(Ordering::SeqCst)
    }

    /// Spawn the background rotation task if it is not already running.
    /// Returns whether this call started it. The task ticks immediately,
    /// then once per `every`.
    pub fn ensure_timer(self: &Arc<Self>, every: Duration) -> bool {
        if self
            .timer_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if let Err(err) = scheduler.tick().await {
                    warn!("rotation tick failed: {err:#}");
                }
                tokio::time::sleep(every).await;
            }
        });
        true
    }
}
