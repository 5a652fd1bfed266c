// Pixel budget economy
//
// Per-participant depleting budget with fixed-interval regeneration, plus a
// per-participant cooldown between accepted draws. Callers pass `now` in, so
// regeneration is driven by the ticker and tests never sleep.

use crate::config::EconomyConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};


/// Budget state for a single participant.
#[derive(Debug, Clone)]
struct PixelBudget {
    count: u32,
    /// Instant of the next +1. None while the budget is full.
    regen_deadline: Option<Instant>,
    last_consume: Option<Instant>,
}

impl PixelBudget {
    fn full(max: u32) -> Self {
        Self {
            count: max,
            regen_deadline: None,
            last_consume: None,
        }
    }

    /// Credit one pixel per elapsed interval, never past `max`.
    /// Returns true if the count changed.
    fn regenerate(&mut self, now: Instant, max: u32, interval: Duration) -> bool {
        let mut changed = false;
        while let Some(deadline) = self.regen_deadline {
            if self.count >= max {
                self.regen_deadline = None;
                break;
            }
            if now < deadline {
                break;
            }
            self.count += 1;
            changed = true;
            self.regen_deadline = if self.count < max {
                Some(deadline + interval)
            } else {
                None
            };
        }
        changed
    }

    /// Cooldown is checked before any regeneration is credited, so a refused
    /// draw leaves the count untouched and due pixels to the next tick.
    fn try_consume(
        &mut self,
        now: Instant,
        max: u32,
        interval: Duration,
        cooldown: Duration,
    ) -> Result<u32, EconomyError> {
        if let Some(last) = self.last_consume {
            if now.saturating_duration_since(last) < cooldown {
                return Err(EconomyError::CooldownActive);
            }
        }
        self.regenerate(now, max, interval);
        if self.count == 0 {
            return Err(EconomyError::BudgetExhausted);
        }

        self.count -= 1;
        self.last_consume = Some(now);

        // Leaving the full state arms a fresh interval; otherwise the running
        // deadline is kept.
        if self.regen_deadline.is_none() {
            self.regen_deadline = Some(now + interval);
        }

        Ok(self.count)
    }

    fn status(&self, now: Instant) -> BudgetStatus {
        let next_regen_seconds = self.regen_deadline.map(|deadline| {
            let left = deadline.saturating_duration_since(now);
            let secs = left.as_secs();
            if left.subsec_nanos() > 0 {
                secs + 1
            } else {
                secs
            }
        });
        BudgetStatus {
            remaining: self.count,
            next_regen_seconds,
        }
    }
}

/// Remaining budget as reported to the owning participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub remaining: u32,
    /// Whole seconds (rounded up) until the next pixel; None when full.
    pub next_regen_seconds: Option<u64>,
}

/// Budget change produced by a regeneration tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetChange {
    pub participant: String,
    pub status: BudgetStatus,
}

/// Reasons a consume is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    BudgetExhausted,
    CooldownActive,
    UnknownParticipant,
}

impl fmt::Display for EconomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EconomyError::BudgetExhausted => write!(f, "no pixels left, wait for regeneration"),
            EconomyError::CooldownActive => write!(f, "draw cooldown active"),
            EconomyError::UnknownParticipant => write!(f, "participant has no pixel budget"),
        }
    }
}

impl std::error::Error for EconomyError {}

/// Per-participant pixel budgets.
///
/// Budgets are created when a participant joins and dropped when they leave.
/// State is in-memory only.
pub struct PixelEconomy {
    budgets: HashMap<String, PixelBudget>,
    max_pixels: u32,
    regen_interval: Duration,
    cooldown: Duration,
}

impl PixelEconomy {
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            budgets: HashMap::new(),
            max_pixels: config.max_pixels,
            regen_interval: config.regen_interval(),
            cooldown: config.cooldown(),
        }
    }

    pub fn max_pixels(&self) -> u32 {
        self.max_pixels
    }

    /// Start a participant with a full budget. Re-enrolling resets the budget.
    pub fn enroll(&mut self, participant: &str, now: Instant) -> BudgetStatus {
        let budget = PixelBudget::full(self.max_pixels);
        let status = budget.status(now);
        self.budgets.insert(participant.to_string(), budget);
        status
    }

    pub fn remove(&mut self, participant: &str) -> bool {
        self.budgets.remove(participant).is_some()
    }

    /// Try to spend one pixel for `participant` at `now`.
    ///
    /// Refused when the previous accepted draw was less than the cooldown ago.
    /// Otherwise any regeneration already due is credited, then the draw is
    /// refused if the budget is still empty.
    pub fn try_consume(
        &mut self,
        participant: &str,
        now: Instant,
    ) -> Result<BudgetStatus, EconomyError> {
        let budget = self
            .budgets
            .get_mut(participant)
            .ok_or(EconomyError::UnknownParticipant)?;

        budget.try_consume(now, self.max_pixels, self.regen_interval, self.cooldown)?;
        Ok(budget.status(now))
    }

    /// Credit regeneration for every participant whose deadline has passed.
    ///
    /// Idempotent for a repeated `now`: a second call finds no due deadline.
    pub fn tick(&mut self, now: Instant) -> Vec<BudgetChange> {
        let mut changes = Vec::new();
        for (participant, budget) in self.budgets.iter_mut() {
            if budget.regenerate(now, self.max_pixels, self.regen_interval) {
                changes.push(BudgetChange {
                    participant: participant.clone(),
                    status: budget.status(now),
                });
            }
        }
        changes
    }

    pub fn status(&self, participant: &str, now: Instant) -> Option<BudgetStatus> {
        self.budgets.get(participant).map(|b| b.status(now))
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }
}
