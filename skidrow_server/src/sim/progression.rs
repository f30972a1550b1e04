//! Level progression.
//!
//! Kill thresholds are cumulative across the run. Milestone levels also need
//! their boss dead, and summon it once kills come within
//! `BOSS_WARNING_KILLS` of the threshold.

use skidrow_shared::tables::{level_config, LevelConfig, LEVELS};

pub const BOSS_WARNING_KILLS: u32 = 5;

/// Per-room progression state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    level: u32,
    total_kills: u32,
    boss_spawned: bool,
    boss_killed: bool,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            total_kills: 0,
            boss_spawned: false,
            boss_killed: false,
        }
    }
}

impl Progression {
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_kills(&self) -> u32 {
        self.total_kills
    }

    pub fn boss_spawned(&self) -> bool {
        self.boss_spawned
    }

    pub fn boss_killed(&self) -> bool {
        self.boss_killed
    }

    pub fn config(&self) -> &'static LevelConfig {
        level_config(self.level)
    }

    pub fn is_final_level(&self) -> bool {
        self.level as usize >= LEVELS.len()
    }

    pub fn record_kill(&mut self, boss: bool) {
        self.total_kills = self.total_kills.saturating_add(1);
        if boss {
            self.boss_killed = true;
        }
    }

    pub fn mark_boss_spawned(&mut self) {
        self.boss_spawned = true;
    }

    /// Whether the milestone boss should be summoned now.
    pub fn boss_due(&self) -> bool {
        let cfg = self.config();
        cfg.milestone
            && !self.boss_spawned
            && self.total_kills >= cfg.kills_to_advance.saturating_sub(BOSS_WARNING_KILLS)
    }

    pub fn can_advance(&self) -> bool {
        let cfg = self.config();
        if self.is_final_level() || self.total_kills < cfg.kills_to_advance {
            return false;
        }
        !cfg.milestone || self.boss_killed
    }

    /// Advances one level if allowed. Kill totals carry over.
    pub fn try_advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.level += 1;
        self.boss_spawned = false;
        self.boss_killed = false;
        true
    }
}
