//! Combat module — point damage pipeline
//!
//! ECS ответственность:
//! - Damage math: surface множитель, применение к Health
//! - Events: PointDamage (вход), DamageDealt / EntityDied (выход)
//!
//! Урон пишет только authority-сторона (см. replication); observer'ы
//! никогда не эмитят PointDamage.

use bevy::prelude::*;

pub mod damage;

pub use damage::{
    apply_point_damage, halt_dead, surface_scaled_damage, DamageDealt, DamageKind, Dead,
    EntityDied, PointDamage, VULNERABLE_DAMAGE_MULTIPLIER,
};

/// Регистрирует combat события (системы — в SimulationPlugin chain)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PointDamage>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();
    }
}
