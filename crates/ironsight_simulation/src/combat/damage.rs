//! Point damage — применение урона от hitscan попаданий
//!
//! 1. Выстрел эмитит PointDamage (fire-and-forget, ответ не читается)
//! 2. apply_point_damage применяет к Health с surface множителем уже внутри
//!    amount
//! 3. DamageDealt / EntityDied — для UI, звуков, AI реакций

use bevy::prelude::*;

use crate::components::{Health, Locomotion, MoveMode, SurfaceKind};
use crate::logger::{log, log_warning};

/// Множитель урона по vulnerable flesh
pub const VULNERABLE_DAMAGE_MULTIPLIER: f32 = 4.0;

/// Вид урона (closed set, пока только пули)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Bullet,
}

/// Запрос на применение точечного урона
#[derive(Event, Debug, Clone)]
pub struct PointDamage {
    pub target: Entity,
    pub amount: f32,
    /// Направление выстрела (для knockback/эффектов на стороне презентации)
    pub direction: Vec3,
    /// Кто стрелял
    pub instigator: Entity,
    pub kind: DamageKind,
}

/// Событие: урон нанесён
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: entity умер (health == 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Маркер: entity мёртв
///
/// Деспавн не автоматический — трупы остаются на месте.
#[derive(Component, Debug)]
pub struct Dead;

/// Урон с учётом surface классификации
///
/// Vulnerable flesh умножает базовый урон, всё остальное — как есть.
pub fn surface_scaled_damage(base_damage: f32, surface: SurfaceKind) -> f32 {
    match surface {
        SurfaceKind::FleshVulnerable => base_damage * VULNERABLE_DAMAGE_MULTIPLIER,
        SurfaceKind::FleshDefault | SurfaceKind::Default => base_damage,
    }
}

/// Система: применить PointDamage к Health
pub fn apply_point_damage(
    mut damage_events: EventReader<PointDamage>,
    mut targets: Query<&mut Health>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
) {
    for damage in damage_events.read() {
        let Ok(mut health) = targets.get_mut(damage.target) else {
            log_warning(&format!(
                "PointDamage: target {:?} has no Health component",
                damage.target
            ));
            continue;
        };

        let amount = damage.amount.round() as u32;

        let was_alive = health.is_alive();
        health.take_damage(amount);
        let died = was_alive && !health.is_alive();

        dealt_events.write(DamageDealt {
            attacker: damage.instigator,
            target: damage.target,
            damage: amount,
            target_died: died,
        });

        if died {
            died_events.write(EntityDied {
                entity: damage.target,
                killer: Some(damage.instigator),
            });
            log(&format!(
                "Entity {:?} killed by {:?}",
                damage.target, damage.instigator
            ));
        }
    }
}

/// Система: остановить мёртвых
///
/// Locomotion → Idle, маркер Dead для презентации (death animation).
pub fn halt_dead(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    mut locomotion: Query<&mut Locomotion>,
) {
    for event in died_events.read() {
        if let Ok(mut movement) = locomotion.get_mut(event.entity) {
            movement.mode = MoveMode::Idle;
        }

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(Dead);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vulnerable_flesh_quadruples_damage() {
        // base 20 по FleshVulnerable → ровно 80
        assert_eq!(surface_scaled_damage(20.0, SurfaceKind::FleshVulnerable), 80.0);
    }

    #[test]
    fn test_other_surfaces_unmodified() {
        assert_eq!(surface_scaled_damage(20.0, SurfaceKind::Default), 20.0);
        assert_eq!(surface_scaled_damage(20.0, SurfaceKind::FleshDefault), 20.0);
    }

    #[test]
    fn test_point_damage_event_shape() {
        let damage = PointDamage {
            target: Entity::PLACEHOLDER,
            amount: 80.0,
            direction: Vec3::X,
            instigator: Entity::PLACEHOLDER,
            kind: DamageKind::Bullet,
        };
        assert_eq!(damage.amount, 80.0);
        assert_eq!(damage.kind, DamageKind::Bullet);
    }
}
