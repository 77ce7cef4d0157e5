//! Базовые ECS компоненты для симуляции
//!
//! Архитектура: Required Components (Bevy 0.16)
//! - Actor (wielder) требует Health + Locomotion + EyeView + EquippedWeapon
//! - Weapon state живёт в weapon::HitscanWeapon, здесь только wielder-side
//!   компоненты и shootable props

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::equipment::EquippedWeapon;

/// Актор (wielder, NPC, dummy) — базовый компонент для живых существ
///
/// Автоматически добавляет Health, Locomotion, EyeView и пустой weapon slot
/// через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Locomotion, EyeView, EquippedWeapon)]
pub struct Actor {
    /// Stable ID фракции (friendly fire, reputation)
    pub faction_id: u64,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Режим передвижения wielder'а
///
/// Спринт блокирует стрельбу (hip-fire only модель: на бегу оружие опущено).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum MoveMode {
    #[default]
    Idle,
    Walk,
    Sprint,
}

/// Locomotion state wielder'а — read-only вход для fire gating
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Locomotion {
    pub mode: MoveMode,
}

impl Locomotion {
    pub fn sprinting() -> Self {
        Self { mode: MoveMode::Sprint }
    }

    pub fn is_sprinting(&self) -> bool {
        self.mode == MoveMode::Sprint
    }
}

/// Точка прицеливания wielder'а
///
/// Aim origin = translation + Y * height, direction = transform forward.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct EyeView {
    /// Высота глаз над origin актора (метры)
    pub height: f32,
}

impl Default for EyeView {
    fn default() -> Self {
        Self { height: 1.6 }
    }
}

/// ID контроллера, управляющего wielder'ом (camera shake routing)
///
/// Отсутствует у NPC и у observer-реплик — shake тогда некуда слать.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct ControllerId(pub u32);

/// Классификация поверхности (closed set)
///
/// Единственный сигнал, который core различает: vulnerable flesh получает
/// умноженный урон, остальное — базовый.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum SurfaceKind {
    #[default]
    Default,
    FleshDefault,
    FleshVulnerable,
}

/// Физический материал shootable prop'а
///
/// Entity без SurfaceMaterial классифицируется как Default.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SurfaceMaterial {
    pub kind: SurfaceKind,
}

impl SurfaceMaterial {
    pub fn new(kind: SurfaceKind) -> Self {
        Self { kind }
    }
}

/// Сферический hit volume для hitscan trace
///
/// Trace резолвится явной ray/sphere математикой по этим volumes
/// (rapier collider на том же entity — для обычной физики тел).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitVolume {
    /// Радиус сферы (метры)
    pub radius: f32,
}

impl Default for HitVolume {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}

/// Spawn wielder: актор с kinematic capsule
///
/// Rapier: RigidBody::KinematicPositionBased + capsule (высота 1.0m, радиус 0.4m).
pub fn spawn_wielder(commands: &mut Commands, position: Vec3, faction_id: u64) -> Entity {
    commands
        .spawn((
            Actor { faction_id },
            Transform::from_translation(position),
            GlobalTransform::default(),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.4),
        ))
        .id()
}

/// Spawn shootable dummy: static сфера с hit volume и surface material
pub fn spawn_target_dummy(
    commands: &mut Commands,
    position: Vec3,
    radius: f32,
    surface: SurfaceKind,
) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            GlobalTransform::default(),
            Health::default(),
            HitVolume { radius },
            SurfaceMaterial::new(surface),
            RigidBody::Fixed,
            Collider::ball(radius),
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_saturates() {
        let mut health = Health::new(100);
        health.take_damage(250);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal_caps_at_max() {
        let mut health = Health::new(100);
        health.take_damage(30);
        health.heal(200);
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_locomotion_sprint_flag() {
        assert!(!Locomotion::default().is_sprinting());
        assert!(Locomotion::sprinting().is_sprinting());
        assert!(!Locomotion { mode: MoveMode::Walk }.is_sprinting());
    }

    #[test]
    fn test_surface_kind_default() {
        assert_eq!(SurfaceKind::default(), SurfaceKind::Default);
    }
}
