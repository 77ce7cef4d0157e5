//! Equipment seam — equippable items и capability traits
//!
//! # Architecture
//!
//! Weapon — отдельный entity, attached к wielder через `EquippedWeapon` slot.
//! Никакого наследования: системы общаются с оружием через capability traits
//! (`Fireable`, `Reloadable`), состояние — plain struct в компоненте.
//!
//! **Lifecycle:**
//! - `EquipWeaponIntent` → weapon становится active в слоте wielder'а
//! - `UnequipWeaponIntent` → слот очищается, cadence отменяется (зажатый
//!   триггер не должен пережить убранное оружие)

use bevy::prelude::*;

use crate::logger::{log, log_warning};
use crate::scheduler::TimerQueue;
use crate::weapon::HitscanWeapon;

/// Capability: item умеет стрелять по cadence
pub trait Fireable {
    /// Интервал между выстрелами (секунды)
    fn cadence_secs(&self) -> f64;

    /// Патронов в клипе
    fn rounds_in_clip(&self) -> u32;

    /// Легальна ли попытка выстрела прямо сейчас
    ///
    /// false при: перезарядке, спринте wielder'а, пустом клипе.
    fn can_fire(&self, wielder_sprinting: bool) -> bool;

    /// Списать один патрон (насыщающе, клип не уходит ниже нуля)
    fn consume_round(&mut self);

    /// Зафиксировать момент выстрела
    fn mark_fired(&mut self, now: f64);
}

/// Capability: item умеет перезаряжаться из резерва
pub trait Reloadable {
    /// Готов ли начать перезарядку (не в процессе)
    fn reload_ready(&self) -> bool;

    /// Есть ли что перезаряжать: клип не полон и резерв не пуст
    fn can_reload(&self) -> bool;

    /// Перейти в Reloading (вызывающий обязан проверить ready + can)
    fn start_reload(&mut self);

    /// Завершить: перенести min(reserve, deficit), вернуться в Ready.
    /// Возвращает число перенесённых патронов.
    fn finish_reload(&mut self) -> u32;

    fn is_reloading(&self) -> bool;
}

/// Активный weapon slot wielder'а (ровно один слот)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct EquippedWeapon {
    pub active: Option<Entity>,
}

impl EquippedWeapon {
    pub fn is_active(&self, weapon: Entity) -> bool {
        self.active == Some(weapon)
    }
}

/// Equip weapon в активный слот wielder'а
#[derive(Event, Debug, Clone, Copy)]
pub struct EquipWeaponIntent {
    pub wielder: Entity,
    pub weapon: Entity,
}

/// Unequip активного weapon'а
#[derive(Event, Debug, Clone, Copy)]
pub struct UnequipWeaponIntent {
    pub wielder: Entity,
}

/// Process equip weapon intents
pub fn process_equip_weapon(
    mut events: EventReader<EquipWeaponIntent>,
    mut slots: Query<&mut EquippedWeapon>,
    weapons: Query<&HitscanWeapon>,
) {
    for intent in events.read() {
        let Ok(mut slot) = slots.get_mut(intent.wielder) else {
            log_warning(&format!(
                "EquipWeaponIntent: wielder {:?} has no weapon slot",
                intent.wielder
            ));
            continue;
        };

        let Ok(weapon) = weapons.get(intent.weapon) else {
            log_warning(&format!(
                "EquipWeaponIntent: entity {:?} is not a weapon",
                intent.weapon
            ));
            continue;
        };

        if weapon.wielder != intent.wielder {
            log_warning(&format!(
                "EquipWeaponIntent: weapon {:?} belongs to {:?}, not {:?}",
                intent.weapon, weapon.wielder, intent.wielder
            ));
            continue;
        }

        slot.active = Some(intent.weapon);
        log(&format!(
            "Equipped weapon {:?} on wielder {:?}",
            intent.weapon, intent.wielder
        ));
    }
}

/// Process unequip weapon intents
///
/// Отменяет cadence убираемого оружия; незавершённая перезарядка продолжает
/// идти до конца (reload не отменяем).
pub fn process_unequip_weapon(
    mut events: EventReader<UnequipWeaponIntent>,
    mut slots: Query<&mut EquippedWeapon>,
    mut weapons: Query<&mut HitscanWeapon>,
    mut queue: ResMut<TimerQueue>,
) {
    for intent in events.read() {
        let Ok(mut slot) = slots.get_mut(intent.wielder) else {
            continue;
        };

        let Some(weapon_entity) = slot.active.take() else {
            continue; // слот уже пуст
        };

        if let Ok(mut weapon) = weapons.get_mut(weapon_entity) {
            if let Some(handle) = weapon.cadence_task.take() {
                queue.cancel(handle);
            }
        }

        log(&format!(
            "Unequipped weapon {:?} from wielder {:?}",
            weapon_entity, intent.wielder
        ));
    }
}

/// Регистрирует equipment события (системы — в SimulationPlugin chain)
pub struct EquipmentPlugin;

impl Plugin for EquipmentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EquipWeaponIntent>()
            .add_event::<UnequipWeaponIntent>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_not_active() {
        let slot = EquippedWeapon::default();
        assert!(!slot.is_active(Entity::PLACEHOLDER));
    }

    #[test]
    fn test_slot_matches_equipped_entity() {
        let weapon = Entity::from_raw(7);
        let slot = EquippedWeapon { active: Some(weapon) };
        assert!(slot.is_active(weapon));
        assert!(!slot.is_active(Entity::from_raw(8)));
    }
}
