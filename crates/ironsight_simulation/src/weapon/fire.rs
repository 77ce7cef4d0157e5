//! Fire scheduler — cadence и попытка выстрела
//!
//! # Architecture
//!
//! Два состояния на оружие: Idle (нет cadence задачи) и FiringCadence
//! (repeating задача в TimerQueue). Каждый тик cadence — одна попытка
//! выстрела, гейты которой проверяются заново: перезарядка, спринт
//! wielder'а, пустой клип — молчаливый no-op.
//!
//! **Flow одного выстрела:**
//! 1. aim origin/direction с wielder'а (eye height + facing)
//! 2. разброс: равномерный конус `spread_degrees` (seeded rng)
//! 3. hitscan trace до `max_range`, стрелок и оружие игнорируются
//! 4. попадание → surface классификация → урон (authority only)
//! 5. списание патрона, авто-reload на пустом клипе
//! 6. authority публикует version-stamped trace для observer'ов

use bevy::prelude::*;

use crate::combat::{surface_scaled_damage, DamageKind, PointDamage};
use crate::components::{ControllerId, EyeView, HitVolume, Locomotion, SurfaceKind, SurfaceMaterial};
use crate::effects::{
    play_fire_effects, play_impact_effects, DebugTraceLine, DebugWeaponDrawing, FxEmitters,
    SoundCue, SoundCueFx, WeaponAnimations,
};
use crate::equipment::{EquippedWeapon, Fireable};
use crate::logger::log_warning;
use crate::replication::{
    AuthorityFire, HitscanTrace, LocallyControlled, NetRole, ReplicatedTrace, ServerFireRequest,
    WeaponNetId,
};
use crate::scheduler::{TimerFired, TimerHandle, TimerQueue};
use crate::weapon::raycast::cast_hitscan_ray;
use crate::weapon::reload::begin_reload;
use crate::weapon::spread::deviate_uniform_cone;
use crate::weapon::state::HitscanWeapon;
use crate::DeterministicRng;

/// Триггер зажат: армировать cadence
#[derive(Event, Debug, Clone, Copy)]
pub struct StartFireIntent {
    pub weapon: Entity,
}

/// Триггер отпущен: снять cadence (no-op если Idle)
#[derive(Event, Debug, Clone, Copy)]
pub struct StopFireIntent {
    pub weapon: Entity,
}

/// Задержка до первого тика cadence
///
/// Удерживает реальный темп при spam'е триггера: быстрый re-StartFire не
/// обгоняет интервал, а после долгой паузы clamp даёт мгновенный выстрел.
pub fn first_cadence_delay(last_fire_time: f64, cadence: f64, now: f64) -> f64 {
    (last_fire_time + cadence - now).max(0.0)
}

/// Система: StartFire / StopFire интенты
pub fn process_fire_control(
    mut start_events: EventReader<StartFireIntent>,
    mut stop_events: EventReader<StopFireIntent>,
    mut weapons: Query<&mut HitscanWeapon>,
    slots: Query<&EquippedWeapon>,
    mut queue: ResMut<TimerQueue>,
) {
    for intent in start_events.read() {
        let Ok(mut weapon) = weapons.get_mut(intent.weapon) else {
            log_warning(&format!("StartFireIntent: {:?} is not a weapon", intent.weapon));
            continue;
        };

        // Триггер слушает только активное (equipped) оружие
        let is_active = slots
            .get(weapon.wielder)
            .map(|slot| slot.is_active(intent.weapon))
            .unwrap_or(false);
        if !is_active {
            log_warning(&format!(
                "StartFireIntent: weapon {:?} is not the active weapon of {:?}",
                intent.weapon, weapon.wielder
            ));
            continue;
        }

        let cadence = weapon.cadence_secs();
        let first_delay = first_cadence_delay(weapon.last_fire_time, cadence, queue.now());

        // Повторный StartFire пере-армирует ту же cadence, никогда не вторую
        if let Some(handle) = weapon.cadence_task.take() {
            queue.cancel(handle);
        }
        weapon.cadence_task = Some(queue.schedule_repeating(cadence, first_delay));
    }

    for intent in stop_events.read() {
        let Ok(mut weapon) = weapons.get_mut(intent.weapon) else {
            continue;
        };

        if let Some(handle) = weapon.cadence_task.take() {
            queue.cancel(handle);
        }
    }
}

/// Система: попытки выстрела
///
/// Источники: собственные cadence тики + принятые fire requests
/// (authority исполняет forwarded попытку сам, со своими гейтами).
pub fn fire_weapons(
    mut ticks: EventReader<TimerFired>,
    mut accepted: EventReader<AuthorityFire>,
    mut weapons: Query<(
        Entity,
        &mut HitscanWeapon,
        &NetRole,
        &WeaponNetId,
        Option<&LocallyControlled>,
        Option<&mut ReplicatedTrace>,
        Option<&WeaponAnimations>,
    )>,
    wielders: Query<(&Transform, &EyeView, &Locomotion, Option<&ControllerId>)>,
    targets: Query<(Entity, &Transform, &HitVolume, Option<&SurfaceMaterial>)>,
    mut queue: ResMut<TimerQueue>,
    mut rng: ResMut<DeterministicRng>,
    debug_draw: Res<DebugWeaponDrawing>,
    mut requests: EventWriter<ServerFireRequest>,
    mut damage: EventWriter<PointDamage>,
    mut fx: FxEmitters,
) {
    let fired_handles: Vec<TimerHandle> = ticks.read().map(|tick| tick.handle).collect();

    let mut to_fire: Vec<Entity> = Vec::new();
    for handle in fired_handles {
        let owner = weapons
            .iter()
            .find(|(_, weapon, ..)| weapon.cadence_task == Some(handle))
            .map(|(entity, ..)| entity);
        if let Some(entity) = owner {
            to_fire.push(entity);
        }
    }
    for fire in accepted.read() {
        to_fire.push(fire.weapon);
    }

    for weapon_entity in to_fire {
        let Ok((entity, mut weapon, role, net_id, locally_controlled, mut replicated, animations)) =
            weapons.get_mut(weapon_entity)
        else {
            continue;
        };

        let Ok((wielder_transform, eye, locomotion, controller)) = wielders.get(weapon.wielder)
        else {
            log_warning(&format!(
                "fire_weapons: weapon {:?} has no wielder {:?}",
                entity, weapon.wielder
            ));
            continue;
        };

        // Гейты: перезарядка / спринт / пустой клип → молчаливый no-op
        if !weapon.can_fire(locomotion.is_sprinting()) {
            continue;
        }

        if *role == NetRole::SimulatedProxy {
            if locally_controlled.is_none() {
                // Невладеющий observer выстрелы не инициирует
                continue;
            }
            // Владеющая реплика: forward на authority ДО локального резолва,
            // дальше локальный выстрел — её cosmetic prediction
            requests.write(ServerFireRequest { net_id: *net_id });
        }

        let aim_origin = wielder_transform.translation + Vec3::Y * eye.height;
        let shot_direction = deviate_uniform_cone(
            *wielder_transform.forward(),
            weapon.config.spread_degrees,
            &mut rng.rng,
        );

        let ignore = [weapon.wielder, entity];
        let hit = cast_hitscan_ray(
            aim_origin,
            shot_direction,
            weapon.config.max_range,
            &ignore,
            targets
                .iter()
                .map(|(target, transform, volume, _)| (target, transform.translation, volume.radius)),
        );

        let mut surface = SurfaceKind::Default;
        let trace_end = match hit {
            Some(hit) => {
                surface = targets
                    .get(hit.entity)
                    .ok()
                    .and_then(|(_, _, _, material)| material)
                    .map(|material| material.kind)
                    .unwrap_or_default();

                // Урон — строго authority-only
                if *role == NetRole::Authority {
                    damage.write(PointDamage {
                        target: hit.entity,
                        amount: surface_scaled_damage(weapon.config.base_damage, surface),
                        direction: shot_direction,
                        instigator: weapon.wielder,
                        kind: DamageKind::Bullet,
                    });
                }

                play_impact_effects(&mut fx, entity, surface, hit.point);
                hit.point
            }
            // Промах: tracer уходит в дальний конец луча
            None => aim_origin + shot_direction * weapon.config.max_range,
        };

        if debug_draw.0 {
            fx.debug_lines.write(DebugTraceLine {
                from: aim_origin,
                to: aim_origin + shot_direction * weapon.config.max_range,
            });
        }

        fx.sound.write(SoundCueFx {
            weapon: entity,
            cue: SoundCue::Fire,
        });
        play_fire_effects(&mut fx, entity, &weapon.config, controller.copied(), trace_end);

        weapon.consume_round();
        if weapon.rounds_in_clip() == 0 {
            begin_reload(entity, &mut weapon, animations, &mut queue, &mut fx);
        }

        weapon.mark_fired(queue.now());

        if *role == NetRole::Authority {
            if let Some(replicated) = replicated.as_mut() {
                replicated.publish(HitscanTrace {
                    trace_to: trace_end,
                    surface,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_delay_clamps_to_zero() {
        // Оружие ни разу не стреляло (last = -1), 600 rpm → немедленный тик
        assert_eq!(first_cadence_delay(-1.0, 0.1, 0.0), 0.0);
    }

    #[test]
    fn test_first_delay_respects_cadence() {
        // Выстрел был на t=0, триггер снова на t=0.05 → ждать остаток 0.05
        let delay = first_cadence_delay(0.0, 0.1, 0.05);
        assert!((delay - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_first_delay_zero_after_long_pause() {
        assert_eq!(first_cadence_delay(0.0, 0.1, 5.0), 0.0);
    }
}
