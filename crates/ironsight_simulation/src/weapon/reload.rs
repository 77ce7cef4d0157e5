//! Reload — запуск, completion timer, перенос патронов
//!
//! Запуск идёт через montage: его отрепортованная длительность армирует
//! one-shot completion задачу (fallback 1.5s, если montage не назначен или
//! репортует ноль). Начатая перезарядка всегда доходит до конца — отмены нет.

use bevy::prelude::*;

use crate::effects::{FxEmitters, MontageCue, MontageStarted, MontageStopped, SoundCue, SoundCueFx, WeaponAnimations};
use crate::equipment::Reloadable;
use crate::logger::{log, log_warning};
use crate::scheduler::{TimerFired, TimerQueue};
use crate::weapon::state::HitscanWeapon;

/// Длительность перезарядки, когда montage не репортует свою
pub const FALLBACK_RELOAD_SECS: f64 = 1.5;

/// Запрос перезарядки (UI кнопка либо авто-reload на пустом клипе)
#[derive(Event, Debug, Clone, Copy)]
pub struct ReloadIntent {
    pub weapon: Entity,
}

/// Начать перезарядку. Возвращает false (no-op) если уже идёт перезарядка,
/// клип полон или резерв пуст.
pub fn begin_reload(
    weapon_entity: Entity,
    weapon: &mut HitscanWeapon,
    animations: Option<&WeaponAnimations>,
    queue: &mut TimerQueue,
    fx: &mut FxEmitters,
) -> bool {
    if !weapon.reload_ready() || !weapon.can_reload() {
        return false;
    }

    weapon.start_reload();

    let montage = animations.and_then(|animations| animations.reload_montage);
    let duration = match montage {
        Some(montage) if montage.duration_secs > 0.0 => {
            fx.montage_started.write(MontageStarted {
                weapon: weapon_entity,
                montage: MontageCue::Reload,
                duration_secs: montage.duration_secs,
            });
            montage.duration_secs as f64
        }
        _ => FALLBACK_RELOAD_SECS,
    };

    weapon.reload_task = Some(queue.schedule_once(duration));

    fx.sound.write(SoundCueFx {
        weapon: weapon_entity,
        cue: SoundCue::Reload,
    });

    log(&format!(
        "Reload started on {:?} ({:.2}s, clip {}/{})",
        weapon_entity,
        duration,
        weapon.ammo.clip,
        weapon.ammo.clip_size
    ));

    true
}

/// Система: ReloadIntent события
pub fn process_reload_intents(
    mut events: EventReader<ReloadIntent>,
    mut weapons: Query<(Entity, &mut HitscanWeapon, Option<&WeaponAnimations>)>,
    mut queue: ResMut<TimerQueue>,
    mut fx: FxEmitters,
) {
    for intent in events.read() {
        let Ok((entity, mut weapon, animations)) = weapons.get_mut(intent.weapon) else {
            log_warning(&format!("ReloadIntent: {:?} is not a weapon", intent.weapon));
            continue;
        };

        begin_reload(entity, &mut weapon, animations, &mut queue, &mut fx);
    }
}

/// Система: completion — перенести min(reserve, deficit), вернуться в Ready
pub fn finish_reloads(
    mut ticks: EventReader<TimerFired>,
    mut weapons: Query<(Entity, &mut HitscanWeapon)>,
    mut fx: FxEmitters,
) {
    for tick in ticks.read() {
        for (entity, mut weapon) in weapons.iter_mut() {
            if weapon.reload_task != Some(tick.handle) {
                continue;
            }

            weapon.reload_task = None;
            let moved = weapon.finish_reload();

            fx.montage_stopped.write(MontageStopped {
                weapon: entity,
                montage: MontageCue::Reload,
            });

            log(&format!(
                "Reload complete on {:?}: +{} rounds (clip {}/{}, reserve {})",
                entity,
                moved,
                weapon.ammo.clip,
                weapon.ammo.clip_size,
                weapon.ammo.reserve
            ));
        }
    }
}
