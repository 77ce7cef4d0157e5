//! Hitscan weapon state — config, ammo clip, reload state machine
//!
//! Единый источник истины для weapon data. Всё состояние — plain values,
//! собранные в один компонент на weapon entity; capability traits из
//! equipment модуля реализованы здесь.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::equipment::{Fireable, Reloadable};
use crate::scheduler::TimerHandle;

/// Sentinel: оружие ещё ни разу не стреляло
///
/// Первый StartFire при таком значении даёт first_delay = 0 (выстрел сразу).
pub const NEVER_FIRED: f64 = -1.0;

/// Статические параметры оружия (designer-tunable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Базовый урон одного попадания (до surface множителя)
    pub base_damage: f32,

    /// Half-angle конуса разброса (градусы)
    pub spread_degrees: f32,

    /// Скорострельность (выстрелов в минуту)
    pub rate_of_fire_rpm: u32,

    /// Размер клипа
    pub clip_size: u32,

    /// Стартовый резерв
    pub starting_reserve: u32,

    /// Максимальная дальность trace (units)
    pub max_range: f32,

    /// Socket на mesh'е, куда привязывается muzzle flash
    pub muzzle_socket: String,

    /// Имя параметра tracer-эффекта, принимающего конечную точку
    pub tracer_target_param: String,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            base_damage: 20.0,
            spread_degrees: 2.0,
            rate_of_fire_rpm: 600,
            clip_size: 30,
            starting_reserve: 999,
            max_range: 10_000.0,
            muzzle_socket: "MuzzleSocket".into(),
            tracer_target_param: "Target".into(),
        }
    }
}

/// Клип + резерв
///
/// Инварианты: 0 ≤ clip ≤ clip_size, reserve ≥ 0 (u32 — второе бесплатно).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoClip {
    pub clip: u32,
    pub clip_size: u32,
    pub reserve: u32,
}

impl AmmoClip {
    /// Полный клип + заданный резерв
    pub fn new(clip_size: u32, reserve: u32) -> Self {
        Self {
            clip: clip_size,
            clip_size,
            reserve,
        }
    }

    /// Сколько патронов не хватает до полного клипа
    pub fn deficit(&self) -> u32 {
        self.clip_size - self.clip
    }

    /// Есть ли что переносить: клип не полон и резерв не пуст.
    /// Частичная дозарядка разрешена — переносится min(reserve, deficit).
    pub fn can_refill(&self) -> bool {
        self.deficit() > 0 && self.reserve > 0
    }

    /// Списать один патрон (насыщающе)
    pub fn consume_round(&mut self) {
        self.clip = self.clip.saturating_sub(1);
    }

    /// Перенести min(reserve, deficit) из резерва в клип
    pub fn transfer_from_reserve(&mut self) -> u32 {
        let moved = self.reserve.min(self.deficit());
        self.clip += moved;
        self.reserve -= moved;
        moved
    }
}

/// Состояние reload state machine
///
/// Reloading блокирует и стрельбу, и повторный запуск перезарядки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPhase {
    #[default]
    Ready,
    Reloading,
}

/// Hitscan weapon — один instance на weapon entity
///
/// `time_between_shots` деривится один раз при создании (float division,
/// дробные темпы поддерживаются). `last_fire_time` монотонно не убывает.
#[derive(Component, Debug, Clone)]
pub struct HitscanWeapon {
    pub config: WeaponConfig,
    pub ammo: AmmoClip,
    pub reload: ReloadPhase,

    /// World-clock время последнего выстрела ([`NEVER_FIRED`] до первого)
    pub last_fire_time: f64,

    /// Wielder, к которому привязано оружие (aim origin, sprint gate)
    pub wielder: Entity,

    /// Активная cadence задача (Some = FiringCadence, None = Idle)
    pub cadence_task: Option<TimerHandle>,

    /// Активная reload-completion задача
    pub reload_task: Option<TimerHandle>,

    time_between_shots: f64,
}

impl HitscanWeapon {
    pub fn new(config: WeaponConfig, wielder: Entity) -> Self {
        let time_between_shots = 60.0 / config.rate_of_fire_rpm as f64;
        let ammo = AmmoClip::new(config.clip_size, config.starting_reserve);

        Self {
            config,
            ammo,
            reload: ReloadPhase::Ready,
            last_fire_time: NEVER_FIRED,
            wielder,
            cadence_task: None,
            reload_task: None,
            time_between_shots,
        }
    }

    /// Патронов в резерве
    pub fn current_ammo(&self) -> u32 {
        self.ammo.reserve
    }

    /// Патронов в клипе
    pub fn current_ammo_in_clip(&self) -> u32 {
        self.ammo.clip
    }

    /// Зажат ли триггер (cadence запланирована)
    pub fn is_firing(&self) -> bool {
        self.cadence_task.is_some()
    }
}

impl Fireable for HitscanWeapon {
    fn cadence_secs(&self) -> f64 {
        self.time_between_shots
    }

    fn rounds_in_clip(&self) -> u32 {
        self.ammo.clip
    }

    fn can_fire(&self, wielder_sprinting: bool) -> bool {
        !self.is_reloading() && !wielder_sprinting && self.ammo.clip > 0
    }

    fn consume_round(&mut self) {
        self.ammo.consume_round();
    }

    fn mark_fired(&mut self, now: f64) {
        self.last_fire_time = now;
    }
}

impl Reloadable for HitscanWeapon {
    fn reload_ready(&self) -> bool {
        self.reload == ReloadPhase::Ready
    }

    fn can_reload(&self) -> bool {
        self.ammo.can_refill()
    }

    fn start_reload(&mut self) {
        self.reload = ReloadPhase::Reloading;
    }

    fn finish_reload(&mut self) -> u32 {
        let moved = self.ammo.transfer_from_reserve();
        self.reload = ReloadPhase::Ready;
        moved
    }

    fn is_reloading(&self) -> bool {
        self.reload == ReloadPhase::Reloading
    }
}
