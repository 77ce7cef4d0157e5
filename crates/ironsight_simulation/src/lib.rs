//! IRONSIGHT Simulation Core
//!
//! Headless-симуляция hitscan оружия на Bevy ECS 0.16: fire-control cadence,
//! ammo/reload state machine и authority/observer replication bridge.
//!
//! Архитектура:
//! - ECS = game state (ammo, cadence, канонический trace)
//! - Презентация (muzzle flash, tracers, звук, анимации) — за границей,
//!   события effects::* fire-and-forget
//! - Время владеет scheduler::TimerQueue (фиксированный тик), никакого
//!   wall clock в gameplay коде

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod effects;
pub mod equipment;
pub mod logger;
pub mod replication;
pub mod scheduler;
pub mod weapon;

// Re-export базовых типов для удобства
pub use combat::{
    apply_point_damage, surface_scaled_damage, CombatPlugin, DamageDealt, DamageKind, Dead,
    EntityDied, PointDamage, VULNERABLE_DAMAGE_MULTIPLIER,
};
pub use components::*;
pub use effects::{
    DebugWeaponDrawing, EffectsPlugin, FxEmitters, ImpactFx, ImpactVisual, Montage, MontageCue,
    MontageStarted, MontageStopped, MuzzleFlashFx, SoundCue, SoundCueFx, TracerFx,
    WeaponAnimations,
};
pub use equipment::{
    EquipWeaponIntent, EquipmentPlugin, EquippedWeapon, Fireable, Reloadable, UnequipWeaponIntent,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use replication::{
    HitscanTrace, LastReplayedVersion, LocallyControlled, NetRole, ReplicatedTrace,
    ReplicationConfig, ReplicationPlugin, ServerFireRequest, TraceReplicated, WeaponNetId,
};
pub use scheduler::{SchedulerPlugin, TimerFired, TimerHandle, TimerQueue};
pub use weapon::{
    AmmoClip, HitscanWeapon, ReloadIntent, ReloadPhase, StartFireIntent, StopFireIntent,
    WeaponConfig, WeaponPlugin, FALLBACK_RELOAD_SECS, NEVER_FIRED,
};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Порядок FixedUpdate chain (строго последовательный, без re-entrancy):
/// 1. advance_timer_queue — тик clock'а, TimerFired события
/// 2. equipment — equip/unequip интенты
/// 3. process_fire_control — StartFire/StopFire интенты
/// 4. relay_fire_requests — приём forwarded выстрелов
/// 5. fire_weapons — cadence тики → попытки выстрела
/// 6. reload — интенты + completion
/// 7. combat — применение урона, смерть
/// 8. replication — пропагация trace + cosmetic replay
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            SchedulerPlugin,
            EquipmentPlugin,
            WeaponPlugin,
            CombatPlugin,
            EffectsPlugin,
            ReplicationPlugin,
        ));

        // init_resource не затирает seed, выставленный create_headless_app
        app.init_resource::<DeterministicRng>();

        app.add_systems(
            FixedUpdate,
            (
                scheduler::advance_timer_queue,
                equipment::process_equip_weapon,
                equipment::process_unequip_weapon,
                weapon::process_fire_control,
                replication::relay_fire_requests,
                weapon::fire_weapons,
                weapon::process_reload_intents,
                weapon::finish_reloads,
                combat::apply_point_damage,
                combat::halt_dead,
                replication::propagate_resolved_trace,
                replication::replay_trace_on_observers,
            )
                .chain(),
        );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// SimulationPlugin добавляет вызывающий — тесты иногда собирают свой набор.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot weapon + health состояния для сравнения детерминизма
///
/// Entities сортируются по index, поля сериализуются в байты напрямую.
pub fn simulation_snapshot(world: &mut World) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut weapon_query = world.query::<(Entity, &HitscanWeapon)>();
    let mut weapons: Vec<_> = weapon_query.iter(world).collect();
    weapons.sort_by_key(|(entity, _)| entity.index());
    for (entity, weapon) in weapons {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(&weapon.ammo.clip.to_le_bytes());
        snapshot.extend_from_slice(&weapon.ammo.reserve.to_le_bytes());
        snapshot.extend_from_slice(&weapon.last_fire_time.to_le_bytes());
    }

    let mut health_query = world.query::<(Entity, &Health)>();
    let mut healths: Vec<_> = health_query.iter(world).collect();
    healths.sort_by_key(|(entity, _)| entity.index());
    for (entity, health) in healths {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(&health.current.to_le_bytes());
        snapshot.extend_from_slice(&health.max.to_le_bytes());
    }

    let mut trace_query = world.query::<(Entity, &ReplicatedTrace)>();
    let mut traces: Vec<_> = trace_query.iter(world).collect();
    traces.sort_by_key(|(entity, _)| entity.index());
    for (entity, replicated) in traces {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(&replicated.version.to_le_bytes());
        if let Some(trace) = replicated.latest {
            snapshot.extend_from_slice(&trace.trace_to.x.to_le_bytes());
            snapshot.extend_from_slice(&trace.trace_to.y.to_le_bytes());
            snapshot.extend_from_slice(&trace.trace_to.z.to_le_bytes());
        }
    }

    snapshot
}
