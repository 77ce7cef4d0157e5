//! Authority/observer bridge — one-way replication hitscan trace
//!
//! # Architecture
//!
//! Ровно одна реплика логического оружия — authority; остальные — simulated
//! proxies, связанные общим `WeaponNetId`. Канонический результат выстрела
//! (`ReplicatedTrace`) мутирует только authority; наружу он уходит
//! version-stamped событием, observer'ы применяют его как чистую презентацию
//! (replay выстрела), дедуплицируя по version.
//!
//! **Fire forwarding:** выстрел с владеющей non-authority реплики уходит на
//! authority как `ServerFireRequest` ДО локального резолва. Запросы
//! принимаются всегда — параметры не валидируются (известная trust gap,
//! сохранена сознательно; см. DESIGN.md).
//!
//! Предсказавшая копия владельца (`LocallyControlled`) из replay исключается:
//! она уже отрисовала собственный выстрел.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{ControllerId, SurfaceKind};
use crate::effects::{play_fire_effects, play_impact_effects, FxEmitters};
use crate::logger::{log, log_warning};
use crate::weapon::HitscanWeapon;

/// Роль реплики
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetRole {
    /// Единственная реплика, которой разрешено мутировать канон
    Authority,
    /// Observer: принимает и презентует реплицированное состояние
    SimulatedProxy,
}

/// Связывает реплики одного логического оружия
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeaponNetId(pub u32);

/// Маркер: предсказывающая копия владельца на owning client
///
/// Replay реплицированного trace её обходит (она уже показала свой выстрел).
#[derive(Component, Debug, Default)]
pub struct LocallyControlled;

/// Результат одного hitscan выстрела
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitscanTrace {
    /// Точка попадания, либо дальний конец луча при промахе
    pub trace_to: Vec3,
    pub surface: SurfaceKind,
}

/// Version-stamped канонический trace (только на authority entity)
#[derive(Component, Debug, Default)]
pub struct ReplicatedTrace {
    pub latest: Option<HitscanTrace>,
    pub version: u32,
}

impl ReplicatedTrace {
    /// Опубликовать новый trace (бампает version — триггер пропагации)
    pub fn publish(&mut self, trace: HitscanTrace) {
        self.latest = Some(trace);
        self.version += 1;
    }
}

/// Последняя version, которую observer уже отыграл
#[derive(Component, Debug, Default)]
pub struct LastReplayedVersion(pub u32);

/// Reliable RPC: запрос выстрела от владеющего клиента к authority
#[derive(Event, Debug, Clone, Copy)]
pub struct ServerFireRequest {
    pub net_id: WeaponNetId,
}

/// Принятый запрос: authority-реплике предписано выполнить попытку выстрела
#[derive(Event, Debug, Clone, Copy)]
pub struct AuthorityFire {
    pub weapon: Entity,
}

/// Изменение канонического trace, уходящее observer'ам
#[derive(Event, Debug, Clone, Copy)]
pub struct TraceReplicated {
    pub net_id: WeaponNetId,
    pub trace: HitscanTrace,
    pub version: u32,
}

/// Параметры канала репликации (частоты апдейтов)
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReplicationConfig {
    pub update_hz: f32,
    pub min_update_hz: f32,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            update_hz: 66.0,
            min_update_hz: 33.0,
        }
    }
}

/// Система: принять forwarded fire requests
///
/// Запрос всегда принимается — существование authority-реплики с тем же
/// net id и есть вся проверка.
pub fn relay_fire_requests(
    mut requests: EventReader<ServerFireRequest>,
    weapons: Query<(Entity, &NetRole, &WeaponNetId), With<HitscanWeapon>>,
    mut accepted: EventWriter<AuthorityFire>,
) {
    for request in requests.read() {
        let authority = weapons
            .iter()
            .find(|(_, role, net_id)| **role == NetRole::Authority && **net_id == request.net_id);

        let Some((weapon, _, _)) = authority else {
            log_warning(&format!(
                "ServerFireRequest: no authority replica for net id {:?}",
                request.net_id
            ));
            continue;
        };

        accepted.write(AuthorityFire { weapon });
    }
}

/// Система: разослать изменившийся канонический trace
pub fn propagate_resolved_trace(
    changed: Query<(&ReplicatedTrace, &WeaponNetId), Changed<ReplicatedTrace>>,
    mut out: EventWriter<TraceReplicated>,
) {
    for (replicated, net_id) in changed.iter() {
        let Some(trace) = replicated.latest else {
            continue; // свежезаспавненный компонент без выстрелов
        };

        out.write(TraceReplicated {
            net_id: *net_id,
            trace,
            version: replicated.version,
        });
    }
}

/// Система: cosmetic replay на observer-репликах
///
/// Чистая презентация: тот же путь эффектов, что у authority (fire + impact),
/// но ни урона, ни ammo. Version stamp защищает от повторного replay.
pub fn replay_trace_on_observers(
    mut events: EventReader<TraceReplicated>,
    mut observers: Query<
        (
            Entity,
            &HitscanWeapon,
            &NetRole,
            &WeaponNetId,
            &mut LastReplayedVersion,
        ),
        Without<LocallyControlled>,
    >,
    controllers: Query<&ControllerId>,
    mut fx: FxEmitters,
) {
    for event in events.read() {
        for (entity, weapon, role, net_id, mut replayed) in observers.iter_mut() {
            if *role != NetRole::SimulatedProxy || *net_id != event.net_id {
                continue;
            }

            if event.version <= replayed.0 {
                continue; // уже отыграно
            }
            replayed.0 = event.version;

            let controller = controllers.get(weapon.wielder).ok().copied();
            play_fire_effects(&mut fx, entity, &weapon.config, controller, event.trace.trace_to);
            play_impact_effects(&mut fx, entity, event.trace.surface, event.trace.trace_to);

            log(&format!(
                "Replayed trace v{} on observer {:?}",
                event.version, entity
            ));
        }
    }
}

/// Регистрирует replication события + config
pub struct ReplicationPlugin;

impl Plugin for ReplicationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ReplicationConfig>()
            .add_event::<ServerFireRequest>()
            .add_event::<AuthorityFire>()
            .add_event::<TraceReplicated>();
    }
}
