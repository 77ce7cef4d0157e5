//! Cosmetic effects — presentation boundary
//!
//! Core стреляет событиями fire-and-forget; рендер/аудио слой на той стороне
//! границы исполняет их и НИКОГДА не отвечает обратно. Единственное
//! исключение — длительность reload montage, которую gameplay использует как
//! таймер завершения перезарядки (и 1.5s fallback, если montage нет).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{ControllerId, SurfaceKind};
use crate::weapon::WeaponConfig;

/// Muzzle flash на socket'е оружия
#[derive(Event, Debug, Clone)]
pub struct MuzzleFlashFx {
    pub weapon: Entity,
    pub socket: String,
}

/// Tracer от дула к конечной точке trace
#[derive(Event, Debug, Clone)]
pub struct TracerFx {
    pub weapon: Entity,
    /// Имя векторного параметра particle-системы
    pub target_param: String,
    pub target_point: Vec3,
}

/// Какой impact-эффект проигрывать
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactVisual {
    Flesh,
    Default,
}

/// Выбор impact-эффекта по surface kind
///
/// Оба flesh-варианта делят один эффект; урон они при этом дают разный —
/// выбор visual'а и damage множитель независимы.
pub fn select_impact_visual(kind: SurfaceKind) -> ImpactVisual {
    match kind {
        SurfaceKind::FleshDefault | SurfaceKind::FleshVulnerable => ImpactVisual::Flesh,
        SurfaceKind::Default => ImpactVisual::Default,
    }
}

/// Impact-эффект в точке попадания
#[derive(Event, Debug, Clone)]
pub struct ImpactFx {
    pub weapon: Entity,
    pub point: Vec3,
    pub visual: ImpactVisual,
}

/// Camera shake контроллеру wielder'а
#[derive(Event, Debug, Clone, Copy)]
pub struct CameraShakeFx {
    pub controller: ControllerId,
}

/// Звуковые cues оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Fire,
    Reload,
}

#[derive(Event, Debug, Clone)]
pub struct SoundCueFx {
    pub weapon: Entity,
    pub cue: SoundCue,
}

/// Анимации оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MontageCue {
    Reload,
}

/// Montage запущен; `duration_secs` — отрепортованная длительность
#[derive(Event, Debug, Clone)]
pub struct MontageStarted {
    pub weapon: Entity,
    pub montage: MontageCue,
    pub duration_secs: f32,
}

#[derive(Event, Debug, Clone)]
pub struct MontageStopped {
    pub weapon: Entity,
    pub montage: MontageCue,
}

/// Montage asset с отрепортованной длительностью
#[derive(Debug, Clone, Copy)]
pub struct Montage {
    pub duration_secs: f32,
}

/// Набор анимаций, привязанных к оружию
///
/// None = у этого оружия montage не назначен (перезарядка идёт по fallback).
#[derive(Component, Debug, Clone, Default)]
pub struct WeaponAnimations {
    pub reload_montage: Option<Montage>,
}

/// Debug-рисование trace-линий (аналог консольной переменной)
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct DebugWeaponDrawing(pub bool);

/// Полная линия луча для debug-отрисовки
#[derive(Event, Debug, Clone, Copy)]
pub struct DebugTraceLine {
    pub from: Vec3,
    pub to: Vec3,
}

/// Все fx-каналы одним SystemParam (их шесть, в сигнатурах систем тесно)
#[derive(SystemParam)]
pub struct FxEmitters<'w> {
    pub muzzle: EventWriter<'w, MuzzleFlashFx>,
    pub tracer: EventWriter<'w, TracerFx>,
    pub impact: EventWriter<'w, ImpactFx>,
    pub shake: EventWriter<'w, CameraShakeFx>,
    pub sound: EventWriter<'w, SoundCueFx>,
    pub montage_started: EventWriter<'w, MontageStarted>,
    pub montage_stopped: EventWriter<'w, MontageStopped>,
    pub debug_lines: EventWriter<'w, DebugTraceLine>,
}

/// Полный набор эффектов выстрела: muzzle flash, tracer, camera shake
///
/// Используется и при локальном выстреле, и при cosmetic replay у observer'ов.
pub fn play_fire_effects(
    fx: &mut FxEmitters,
    weapon: Entity,
    config: &WeaponConfig,
    controller: Option<ControllerId>,
    trace_end: Vec3,
) {
    fx.muzzle.write(MuzzleFlashFx {
        weapon,
        socket: config.muzzle_socket.clone(),
    });

    fx.tracer.write(TracerFx {
        weapon,
        target_param: config.tracer_target_param.clone(),
        target_point: trace_end,
    });

    if let Some(controller) = controller {
        fx.shake.write(CameraShakeFx { controller });
    }
}

/// Impact-эффект, выбранный по surface kind
pub fn play_impact_effects(fx: &mut FxEmitters, weapon: Entity, surface: SurfaceKind, point: Vec3) {
    fx.impact.write(ImpactFx {
        weapon,
        point,
        visual: select_impact_visual(surface),
    });
}

/// Регистрирует fx события + debug drawing flag
pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugWeaponDrawing>()
            .add_event::<MuzzleFlashFx>()
            .add_event::<TracerFx>()
            .add_event::<ImpactFx>()
            .add_event::<CameraShakeFx>()
            .add_event::<SoundCueFx>()
            .add_event::<MontageStarted>()
            .add_event::<MontageStopped>()
            .add_event::<DebugTraceLine>();
    }
}
