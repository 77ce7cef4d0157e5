//! Weapon domain — hitscan weapon core
//!
//! Содержит:
//! - state (config, ammo clip, reload state machine)
//! - fire (cadence scheduler + попытка выстрела)
//! - reload (completion timer + перенос патронов)
//! - spread (конус разброса)
//! - raycast (hitscan trace)

use bevy::prelude::*;

pub mod fire;
pub mod raycast;
pub mod reload;
pub mod spread;
pub mod state;

// Re-export основных типов
pub use fire::{fire_weapons, first_cadence_delay, process_fire_control, StartFireIntent, StopFireIntent};
pub use raycast::{cast_hitscan_ray, ray_sphere_intersect, RayHit};
pub use reload::{begin_reload, finish_reloads, process_reload_intents, ReloadIntent, FALLBACK_RELOAD_SECS};
pub use spread::deviate_uniform_cone;
pub use state::{AmmoClip, HitscanWeapon, ReloadPhase, WeaponConfig, NEVER_FIRED};

/// Регистрирует weapon интенты (системы — в SimulationPlugin chain)
pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StartFireIntent>()
            .add_event::<StopFireIntent>()
            .add_event::<ReloadIntent>();
    }
}
