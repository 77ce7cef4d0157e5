//! Headless демо: wielder расстреливает клип по мишени
//!
//! Запускает симуляцию фиксированными тиками (60Hz) без рендера — авто-reload
//! и replication видны в логе.

use bevy::prelude::*;

use ironsight_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting IRONSIGHT headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    // Сцена: стрелок + vulnerable мишень в 20m по направлению взгляда (-Z)
    let (wielder, weapon, target) = {
        let mut commands = app.world_mut().commands();
        let wielder = spawn_wielder(&mut commands, Vec3::ZERO, 1);
        let target = spawn_target_dummy(
            &mut commands,
            Vec3::new(0.0, 1.6, -20.0),
            1.0,
            SurfaceKind::FleshVulnerable,
        );

        let weapon = commands
            .spawn((
                HitscanWeapon::new(WeaponConfig::default(), wielder),
                NetRole::Authority,
                WeaponNetId(1),
                ReplicatedTrace::default(),
                WeaponAnimations::default(),
            ))
            .id();

        (wielder, weapon, target)
    };
    app.world_mut().flush();

    app.world_mut().send_event(EquipWeaponIntent { wielder, weapon });
    app.world_mut().send_event(StartFireIntent { weapon });

    // 5 секунд симуляции: клип пустеет, авто-reload, стрельба продолжается
    for tick in 0..300 {
        app.world_mut().run_schedule(FixedUpdate);

        if tick % 60 == 0 {
            let world = app.world();
            let ammo = world
                .get::<HitscanWeapon>(weapon)
                .map(|w| (w.current_ammo_in_clip(), w.current_ammo()))
                .unwrap_or((0, 0));
            let health = world.get::<Health>(target).map(|h| h.current).unwrap_or(0);
            println!(
                "Tick {}: clip {}/{} reserve {}, target health {}",
                tick,
                ammo.0,
                WeaponConfig::default().clip_size,
                ammo.1,
                health
            );
        }
    }

    println!("Simulation complete!");
}
