//! Hitscan ray resolution против сферических hit volumes
//!
//! Явная ray/sphere математика вместо полного physics pipeline: trace одного
//! луча по небольшому набору volumes дешевле и полностью детерминирован.

use bevy::prelude::*;

/// Результат trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    /// Дистанция от origin до точки попадания
    pub distance: f32,
    /// Точка попадания (world space)
    pub point: Vec3,
}

/// Ближайшее неотрицательное пересечение луча со сферой
///
/// `direction` должен быть нормализован. Возвращает дистанцию вдоль луча.
/// Луч изнутри сферы попадает в её дальнюю стенку.
pub fn ray_sphere_intersect(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    if near >= 0.0 {
        return Some(near);
    }

    let far = -b + sqrt_d;
    if far >= 0.0 {
        return Some(far);
    }

    None
}

/// Trace луча по кандидатам `(entity, center, radius)`, ближайшее попадание
///
/// Entities из `ignore` пропускаются (стрелок и само оружие не являются
/// целями собственного выстрела).
pub fn cast_hitscan_ray(
    origin: Vec3,
    direction: Vec3,
    max_range: f32,
    ignore: &[Entity],
    candidates: impl IntoIterator<Item = (Entity, Vec3, f32)>,
) -> Option<RayHit> {
    let mut closest: Option<RayHit> = None;

    for (entity, center, radius) in candidates {
        if ignore.contains(&entity) {
            continue;
        }

        let Some(distance) = ray_sphere_intersect(origin, direction, center, radius) else {
            continue;
        };

        if distance > max_range {
            continue;
        }

        let replace = match &closest {
            Some(hit) => distance < hit.distance,
            None => true,
        };

        if replace {
            closest = Some(RayHit {
                entity,
                distance,
                point: origin + direction * distance,
            });
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_hit_distance() {
        // Сфера радиуса 1 в 10m по лучу → попадание на 9m
        let t = ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert_eq!(t, Some(9.0));
    }

    #[test]
    fn test_miss_off_axis() {
        let t = ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::new(10.0, 5.0, 0.0), 1.0);
        assert_eq!(t, None);
    }

    #[test]
    fn test_sphere_behind_origin_misses() {
        let t = ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::new(-10.0, 0.0, 0.0), 1.0);
        assert_eq!(t, None);
    }

    #[test]
    fn test_origin_inside_sphere_hits_far_wall() {
        let t = ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::ZERO, 2.0);
        assert_eq!(t, Some(2.0));
    }

    #[test]
    fn test_nearest_of_two_wins() {
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);

        let hit = cast_hitscan_ray(
            Vec3::ZERO,
            Vec3::X,
            100.0,
            &[],
            vec![
                (far, Vec3::new(50.0, 0.0, 0.0), 1.0),
                (near, Vec3::new(10.0, 0.0, 0.0), 1.0),
            ],
        )
        .unwrap();

        assert_eq!(hit.entity, near);
        assert_eq!(hit.distance, 9.0);
        assert_eq!(hit.point, Vec3::new(9.0, 0.0, 0.0));
    }

    #[test]
    fn test_ignore_set_skips_shooter() {
        let shooter = Entity::from_raw(1);
        let hit = cast_hitscan_ray(
            Vec3::ZERO,
            Vec3::X,
            100.0,
            &[shooter],
            vec![(shooter, Vec3::new(10.0, 0.0, 0.0), 1.0)],
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_max_range_cutoff() {
        let target = Entity::from_raw(1);
        let hit = cast_hitscan_ray(
            Vec3::ZERO,
            Vec3::X,
            5.0,
            &[],
            vec![(target, Vec3::new(10.0, 0.0, 0.0), 1.0)],
        );
        assert!(hit.is_none());
    }
}
