//! Bullet spread — равномерное отклонение в конусе
//!
//! Единственный рандомизированный шаг выстрела; принимает rng снаружи,
//! чтобы вся последовательность была воспроизводима по seed.

use bevy::prelude::*;
use rand::Rng;

/// Отклонить направление равномерно внутри конуса с half-angle в градусах
///
/// Равномерность по solid angle (не по углу): cos(theta) сэмплится линейно
/// между cos(half_angle) и 1. Нулевой (или отрицательный) угол — identity.
pub fn deviate_uniform_cone(direction: Vec3, half_angle_deg: f32, rng: &mut impl Rng) -> Vec3 {
    let direction = direction.normalize();
    if half_angle_deg <= 0.0 {
        return direction;
    }

    let cos_max = half_angle_deg.to_radians().cos();

    let u: f32 = rng.gen();
    let v: f32 = rng.gen();

    let cos_theta = 1.0 - u * (1.0 - cos_max);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = v * std::f32::consts::TAU;

    let (tangent, bitangent) = direction.any_orthonormal_pair();

    direction * cos_theta + (tangent * phi.cos() + bitangent * phi.sin()) * sin_theta
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zero_spread_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let dir = Vec3::new(0.0, 0.0, -1.0);
        assert_eq!(deviate_uniform_cone(dir, 0.0, &mut rng), dir);
    }

    #[test]
    fn test_deviation_stays_inside_cone() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let dir = Vec3::new(1.0, 0.0, 0.0);
        let half_angle = 5.0_f32;
        let cos_max = half_angle.to_radians().cos();

        for _ in 0..1000 {
            let sampled = deviate_uniform_cone(dir, half_angle, &mut rng);
            // Небольшой epsilon на float ошибку базиса
            assert!(sampled.dot(dir) >= cos_max - 1e-5);
        }
    }

    #[test]
    fn test_result_stays_normalized() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let sampled = deviate_uniform_cone(Vec3::new(0.3, 0.5, -0.8), 30.0, &mut rng);
            assert!((sampled.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let dir = Vec3::Z;
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..20 {
            assert_eq!(
                deviate_uniform_cone(dir, 2.0, &mut a),
                deviate_uniform_cone(dir, 2.0, &mut b)
            );
        }
    }
}
