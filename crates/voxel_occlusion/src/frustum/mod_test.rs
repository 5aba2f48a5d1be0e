use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

fn looking_down_neg_z() -> Frustum {
  let proj = Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, 0.1, 1000.0);
  Frustum::from_view_projection(proj, DVec3::ZERO)
}

/// Point inside left/right/bottom/top/near in clip space.
fn clip_inside(vp: Mat4, p: Vec3) -> bool {
  let c = vp * p.extend(1.0);
  c.x.abs() < c.w && c.y.abs() < c.w && c.z > -c.w
}

#[test]
fn test_planes_are_normalized() {
  let frustum = looking_down_neg_z();
  for plane in frustum.planes() {
    assert!((plane.normal.length() - 1.0).abs() < 1e-5);
    assert!((plane.abs_sum - plane.abs_normal.element_sum()).abs() < 1e-6);
  }
  // Near plane: z <= -near
  let near = frustum.planes()[4];
  assert!((near.normal - Vec3::NEG_Z).length() < 1e-5);
  assert!((near.distance + 0.1).abs() < 1e-4);
}

#[test]
fn test_box_inside_is_visible() {
  let frustum = looking_down_neg_z();
  assert!(frustum.cube_in_frustum(Vec3::new(-1.0, -1.0, -11.0), Vec3::new(1.0, 1.0, -9.0)));
}

#[test]
fn test_box_outside_one_plane_is_rejected() {
  let frustum = looking_down_neg_z();
  // Behind the camera
  assert!(!frustum.cube_in_frustum(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 7.0)));
  // Far left of the 90° cone
  assert!(!frustum.cube_in_frustum(Vec3::new(-100.0, -1.0, -11.0), Vec3::new(-90.0, 1.0, -9.0)));
  // Above
  assert!(!frustum.cube_in_frustum(Vec3::new(-1.0, 50.0, -11.0), Vec3::new(1.0, 60.0, -9.0)));
}

#[test]
fn test_straddling_box_is_visible() {
  let frustum = looking_down_neg_z();
  // Crosses the left plane
  assert!(frustum.cube_in_frustum(Vec3::new(-20.0, -1.0, -11.0), Vec3::new(0.0, 1.0, -9.0)));
  // Contains the camera
  assert!(frustum.cube_in_frustum(Vec3::splat(-1.0), Vec3::splat(1.0)));
}

#[test]
fn test_region_visibility() {
  let proj = Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, 0.1, 1000.0);
  let frustum = Frustum::from_view_projection(proj, DVec3::splat(8.0));

  assert!(frustum.is_region_visible(IVec3::ZERO), "camera region");
  assert!(frustum.is_region_visible(IVec3::new(0, 0, -5)));
  assert!(!frustum.is_region_visible(IVec3::new(0, 0, 5)));
  assert!(!frustum.is_region_visible(IVec3::new(-20, 0, -5)));

  // Block-box form agrees on the clear cases
  assert!(frustum.is_block_box_visible(IVec3::new(0, 0, -80), IVec3::new(16, 16, -64)));
  assert!(!frustum.is_block_box_visible(IVec3::new(0, 0, 80), IVec3::new(16, 16, 96)));
}

#[test]
fn test_no_false_negatives_on_random_boxes() {
  let mut rng = StdRng::seed_from_u64(5);
  let proj = Mat4::perspective_rh_gl(70f32.to_radians(), 16.0 / 9.0, 0.05, 500.0);
  let view = Mat4::from_rotation_x(0.3) * Mat4::from_rotation_y(-1.1);
  let vp = proj * view;
  let frustum = Frustum::from_view_projection(vp, DVec3::ZERO);

  for _ in 0..2000 {
    let min = Vec3::new(
      rng.random_range(-60.0..60.0),
      rng.random_range(-60.0..60.0),
      rng.random_range(-60.0..60.0),
    );
    let size = Vec3::new(
      rng.random_range(0.5..20.0),
      rng.random_range(0.5..20.0),
      rng.random_range(0.5..20.0),
    );
    let max = min + size;

    let any_inside = (0..32).any(|i| {
      let t = if i < 8 {
        Vec3::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32)
      } else {
        Vec3::new(rng.random(), rng.random(), rng.random())
      };
      clip_inside(vp, min + size * t)
    });

    if any_inside {
      assert!(frustum.cube_in_frustum(min, max), "false negative for {:?}..{:?}", min, max);
    }
  }
}

#[test]
fn test_region_test_has_no_false_negatives() {
  let mut rng = StdRng::seed_from_u64(6);
  let proj = Mat4::perspective_rh_gl(70f32.to_radians(), 1.5, 0.05, 2000.0);
  let view = Mat4::from_rotation_y(0.7);
  let position = DVec3::new(1000.5, 70.25, -3000.75);
  let frustum = Frustum::from_view_projection(proj * view, position);

  for _ in 0..1000 {
    let region = IVec3::new(
      rng.random_range(-8..8) + 62,
      rng.random_range(-8..8) + 4,
      rng.random_range(-8..8) - 188,
    );
    let min = frustum.relative(region_center(region)) - Vec3::splat(HALF_REGION);
    let any_inside = (0..27).any(|i| {
      let t = Vec3::new((i % 3) as f32, ((i / 3) % 3) as f32, (i / 9) as f32) * 8.0;
      clip_inside(proj * view, min + t)
    });
    if any_inside {
      assert!(frustum.is_region_visible(region), "false negative for region {:?}", region);
    }
  }
}
