//! Ray/primitive intersection for the shape set the description layer
//! supports: boxes, spheres, capsules and the ground plane.

use kinema_ir::ShapeGeometry;
use nalgebra::{Isometry3, Point3, Unit, Vector3};

const T_EPS: f64 = 1e-9;

/// A ray in 3D space defined by origin and unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3<f64>,
    /// Unit direction of the ray.
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    /// Create a ray; the direction is normalized.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: Unit::new_normalize(direction),
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + t * self.direction.as_ref()
    }
}

/// The nearest forward intersection of a ray with a surface.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Parameter along the ray where the intersection occurs.
    pub t: f64,
    /// Outward surface normal at the intersection, in world space.
    pub normal: Unit<Vector3<f64>>,
}

/// Intersect a ray with a primitive placed at a world pose.
///
/// Returns the nearest hit with `t > 0`, if any.
pub fn intersect_shape(
    ray: &Ray,
    geometry: &ShapeGeometry,
    pose: &Isometry3<f64>,
) -> Option<Hit> {
    // Work in the shape's local frame, map the normal back out.
    let inverse = pose.inverse();
    let local = Ray {
        origin: inverse * ray.origin,
        direction: Unit::new_unchecked(inverse * ray.direction.into_inner()),
    };

    let (t, local_normal) = match *geometry {
        ShapeGeometry::Sphere { radius } => sphere_hit(&local, radius, Point3::origin())?,
        ShapeGeometry::Box { half_extents } => box_hit(&local, half_extents)?,
        ShapeGeometry::Capsule {
            radius,
            half_length,
        } => capsule_hit(&local, radius, half_length)?,
    };

    Some(Hit {
        t,
        normal: Unit::new_normalize(pose * local_normal),
    })
}

/// Intersect a ray with the ground plane `z = altitude`.
pub fn intersect_ground(ray: &Ray, altitude: f64) -> Option<Hit> {
    let dz = ray.direction.z;
    if dz.abs() < T_EPS {
        return None;
    }
    let t = (altitude - ray.origin.z) / dz;
    if t <= T_EPS {
        return None;
    }
    Some(Hit {
        t,
        normal: Vector3::z_axis(),
    })
}

/// Quadratic ray/sphere test around an arbitrary local center.
fn sphere_hit(ray: &Ray, radius: f64, center: Point3<f64>) -> Option<(f64, Vector3<f64>)> {
    let oc = ray.origin - center;
    let d = ray.direction.as_ref();

    let b = 2.0 * oc.dot(d);
    let c = oc.dot(&oc) - radius * radius;
    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t = [(-b - sqrt_disc) / 2.0, (-b + sqrt_disc) / 2.0]
        .into_iter()
        .find(|&t| t > T_EPS)?;
    let normal = (ray.at(t) - center) / radius;
    Some((t, normal))
}

/// Slab-method ray/box test.
fn box_hit(ray: &Ray, half_extents: [f64; 3]) -> Option<(f64, Vector3<f64>)> {
    let mut t_min = f64::NEG_INFINITY;
    let mut t_max = f64::INFINITY;
    let mut entry_axis = 0usize;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        let h = half_extents[axis];

        if d.abs() < T_EPS {
            if o.abs() > h {
                return None;
            }
            continue;
        }

        let mut t1 = (-h - o) / d;
        let mut t2 = (h - o) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_min {
            t_min = t1;
            entry_axis = axis;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    if t_max <= T_EPS {
        return None;
    }
    // Inside the box: surface is behind the entry slab, use the exit.
    let t = if t_min > T_EPS { t_min } else { t_max };

    let point = ray.at(t);
    let mut normal = Vector3::zeros();
    normal[entry_axis] = point[entry_axis].signum();
    Some((t, normal))
}

/// Ray/capsule test: cylindrical body along z plus two sphere caps.
fn capsule_hit(ray: &Ray, radius: f64, half_length: f64) -> Option<(f64, Vector3<f64>)> {
    let mut best: Option<(f64, Vector3<f64>)> = None;
    let mut consider = |candidate: Option<(f64, Vector3<f64>)>| {
        if let Some((t, n)) = candidate {
            if best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, n));
            }
        }
    };

    // Infinite cylinder |(o + t d).xy| = r, clipped to |z| <= half_length.
    let (ox, oy) = (ray.origin.x, ray.origin.y);
    let (dx, dy) = (ray.direction.x, ray.direction.y);
    let a = dx * dx + dy * dy;
    if a > T_EPS {
        let b = 2.0 * (ox * dx + oy * dy);
        let c = ox * ox + oy * oy - radius * radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant >= 0.0 {
            let sqrt_disc = discriminant.sqrt();
            for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
                if t > T_EPS {
                    let point = ray.at(t);
                    if point.z.abs() <= half_length {
                        let normal = Vector3::new(point.x, point.y, 0.0) / radius;
                        consider(Some((t, normal)));
                        break;
                    }
                }
            }
        }
    }

    consider(sphere_hit(ray, radius, Point3::new(0.0, 0.0, half_length)));
    consider(sphere_hit(ray, radius, Point3::new(0.0, 0.0, -half_length)));
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_through_center() {
        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vector3::x());
        let hit = intersect_shape(
            &ray,
            &ShapeGeometry::Sphere { radius: 5.0 },
            &Isometry3::identity(),
        )
        .unwrap();
        assert_relative_eq!(hit.t, 5.0, epsilon = 1e-10);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(Point3::new(-10.0, 10.0, 0.0), Vector3::x());
        assert!(intersect_shape(
            &ray,
            &ShapeGeometry::Sphere { radius: 5.0 },
            &Isometry3::identity()
        )
        .is_none());
    }

    #[test]
    fn test_sphere_at_offset_pose() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vector3::z());
        let pose = Isometry3::translation(0.0, 0.0, 2.0);
        let hit =
            intersect_shape(&ray, &ShapeGeometry::Sphere { radius: 1.0 }, &pose).unwrap();
        assert_relative_eq!(hit.t, 7.0, epsilon = 1e-10);
        assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_box_face_and_normal() {
        let ray = Ray::new(Point3::new(-5.0, 0.1, 0.2), Vector3::x());
        let hit = intersect_shape(
            &ray,
            &ShapeGeometry::Box {
                half_extents: [1.0, 0.5, 0.25],
            },
            &Isometry3::identity(),
        )
        .unwrap();
        assert_relative_eq!(hit.t, 4.0, epsilon = 1e-10);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_box_from_inside_hits_exit() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::x());
        let hit = intersect_shape(
            &ray,
            &ShapeGeometry::Box {
                half_extents: [1.0, 1.0, 1.0],
            },
            &Isometry3::identity(),
        )
        .unwrap();
        assert_relative_eq!(hit.t, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_capsule_body_and_cap() {
        let capsule = ShapeGeometry::Capsule {
            radius: 0.5,
            half_length: 1.0,
        };
        // Hits the cylindrical body.
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.5), Vector3::x());
        let hit = intersect_shape(&ray, &capsule, &Isometry3::identity()).unwrap();
        assert_relative_eq!(hit.t, 4.5, epsilon = 1e-10);
        assert_relative_eq!(hit.normal.z, 0.0, epsilon = 1e-10);

        // Hits the top cap.
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vector3::z());
        let hit = intersect_shape(&ray, &capsule, &Isometry3::identity()).unwrap();
        assert_relative_eq!(hit.t, 3.5, epsilon = 1e-10);
        assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ground_plane() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vector3::new(1.0, 0.0, -1.0));
        let hit = intersect_ground(&ray, 0.0).unwrap();
        assert_relative_eq!(ray.at(hit.t).z, 0.0, epsilon = 1e-10);

        // Parallel ray never hits.
        let ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vector3::x());
        assert!(intersect_ground(&ray, 0.0).is_none());
    }
}
