//! Pointer hit testing against a triangle mesh.
//!
//! Hosts usually own their picking (physics scenes, GPU id buffers) and can
//! implement [`HitTester`] directly. [`MeshRaycaster`] is a CPU fallback
//! that unprojects the pointer through a camera and finds the frontmost
//! triangle with the Moller-Trumbore algorithm.

use glam::{Affine3A, Mat4, Vec2, Vec3};

use crate::mesh_buffer::MeshBuffer;
use crate::types::{FaceId, ObjectId};

/// Determinant below which a ray counts as parallel to a triangle
const PARALLEL_EPSILON: f32 = 1e-6;

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` if `direction` has no usable length
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the point where this ray crosses the triangle `[a, b, c]`.
    ///
    /// Moller-Trumbore: solves `origin + t * direction = a + u * (b - a) +
    /// v * (c - a)` by Cramer's rule. Hits behind the origin, edge-on
    /// triangles and degenerate triangles report nothing.
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<f32> {
        let ab = b - a;
        let ac = c - a;
        let p = self.direction.cross(ac);
        let det = ab.dot(p);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = det.recip();
        let to_origin = self.origin - a;
        let u = to_origin.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = to_origin.cross(ab);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = ac.dot(q) * inv_det;
        (t >= PARALLEL_EPSILON).then_some(t)
    }

    /// This ray expressed in the space `transform` maps into
    pub fn transformed(&self, transform: &Affine3A) -> Option<Self> {
        Self::new(
            transform.transform_point3(self.origin),
            transform.transform_vector3(self.direction),
        )
    }
}

/// Frontmost triangle hit in mesh-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit {
    pub face: FaceId,
    /// Distance along the ray
    pub distance: f32,
    /// Intersection point
    pub point: Vec3,
}

/// Frontmost triangle of `mesh` hit by `ray`.
pub fn raycast_mesh(mesh: &MeshBuffer, ray: &Ray) -> Option<FaceHit> {
    let mut closest: Option<FaceHit> = None;

    for face in mesh.face_ids() {
        let Some(distance) = mesh
            .triangle_positions(face)
            .and_then(|corners| ray.intersect_triangle(corners))
        else {
            continue;
        };
        if closest.is_none_or(|c| distance < c.distance) {
            closest = Some(FaceHit {
                face,
                distance,
                point: ray.at(distance),
            });
        }
    }

    closest
}

/// Viewport camera used to turn pointer positions into world rays.
///
/// The projection must map depth to `[0, 1]` with the near plane at 0, as
/// `Mat4::perspective_rh` and `Mat4::orthographic_rh` do.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    inverse_view_projection: Mat4,
    viewport: Vec2,
}

impl Camera {
    /// `view` maps world to camera space; `viewport` is in pixels
    pub fn new(view: Mat4, projection: Mat4, viewport: Vec2) -> Self {
        Self {
            inverse_view_projection: (projection * view).inverse(),
            viewport,
        }
    }

    /// World-space ray through a pointer position (pixels, origin top-left)
    pub fn viewport_to_ray(&self, pointer: Vec2) -> Option<Ray> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }

        let ndc = Vec2::new(
            pointer.x / self.viewport.x * 2.0 - 1.0,
            1.0 - pointer.y / self.viewport.y * 2.0,
        );
        let near = self.inverse_view_projection.project_point3(ndc.extend(0.0));
        let far = self.inverse_view_projection.project_point3(ndc.extend(1.0));
        if !near.is_finite() || !far.is_finite() {
            return None;
        }
        Ray::new(near, far - near)
    }
}

/// A face picked under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub object: ObjectId,
    pub face: FaceId,
    pub distance: f32,
}

/// Pointer → frontmost (object, face) under it.
///
/// `mesh` is the session's working mesh. Testers backed by their own scene
/// data may ignore it.
pub trait HitTester {
    fn hit_test(&self, pointer: Vec2, mesh: &MeshBuffer) -> Option<SurfaceHit>;
}

impl<F> HitTester for F
where
    F: Fn(Vec2, &MeshBuffer) -> Option<SurfaceHit>,
{
    fn hit_test(&self, pointer: Vec2, mesh: &MeshBuffer) -> Option<SurfaceHit> {
        self(pointer, mesh)
    }
}

/// CPU hit tester for a single object.
#[derive(Debug, Clone, Copy)]
pub struct MeshRaycaster {
    pub camera: Camera,
    pub object: ObjectId,
    /// Object to world transform
    pub transform: Affine3A,
}

impl MeshRaycaster {
    pub fn new(camera: Camera, object: ObjectId, transform: Affine3A) -> Self {
        Self {
            camera,
            object,
            transform,
        }
    }
}

impl HitTester for MeshRaycaster {
    fn hit_test(&self, pointer: Vec2, mesh: &MeshBuffer) -> Option<SurfaceHit> {
        let world_ray = self.camera.viewport_to_ray(pointer)?;
        let local_ray = world_ray.transformed(&self.transform.inverse())?;
        let hit = raycast_mesh(mesh, &local_ray)?;

        // Report world-space distance so hits compare across objects
        let world_point = self.transform.transform_point3(hit.point);
        Some(SurfaceHit {
            object: self.object,
            face: hit.face,
            distance: world_point.distance(world_ray.origin),
        })
    }
}
