use crate::timer::FrameTime;
use glam::{Mat4, Quat, Vec3};
use roomfly_common::{RoomBounds, Transform};
use std::f32::consts::TAU;

/// Primitive shapes the scene is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    /// Box seen from the inside; the room itself.
    RoomBox,
    Cube,
    Sphere,
    Torus,
}

/// How an object's rotation changes over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Static,
    /// Rocks about Z by `cos(total)` radians.
    SwingZ,
    /// Spins about Y at `rate` radians per second.
    SpinY { rate: f32 },
}

/// One drawable object.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub shape: Shape,
    pub base: Transform,
    pub motion: Motion,
    pub color: [f32; 4],
}

/// Hand-authored animation variables advanced once per step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Animation {
    /// Rotation about Z for swinging objects.
    pub swing_angle: f32,
    /// Extra pixels the HUD reticle arms sit away from the center.
    pub reticle_displacement: f32,
}

/// Peak reticle displacement in pixels.
pub const RETICLE_PULSE_PIXELS: f32 = 6.0;

/// Reticle pulses per second.
pub const RETICLE_PULSE_RATE: f32 = 1.5;

/// The fixed demo scene.
#[derive(Debug, Clone)]
pub struct Scene {
    room: RoomBounds,
    objects: Vec<SceneObject>,
    /// Spin about Y per object, wrapped into `[0, 2π)`.
    spins: Vec<f32>,
    animation: Animation,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(RoomBounds::default())
    }
}

impl Scene {
    /// Room box, a swinging sphere, a spinning torus and a few static props.
    pub fn new(room: RoomBounds) -> Self {
        let floor = -room.extents.y * 0.5;
        let objects = vec![
            SceneObject {
                name: "room",
                shape: Shape::RoomBox,
                base: Transform {
                    scale: room.extents,
                    ..Transform::default()
                },
                motion: Motion::Static,
                color: [0.85, 0.82, 0.75, 1.0],
            },
            SceneObject {
                name: "sphere",
                shape: Shape::Sphere,
                base: Transform::default(),
                motion: Motion::SwingZ,
                color: [0.3, 0.55, 1.0, 1.0],
            },
            SceneObject {
                name: "torus",
                shape: Shape::Torus,
                base: Transform::from_position(Vec3::new(3.0, -1.5, 5.0)),
                motion: Motion::SpinY { rate: 0.8 },
                color: [1.0, 0.55, 0.1, 1.0],
            },
            SceneObject {
                name: "pedestal",
                shape: Shape::Cube,
                base: Transform {
                    position: Vec3::new(-4.0, floor + 1.0, 6.0),
                    scale: Vec3::new(1.5, 2.0, 1.5),
                    ..Transform::default()
                },
                motion: Motion::Static,
                color: [0.6, 0.6, 0.6, 1.0],
            },
            SceneObject {
                name: "column",
                shape: Shape::Cube,
                base: Transform {
                    position: Vec3::new(0.0, 0.0, -9.0),
                    scale: Vec3::new(1.0, room.extents.y, 1.0),
                    ..Transform::default()
                },
                motion: Motion::Static,
                color: [0.75, 0.72, 0.68, 1.0],
            },
            SceneObject {
                name: "crate",
                shape: Shape::Cube,
                base: Transform {
                    position: Vec3::new(5.0, floor + 0.5, -4.0),
                    rotation: Quat::from_rotation_y(0.4),
                    ..Transform::default()
                },
                motion: Motion::Static,
                color: [0.55, 0.35, 0.2, 1.0],
            },
        ];
        Self {
            room,
            spins: vec![0.0; objects.len()],
            objects,
            animation: Animation::default(),
        }
    }

    pub fn room(&self) -> &RoomBounds {
        &self.room
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Advance the animation variables to `time`.
    pub fn step(&mut self, time: &FrameTime) {
        self.animation.swing_angle = time.total.cos();
        for (object, spin) in self.objects.iter().zip(&mut self.spins) {
            if let Motion::SpinY { rate } = object.motion {
                *spin = (*spin + time.elapsed * rate).rem_euclid(TAU);
            }
        }
        self.animation.reticle_displacement =
            RETICLE_PULSE_PIXELS * (time.total * RETICLE_PULSE_RATE * TAU).sin().abs();
    }

    /// Current spin about Y of the object at `index`.
    pub fn spin(&self, index: usize) -> Option<f32> {
        self.spins.get(index).copied()
    }

    /// Current world matrix of the object at `index`.
    pub fn world_matrix(&self, index: usize) -> Option<Mat4> {
        let object = self.objects.get(index)?;
        let spin = match object.motion {
            Motion::Static => Quat::IDENTITY,
            Motion::SwingZ => Quat::from_rotation_z(self.animation.swing_angle),
            Motion::SpinY { .. } => Quat::from_rotation_y(self.spins[index]),
        };
        let t = object.base;
        Some(
            Transform {
                rotation: spin * t.rotation,
                ..t
            }
            .matrix(),
        )
    }

    /// Objects paired with their current world matrices.
    pub fn instances(&self) -> impl Iterator<Item = (&SceneObject, Mat4)> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| Some((o, self.world_matrix(i)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(scene: &Scene, shape: Shape) -> usize {
        scene.objects().iter().position(|o| o.shape == shape).unwrap()
    }

    fn at(total: f32, elapsed: f32) -> FrameTime {
        FrameTime {
            elapsed,
            total,
            frame: 1,
        }
    }

    #[test]
    fn default_scene_layout() {
        let scene = Scene::default();
        assert_eq!(scene.objects()[0].shape, Shape::RoomBox);
        assert_eq!(scene.objects()[0].base.scale, Vec3::new(16.0, 12.0, 24.0));
        assert!(scene.objects().iter().any(|o| o.shape == Shape::Torus));
        assert!(scene.objects().iter().any(|o| o.shape == Shape::Sphere));
    }

    #[test]
    fn props_sit_inside_the_room() {
        let scene = Scene::default();
        let half = scene.room().extents * 0.5;
        for o in scene.objects().iter().filter(|o| o.shape != Shape::RoomBox) {
            assert!(o.base.position.abs().cmple(half).all(), "{} outside", o.name);
        }
    }

    #[test]
    fn swing_follows_cosine_of_total_time() {
        let mut scene = Scene::default();
        scene.step(&at(0.0, 0.0));
        assert!((scene.animation().swing_angle - 1.0).abs() < 1e-6);
        scene.step(&at(std::f32::consts::PI, 0.016));
        assert!((scene.animation().swing_angle + 1.0).abs() < 1e-5);
    }

    #[test]
    fn spin_accumulates_at_rate_and_wraps() {
        let mut scene = Scene::default();
        let torus = index_of(&scene, Shape::Torus);
        for _ in 0..1000 {
            scene.step(&at(1.0, 0.1));
        }
        let a = scene.spin(torus).unwrap();
        assert!((0.0..TAU).contains(&a));
        assert!((a - 80.0_f32.rem_euclid(TAU)).abs() < 1e-2, "spin = {a}");
    }

    #[test]
    fn torus_turns_smoothly_across_wraps() {
        let mut scene = Scene::default();
        let torus = index_of(&scene, Shape::Torus);
        let dt = 1.0 / 60.0;
        let mut prev = scene.world_matrix(torus).unwrap().x_axis.truncate().normalize();
        let mut worst = 0.0_f32;
        for i in 1..1200 {
            scene.step(&at(i as f32 * dt, dt));
            let x = scene.world_matrix(torus).unwrap().x_axis.truncate().normalize();
            worst = worst.max(prev.cross(x).length().atan2(prev.dot(x)));
            prev = x;
        }
        assert!((worst - 0.8 * dt).abs() < 1e-3, "largest step {worst}");
    }

    #[test]
    fn reticle_displacement_is_bounded() {
        let mut scene = Scene::default();
        for i in 0..500 {
            scene.step(&at(i as f32 * 0.013, 0.013));
            let d = scene.animation().reticle_displacement;
            assert!((0.0..=RETICLE_PULSE_PIXELS).contains(&d));
        }
    }

    #[test]
    fn static_objects_ignore_time() {
        let mut scene = Scene::default();
        let before = scene.world_matrix(0);
        scene.step(&at(12.3, 0.5));
        assert_eq!(scene.world_matrix(0), before);
    }

    #[test]
    fn sphere_matrix_rotates_about_z() {
        let mut scene = Scene::default();
        scene.step(&at(0.0, 0.0));
        let sphere = index_of(&scene, Shape::Sphere);
        let m = scene.world_matrix(sphere).unwrap();
        let expected = Mat4::from_rotation_z(1.0);
        assert!(m.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn instances_cover_every_object() {
        let scene = Scene::default();
        assert_eq!(scene.instances().count(), scene.objects().len());
    }
}
