use glam::Vec3;
use realm_input::{CameraOrientation, InputSnapshot};
use serde::{Deserialize, Serialize};

use crate::ground::GroundProbe;
use crate::player::{JumpTrigger, PlayerConfig, PlayerState};

/// A notable transition recorded during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameEvent {
    /// The player touched ground after being airborne.
    Landed { tick: u64, position: Vec3 },
    /// A jump launched the player.
    Jumped { tick: u64 },
}

/// Player simulation advanced one frame per [`Simulation::step`].
///
/// Owns the player state; yaw/pitch live in the caller's
/// [`CameraOrientation`] because mouse look writes them between frames.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: PlayerConfig,
    player: PlayerState,
    tick: u64,
    jump_was_held: bool,
    event_log: Vec<FrameEvent>,
}

impl Simulation {
    /// Start a simulation with the player at the configured spawn point.
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_player(config, PlayerState::at(config.spawn))
    }

    pub fn with_player(config: PlayerConfig, player: PlayerState) -> Self {
        Self {
            config,
            player,
            tick: 0,
            jump_was_held: false,
            event_log: Vec::new(),
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Frames stepped so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[FrameEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Advance one frame.
    ///
    /// No early return and no error: a missed ground probe simply means the
    /// player keeps falling. Off the edge of the terrain that fall never ends.
    pub fn step(
        &mut self,
        input: &InputSnapshot,
        orientation: &mut CameraOrientation,
        ground: &impl GroundProbe,
    ) {
        self.tick += 1;
        let cfg = self.config;
        let was_grounded = self.player.on_ground;
        let player = &mut self.player;

        // Semi-implicit Euler, one step per frame.
        player.vertical_velocity -= cfg.gravity;
        player.position.y += player.vertical_velocity;

        player.on_ground = false;

        if let Some(hit) = ground.probe(player.position) {
            if hit.distance <= cfg.ground_reach() {
                player.position.y = hit.point.y + cfg.height;
                player.vertical_velocity = 0.0;
                player.on_ground = true;
            }
        }
        if player.on_ground && !was_grounded {
            tracing::debug!(tick = self.tick, y = player.position.y, "landed");
            self.event_log.push(FrameEvent::Landed {
                tick: self.tick,
                position: player.position,
            });
        }

        let jump = match cfg.jump_trigger {
            JumpTrigger::Held => input.jump,
            JumpTrigger::Pressed => input.jump && !self.jump_was_held,
        };
        self.jump_was_held = input.jump;
        if jump && player.on_ground {
            player.vertical_velocity = cfg.jump_force;
            tracing::trace!(tick = self.tick, "jump");
            self.event_log.push(FrameEvent::Jumped { tick: self.tick });
        }

        if input.turn_left {
            orientation.yaw += cfg.turn_speed;
        }
        if input.turn_right {
            orientation.yaw -= cfg.turn_speed;
        }

        let speed = if input.sprint {
            cfg.move_speed * cfg.sprint_multiplier
        } else {
            cfg.move_speed
        };
        let (sin, cos) = orientation.yaw.sin_cos();

        // Keys add independently, so diagonals cover more ground.
        if input.forward {
            player.position.x -= sin * speed;
            player.position.z -= cos * speed;
        }
        if input.back {
            player.position.x += sin * speed;
            player.position.z += cos * speed;
        }
        if input.strafe_left {
            player.position.x -= cos * speed;
            player.position.z += sin * speed;
        }
        if input.strafe_right {
            player.position.x += cos * speed;
            player.position.z -= sin * speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::{FlatGround, NoGround};
    use realm_input::Action;
    use realm_terrain::{Terrain, TerrainConfig, height_at};

    const EPS: f32 = 1e-4;

    fn grounded_at(height: f32, config: PlayerConfig) -> Simulation {
        Simulation::with_player(
            config,
            PlayerState {
                position: Vec3::new(0.0, height + config.height, 0.0),
                vertical_velocity: 0.0,
                on_ground: true,
            },
        )
    }

    #[test]
    fn free_fall_changes_only_vertical_state() {
        let mut sim = Simulation::new(PlayerConfig::default());
        let mut o = CameraOrientation::new(0.7, 0.2);
        let idle = InputSnapshot::default();
        let start = *sim.player();
        for _ in 0..50 {
            sim.step(&idle, &mut o, &NoGround);
        }
        let p = sim.player();
        assert_eq!(p.position.x, start.position.x);
        assert_eq!(p.position.z, start.position.z);
        assert_eq!(o, CameraOrientation::new(0.7, 0.2));
        assert!(p.position.y < start.position.y);
        assert!((p.vertical_velocity - -0.5).abs() < EPS);
        assert!(!p.on_ground);
        assert_eq!(sim.tick(), 50);
    }

    #[test]
    fn falling_has_no_terminal_velocity() {
        let mut sim = Simulation::new(PlayerConfig::default());
        let mut o = CameraOrientation::default();
        for _ in 0..10_000 {
            sim.step(&InputSnapshot::default(), &mut o, &NoGround);
        }
        assert!((sim.player().vertical_velocity - -100.0).abs() < 0.1);
    }

    #[test]
    fn spawn_lands_on_terrain_at_origin() {
        let terrain = Terrain::generate(TerrainConfig::default()).unwrap();
        let mut sim = Simulation::new(PlayerConfig::default());
        let mut o = CameraOrientation::default();
        let mut frames = 0;
        while !sim.player().on_ground {
            sim.step(&InputSnapshot::default(), &mut o, &terrain);
            frames += 1;
            assert!(frames < 1_000, "never landed");
        }
        let p = sim.player();
        assert_eq!(p.vertical_velocity, 0.0);
        assert!((p.position.y - (2.0 + 2.0)).abs() < EPS);
        assert_eq!((p.position.x, p.position.z), (0.0, 0.0));
        assert!(matches!(sim.events(), [FrameEvent::Landed { .. }]));

        // Standing still stays put.
        for _ in 0..100 {
            sim.step(&InputSnapshot::default(), &mut o, &terrain);
        }
        assert!(sim.player().on_ground);
        assert!((sim.player().position.y - 4.0).abs() < EPS);
        assert_eq!(sim.events().len(), 1);
    }

    #[test]
    fn ground_snap_within_reach() {
        let config = PlayerConfig::default();
        let ground = FlatGround { height: 5.0 };
        for (start_above, velocity) in [(2.0, -0.1), (2.05, 0.0), (1.6, -0.3), (2.04, -0.01)] {
            let mut sim = Simulation::with_player(
                config,
                PlayerState {
                    position: Vec3::new(1.0, 5.0 + start_above, 1.0),
                    vertical_velocity: velocity,
                    on_ground: false,
                },
            );
            sim.step(&InputSnapshot::default(), &mut CameraOrientation::default(), &ground);
            assert!(sim.player().on_ground, "start_above={start_above}");
            assert_eq!(sim.player().position.y, 7.0);
            assert_eq!(sim.player().vertical_velocity, 0.0);
        }
    }

    #[test]
    fn out_of_reach_keeps_falling() {
        let config = PlayerConfig::default();
        let mut sim = Simulation::with_player(config, PlayerState::at(Vec3::new(0.0, 3.0, 0.0)));
        sim.step(
            &InputSnapshot::default(),
            &mut CameraOrientation::default(),
            &FlatGround { height: 0.0 },
        );
        assert!(!sim.player().on_ground);
        assert!((sim.player().position.y - 2.99).abs() < EPS);
    }

    #[test]
    fn below_the_surface_never_recovers() {
        let terrain = Terrain::generate(TerrainConfig {
            size: 20.0,
            resolution: 20,
        })
        .unwrap();
        let mut sim = Simulation::with_player(
            PlayerConfig::default(),
            PlayerState::at(Vec3::new(0.0, -5.0, 0.0)),
        );
        let mut o = CameraOrientation::default();
        for _ in 0..100 {
            sim.step(&InputSnapshot::default(), &mut o, &terrain);
            assert!(!sim.player().on_ground);
        }
    }

    #[test]
    fn walking_off_the_edge_falls_forever() {
        let terrain = Terrain::generate(TerrainConfig {
            size: 4.0,
            resolution: 4,
        })
        .unwrap();
        let config = PlayerConfig {
            move_speed: 0.5,
            ..PlayerConfig::default()
        };
        let ground_y = height_at(0.0, 0.0);
        let mut sim = grounded_at(ground_y, config);
        let mut o = CameraOrientation::default();
        let forward = InputSnapshot::holding(&[Action::Forward]);
        for _ in 0..20 {
            sim.step(&forward, &mut o, &terrain);
        }
        assert!(sim.player().position.z < -2.0);
        assert!(!sim.player().on_ground);
        let vy = sim.player().vertical_velocity;
        for _ in 0..10 {
            sim.step(&InputSnapshot::default(), &mut o, &terrain);
        }
        assert!(sim.player().vertical_velocity < vy);
    }

    #[test]
    fn held_jump_retriggers_every_grounded_frame() {
        let config = PlayerConfig::default();
        let ground = FlatGround { height: 0.0 };
        let mut sim = grounded_at(0.0, config);
        let mut o = CameraOrientation::default();
        let jump = InputSnapshot::holding(&[Action::Jump]);
        let mut grounded_frames = 0;
        for _ in 0..200 {
            sim.step(&jump, &mut o, &ground);
            if sim.player().on_ground {
                grounded_frames += 1;
                assert_eq!(sim.player().vertical_velocity, config.jump_force);
            }
        }
        let jumps = sim
            .events()
            .iter()
            .filter(|e| matches!(e, FrameEvent::Jumped { .. }))
            .count();
        assert!(grounded_frames > 1);
        assert_eq!(jumps, grounded_frames);
    }

    #[test]
    fn jump_overrides_ground_snap() {
        let mut sim = grounded_at(0.0, PlayerConfig::default());
        sim.step(
            &InputSnapshot::holding(&[Action::Jump]),
            &mut CameraOrientation::default(),
            &FlatGround { height: 0.0 },
        );
        assert!(sim.player().on_ground);
        assert_eq!(sim.player().position.y, 2.0);
        assert_eq!(sim.player().vertical_velocity, 0.2);
    }

    #[test]
    fn airborne_jump_does_nothing() {
        let mut sim = Simulation::with_player(
            PlayerConfig::default(),
            PlayerState::at(Vec3::new(0.0, 50.0, 0.0)),
        );
        sim.step(
            &InputSnapshot::holding(&[Action::Jump]),
            &mut CameraOrientation::default(),
            &FlatGround { height: 0.0 },
        );
        assert!((sim.player().vertical_velocity - -0.01).abs() < EPS);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn pressed_trigger_needs_a_fresh_press() {
        let config = PlayerConfig {
            jump_trigger: JumpTrigger::Pressed,
            ..PlayerConfig::default()
        };
        let ground = FlatGround { height: 0.0 };
        let mut sim = grounded_at(0.0, config);
        let mut o = CameraOrientation::default();
        let jump = InputSnapshot::holding(&[Action::Jump]);
        for _ in 0..200 {
            sim.step(&jump, &mut o, &ground);
        }
        let count = |sim: &Simulation| {
            sim.events()
                .iter()
                .filter(|e| matches!(e, FrameEvent::Jumped { .. }))
                .count()
        };
        assert_eq!(count(&sim), 1);
        assert!(sim.player().on_ground);

        sim.step(&InputSnapshot::default(), &mut o, &ground);
        sim.step(&jump, &mut o, &ground);
        assert_eq!(count(&sim), 2);
    }

    #[test]
    fn turning_is_a_fixed_rate_per_frame() {
        let mut sim = grounded_at(0.0, PlayerConfig::default());
        let ground = FlatGround { height: 0.0 };
        let mut o = CameraOrientation::new(0.5, 0.0);
        for _ in 0..100 {
            sim.step(&InputSnapshot::holding(&[Action::TurnLeft]), &mut o, &ground);
        }
        assert!((o.yaw - (0.5 + 0.03 * 100.0)).abs() < EPS);
        for _ in 0..40 {
            sim.step(&InputSnapshot::holding(&[Action::TurnRight]), &mut o, &ground);
        }
        assert!((o.yaw - (0.5 + 0.03 * 60.0)).abs() < EPS);
        // Both keys cancel.
        let both = InputSnapshot::holding(&[Action::TurnLeft, Action::TurnRight]);
        let before = o.yaw;
        sim.step(&both, &mut o, &ground);
        assert!((o.yaw - before).abs() < 1e-6);
    }

    #[test]
    fn walking_follows_yaw() {
        let ground = FlatGround { height: 0.0 };
        let cases = [
            (0.0, Action::Forward, Vec3::new(0.0, 0.0, -0.05)),
            (0.0, Action::Back, Vec3::new(0.0, 0.0, 0.05)),
            (0.0, Action::StrafeLeft, Vec3::new(-0.05, 0.0, 0.0)),
            (0.0, Action::StrafeRight, Vec3::new(0.05, 0.0, 0.0)),
            (std::f32::consts::FRAC_PI_2, Action::Forward, Vec3::new(-0.05, 0.0, 0.0)),
        ];
        for (yaw, action, expected) in cases {
            let mut sim = grounded_at(0.0, PlayerConfig::default());
            let before = sim.player().position;
            sim.step(
                &InputSnapshot::holding(&[action]),
                &mut CameraOrientation::new(yaw, 0.0),
                &ground,
            );
            let delta = sim.player().position - before;
            assert!((delta - expected).length() < 1e-5, "{action:?}: {delta:?}");
        }
    }

    #[test]
    fn sprint_multiplies_speed() {
        let mut sim = grounded_at(0.0, PlayerConfig::default());
        sim.step(
            &InputSnapshot::holding(&[Action::Forward, Action::Sprint]),
            &mut CameraOrientation::default(),
            &FlatGround { height: 0.0 },
        );
        assert!((sim.player().position.z - -0.15).abs() < 1e-6);
    }

    #[test]
    fn diagonal_is_faster_than_axis() {
        let mut sim = grounded_at(0.0, PlayerConfig::default());
        sim.step(
            &InputSnapshot::holding(&[Action::Forward, Action::StrafeRight]),
            &mut CameraOrientation::default(),
            &FlatGround { height: 0.0 },
        );
        let horizontal = Vec3::new(sim.player().position.x, 0.0, sim.player().position.z);
        assert!((horizontal.length() - 0.05 * std::f32::consts::SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn turn_applies_before_walk_in_same_frame() {
        let mut sim = grounded_at(0.0, PlayerConfig::default());
        let mut o = CameraOrientation::default();
        sim.step(
            &InputSnapshot::holding(&[Action::Forward, Action::TurnLeft]),
            &mut o,
            &FlatGround { height: 0.0 },
        );
        let expected_x = -(0.03_f32).sin() * 0.05;
        assert!((sim.player().position.x - expected_x).abs() < 1e-7);
    }

    #[test]
    fn drain_events_clears_log() {
        let mut sim = Simulation::with_player(
            PlayerConfig::default(),
            PlayerState::at(Vec3::new(0.0, 2.0, 0.0)),
        );
        sim.step(
            &InputSnapshot::default(),
            &mut CameraOrientation::default(),
            &FlatGround { height: 0.0 },
        );
        assert_eq!(sim.drain_events().len(), 1);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn identical_inputs_give_identical_runs() {
        let terrain = Terrain::generate(TerrainConfig {
            size: 50.0,
            resolution: 50,
        })
        .unwrap();
        let script: Vec<InputSnapshot> = (0..400)
            .map(|i| match i % 7 {
                0 => InputSnapshot::holding(&[Action::Forward, Action::Jump]),
                1 | 2 => InputSnapshot::holding(&[Action::TurnLeft, Action::Sprint, Action::Forward]),
                3 => InputSnapshot::holding(&[Action::StrafeLeft]),
                _ => InputSnapshot::default(),
            })
            .collect();
        let run = || {
            let mut sim = Simulation::new(PlayerConfig {
                spawn: Vec3::new(0.0, 20.0, 0.0),
                ..PlayerConfig::default()
            });
            let mut o = CameraOrientation::default();
            for snap in &script {
                sim.step(snap, &mut o, &terrain);
            }
            (*sim.player(), o, sim.events().to_vec())
        };
        assert_eq!(run(), run());
    }
}
