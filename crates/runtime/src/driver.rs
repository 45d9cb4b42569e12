use realm_config::GameConfig;
use realm_input::{
    Bindings, CameraOrientation, InputEvent, InputQueue, InputSnapshot, InputState, LookControl,
};
use realm_kernel::Simulation;
use realm_render::{CameraRig, SceneBackend};
use realm_terrain::Terrain;

/// Owns everything the frame loop mutates and runs one frame per call.
pub struct FrameDriver {
    terrain: Terrain,
    simulation: Simulation,
    orientation: CameraOrientation,
    input: InputState,
    bindings: Bindings,
    look: LookControl,
    queue: InputQueue,
    rig: CameraRig,
    last_snapshot: InputSnapshot,
}

impl FrameDriver {
    pub fn new(config: &GameConfig, terrain: Terrain, rig: CameraRig) -> Self {
        Self {
            terrain,
            simulation: Simulation::new(config.player),
            orientation: CameraOrientation::default(),
            input: InputState::new(),
            bindings: config.bindings.clone(),
            look: LookControl::new(config.look),
            queue: InputQueue::new(),
            rig,
            last_snapshot: InputSnapshot::default(),
        }
    }

    /// Queue a platform event for the next frame.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    pub fn queue_mut(&mut self) -> &mut InputQueue {
        &mut self.queue
    }

    /// Drain input, advance the simulation one step and pose the camera rig.
    pub fn update<B: SceneBackend + ?Sized>(&mut self, backend: &mut B) {
        for event in self.queue.drain() {
            match event {
                InputEvent::KeyDown(key) => self.input.press(key),
                InputEvent::KeyUp(key) => self.input.release(key),
                InputEvent::MouseMotion { dx, dy } => {
                    self.look.apply_motion(&mut self.orientation, dx, dy);
                }
                InputEvent::PointerLock(locked) => self.look.set_locked(locked),
                InputEvent::FocusLost => {
                    self.input.release_all();
                    tracing::debug!("focus lost, keys released");
                }
                InputEvent::Resize { width, height } => {
                    match backend.scene_mut().projection_mut(self.rig.camera) {
                        Ok(projection) => projection.set_viewport(width, height),
                        Err(e) => tracing::warn!("resize skipped projection: {e}"),
                    }
                    backend.resize(width, height);
                    tracing::debug!(width, height, "viewport resized");
                }
            }
        }

        self.last_snapshot = self.input.snapshot(&self.bindings);
        self.simulation
            .step(&self.last_snapshot, &mut self.orientation, &self.terrain);

        let position = self.simulation.player().position;
        if let Err(e) = self
            .rig
            .pose(backend.scene_mut(), position, &self.orientation)
        {
            tracing::warn!("camera rig not posed: {e}");
        }
    }

    /// [`update`](Self::update), then draw.
    pub fn run_frame<B: SceneBackend + ?Sized>(&mut self, backend: &mut B) {
        self.update(backend);
        backend.draw_frame(self.rig.camera);
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn orientation(&self) -> &CameraOrientation {
        &self.orientation
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn look(&self) -> &LookControl {
        &self.look
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Input as seen by the most recent frame.
    pub fn last_snapshot(&self) -> &InputSnapshot {
        &self.last_snapshot
    }
}
