//! The actor state shared with brains and states

use crate::config::ActorConfig;
use log::debug;
use vesper_core::Vec2;
use vesper_physics::{MotionBody, PhysicsBackend};
use vesper_runtime::{Signal, SubscriptionId};

/// Everything a brain or state may read and change on an actor.
///
/// This is the context the actor's state machines run over. It owns the
/// motion body; the actor itself only adds the brain and the machines.
pub struct Character<P: PhysicsBackend> {
    form_id: String,
    config: ActorConfig,
    motion: MotionBody<P>,
    /// Directional input for this frame, written by the brain
    pub input_axis: Vec2,
    pub is_sprinting: bool,
    pub is_jumping: bool,
    /// Position the current jump took off from
    pub last_jump_pos: Vec2,
    scale: Vec2,
    form_changed: Signal<String>,
    state_requests: Vec<(String, String)>,
}

impl<P: PhysicsBackend> Character<P> {
    pub fn new(motion: MotionBody<P>, config: ActorConfig) -> Self {
        Self {
            form_id: String::new(),
            config,
            motion,
            input_axis: Vec2::ZERO,
            is_sprinting: false,
            is_jumping: false,
            last_jump_pos: Vec2::ZERO,
            scale: Vec2::ONE,
            form_changed: Signal::new(),
            state_requests: Vec::new(),
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Switch form and notify every form-changed subscriber, in order.
    pub fn set_form(&mut self, id: &str) {
        debug!("form '{}' -> '{}'", self.form_id, id);
        self.form_id = id.to_string();
        self.form_changed.emit(&self.form_id);
    }

    /// Subscribe to form changes. The callback gets the new form id.
    pub fn on_form_changed(&mut self, callback: impl FnMut(&String) + 'static) -> SubscriptionId {
        self.form_changed.subscribe(callback)
    }

    pub fn unsubscribe_form_changed(&mut self, id: SubscriptionId) -> bool {
        self.form_changed.unsubscribe(id)
    }

    /// Ask for `machine` to enter state `id` once the current phase ends.
    ///
    /// Requests apply in the order they were made. Unknown machines or states
    /// are logged and ignored at that point.
    pub fn request_state(&mut self, machine: &str, id: &str) {
        self.state_requests
            .push((machine.to_string(), id.to_string()));
    }

    pub fn has_state_requests(&self) -> bool {
        !self.state_requests.is_empty()
    }

    pub(crate) fn take_state_requests(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.state_requests)
    }

    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    pub fn motion(&self) -> &MotionBody<P> {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut MotionBody<P> {
        &mut self.motion
    }

    /// Visual scale; its signs mirror the facing axis when flipping is on
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Horizontal speed for the current ground contact and sprint flag
    pub fn move_speed(&self) -> f32 {
        self.config
            .move_speed(self.motion.is_grounded(), self.is_sprinting)
    }

    /// Turn the visual scale toward the motion body's facing axis.
    ///
    /// An axis flips only when flipping is enabled for it, the facing
    /// component is non-zero, and it disagrees with the scale's sign. A zero
    /// scale component counts as positive.
    pub(crate) fn update_flip(&mut self) {
        let face = self.motion.face_axis();
        if self.config.flip_x && face.x != 0.0 && face.x != self.scale.x.signum() {
            self.scale.x *= -1.0;
        }
        if self.config.flip_y && face.y != 0.0 && face.y != self.scale.y.signum() {
            self.scale.y *= -1.0;
        }
    }
}
