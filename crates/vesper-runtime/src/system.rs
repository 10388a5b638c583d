//! Phase trait for scheduled objects

/// Something the scheduler steps through the engine phases.
///
/// `W` is the shared world handed to every phase (for actors, the physics
/// backend). Phases run in this order each frame: `update`, zero or more
/// `fixed_update`s, `late_update`. `enable` and `start` run once before the
/// first frame; `disable` once after the last.
pub trait Phases<W> {
    /// Called when the object becomes active
    fn enable(&mut self, world: &mut W);

    /// Called once, after `enable`, before the first frame
    fn start(&mut self, world: &mut W);

    /// Called once per frame for variable-rate logic
    fn update(&mut self, world: &mut W);

    /// Called at the fixed physics rate, before the simulation steps
    fn fixed_update(&mut self, world: &mut W);

    /// Called once per frame after all fixed steps
    fn late_update(&mut self, world: &mut W);

    /// Called when the object is deactivated
    fn disable(&mut self, world: &mut W);
}
