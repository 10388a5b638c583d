//! Contact events between colliders

/// Lifecycle of a contact pair
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// A contact pair reported by the simulation after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactEvent<C> {
    pub phase: ContactPhase,
    pub collider_a: C,
    pub collider_b: C,
    /// At least one of the colliders is a sensor (non-blocking trigger)
    pub sensor: bool,
}

impl<C: Copy + Eq> ContactEvent<C> {
    /// The event as seen from `own`, if `own` is part of the pair.
    pub fn perspective(&self, own: C) -> Option<Contact<C>> {
        let other = if self.collider_a == own {
            self.collider_b
        } else if self.collider_b == own {
            self.collider_a
        } else {
            return None;
        };
        Some(Contact {
            own,
            other,
            sensor: self.sensor,
        })
    }
}

/// One side of a contact pair, handed to actors and brains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact<C> {
    /// The receiving actor's collider
    pub own: C,
    /// The collider it touched
    pub other: C,
    pub sensor: bool,
}
