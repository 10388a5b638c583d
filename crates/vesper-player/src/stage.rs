//! Stage - the phase scheduler for a level
//!
//! Each frame runs `update` on every actor, then as many fixed steps as the
//! clock allows (actor `fixed_update`, one simulation step, the velocity clamp,
//! contact routing), then `late_update`.

use crate::brains::PatrolBrain;
use crate::level::{BrainSpec, LevelFile};
use crate::states::with_stage_states;
use log::{debug, info, warn};
use rapier2d::prelude::{ColliderHandle, Vector};
use std::collections::HashMap;
use vesper_actor::{Actor, ActorBuilder, Brain, IdleBrain, FORM, STATUS};
use vesper_core::Result;
use vesper_physics::PhysicsWorld;
use vesper_runtime::{GameClock, Phases};

pub struct Stage {
    world: PhysicsWorld,
    actors: Vec<Actor<PhysicsWorld>>,
    clock: GameClock,
    draw_gizmos: bool,
    started: bool,
}

impl Stage {
    pub fn new(world: PhysicsWorld, fixed_rate: f64) -> Self {
        Self {
            world,
            actors: Vec::new(),
            clock: GameClock::with_fixed_rate(fixed_rate),
            draw_gizmos: false,
            started: false,
        }
    }

    /// Build the world and actors a level describes.
    pub fn from_level(level: &LevelFile, fixed_rate: f64) -> Result<Self> {
        let mut world = PhysicsWorld::new();
        if let Some(gravity) = level.gravity {
            world.gravity = Vector::new(gravity.x, gravity.y);
        }

        for platform in &level.platforms {
            world.add_static_box(platform.center, platform.half_extents);
        }

        let mut zones: HashMap<ColliderHandle, String> = HashMap::new();
        for zone in &level.zones {
            let handle = world.add_sensor_box(zone.center, zone.half_extents);
            zones.insert(handle, zone.form.clone());
        }

        let mut stage = Self::new(world, fixed_rate);
        for spawn in &level.actors {
            let handles =
                stage
                    .world
                    .spawn_character(spawn.position, spawn.half_extents, &spawn.body);

            let brain: Box<dyn Brain<PhysicsWorld>> = match &spawn.brain {
                BrainSpec::Idle => Box::new(IdleBrain),
                BrainSpec::Patrol {
                    span,
                    jump_every,
                    sprint,
                } => Box::new(
                    PatrolBrain::new(*span, *jump_every, *sprint).with_zones(zones.clone()),
                ),
            };

            let mut forms = vec![spawn.form.clone()];
            for form in zones.values() {
                if !forms.contains(form) {
                    forms.push(form.clone());
                }
            }

            let builder = ActorBuilder::new(&spawn.name)
                .config(spawn.config.clone())
                .boxed_brain(brain)
                .initial_form(&spawn.form)
                .interaction_collider(handles.interaction);
            let mut actor = with_stage_states(builder, &forms).build(
                &stage.world,
                handles.body,
                handles.collider,
            )?;

            let name = spawn.name.clone();
            actor
                .character_mut()
                .on_form_changed(move |form| info!("{name} takes the {form} form"));

            stage.add_actor(actor);
        }

        info!(
            "Level '{}': {} platforms, {} zones, {} actors",
            level.name,
            level.platforms.len(),
            level.zones.len(),
            stage.actors.len()
        );
        Ok(stage)
    }

    pub fn add_actor(&mut self, actor: Actor<PhysicsWorld>) {
        self.actors.push(actor);
    }

    pub fn set_draw_gizmos(&mut self, enabled: bool) {
        self.draw_gizmos = enabled;
    }

    /// Awake, enable, and start every actor, then enter its initial states.
    ///
    /// Runs on the first frame if not called explicitly.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        for actor in &mut self.actors {
            actor.awake();
            actor.enable(&mut self.world);
            actor.start(&mut self.world);

            let form = actor.form_id().to_string();
            for (machine, id) in [(FORM, form.as_str()), (STATUS, "idle")] {
                if let Err(err) = actor.change_state(machine, id) {
                    warn!("{}: {}", actor.name(), err);
                }
            }
        }
    }

    /// Advance one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f64) {
        self.start();
        self.clock.advance(dt);

        for actor in &mut self.actors {
            actor.update(&mut self.world);
        }

        while self.clock.should_fixed_update() {
            let step = self.clock.fixed_timestep as f32;

            for actor in &mut self.actors {
                actor.fixed_update(&mut self.world);
            }

            self.world.step(step);
            for actor in &mut self.actors {
                actor.post_step(&mut self.world);
            }
            self.route_contacts();

            self.clock.consume_fixed_step();
        }

        for actor in &mut self.actors {
            actor.late_update(&mut self.world);
        }

        if self.draw_gizmos {
            for actor in &mut self.actors {
                actor.draw_gizmos();
            }
        }
    }

    /// Disable every actor.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        for actor in &mut self.actors {
            actor.disable(&mut self.world);
        }
        self.started = false;
    }

    fn route_contacts(&mut self) {
        for event in self.world.drain_contact_events() {
            let mut delivered = false;
            for actor in &mut self.actors {
                delivered |= actor.handle_contact(&self.world, &event);
            }
            if !delivered {
                debug!("contact {:?} has no actor", event);
            }
        }
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn actors(&self) -> &[Actor<PhysicsWorld>] {
        &self.actors
    }

    pub fn actor(&self, name: &str) -> Option<&Actor<PhysicsWorld>> {
        self.actors.iter().find(|a| a.name() == name)
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }
}
