//! Scene-graph demo - headless entry point
//!
//! Builds a small sun / planet / moon hierarchy, animates it for a number of
//! frames and reports the moon's world pose and how often it was notified.

mod controller;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use glam::Vec3;
use tracing::{debug, info};

use scenegraph_core::{FrameTime, RunConfig, Timer};
use scenegraph_scene::{ChangeFlags, Entity, Space, TransformTree, TreeConfig, Trs};

use controller::{Bob, Controller, Spin};

struct App {
    tree: TransformTree,
    controllers: Vec<Box<dyn Controller>>,
    moon: Entity,
    moon_events: Rc<Cell<u64>>,
}

impl App {
    fn new() -> Result<Self> {
        let mut tree = TransformTree::with_config(TreeConfig::default().with_capacity(8));

        let sun = Entity::spawn(&mut tree, "sun");
        let planet = Entity::spawn_with(
            &mut tree,
            "planet",
            Trs::new().with_position(Vec3::new(10.0, 0.0, 0.0)),
        );
        let moon = Entity::spawn_with(
            &mut tree,
            "moon",
            Trs::new()
                .with_position(Vec3::new(2.0, 0.0, 0.0))
                .with_scale(Vec3::splat(0.25)),
        );
        planet.set_parent(&mut tree, Some(&sun));
        moon.set_parent(&mut tree, Some(&planet));

        // Speculative edit: rejected and logged, the hierarchy is unchanged.
        sun.set_parent(&mut tree, Some(&moon));

        let moon_events = Rc::new(Cell::new(0));
        let sink = Rc::clone(&moon_events);
        tree.subscribe(moon.transform(), move |event| {
            if event.flags.contains(ChangeFlags::FROM_PARENT) {
                sink.set(sink.get() + 1);
            }
        })?;

        let controllers: Vec<Box<dyn Controller>> = vec![
            Box::new(Spin {
                target: sun.transform(),
                rate: Vec3::new(0.0, 0.5, 0.0),
                space: Space::Local,
            }),
            Box::new(Spin {
                target: planet.transform(),
                rate: Vec3::new(0.0, 2.0, 0.0),
                space: Space::World,
            }),
            Box::new(Bob {
                target: planet.transform(),
                rest: Vec3::new(10.0, 0.0, 0.0),
                amplitude: 1.0,
                frequency: 0.25,
            }),
        ];

        info!(transforms = tree.len(), "scene built");
        Ok(Self {
            tree,
            controllers,
            moon,
            moon_events,
        })
    }

    fn update(&mut self, time: &FrameTime) {
        for controller in &mut self.controllers {
            controller.update(&mut self.tree, time);
        }

        let id = self.moon.transform();
        debug!(
            frame = time.frame,
            position = ?self.tree.position(id),
            forward = ?self.tree.forward(id),
            "moon pose"
        );
    }
}

fn main() -> Result<()> {
    // Initialize logging
    scenegraph_core::init_logging();
    info!("Starting scene-graph demo");

    let config = RunConfig::from_env()?;
    info!(frames = config.frames, fixed_dt = ?config.fixed_dt, "run configuration");

    let mut app = App::new()?;
    let mut timer = Timer::new();

    for frame in 0..config.frames {
        let time = match config.fixed_dt {
            Some(dt) => FrameTime::fixed(frame, dt),
            None => timer.next_frame(),
        };
        app.update(&time);
    }

    let id = app.moon.transform();
    info!(
        moon = app.moon.name(),
        position = ?app.tree.position(id),
        rotation = ?app.tree.rotation(id),
        ancestor_notifications = app.moon_events.get(),
        elapsed_secs = timer.elapsed_secs(),
        "simulation finished"
    );

    Ok(())
}
