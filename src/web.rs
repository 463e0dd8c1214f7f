//! WASM entry point: the sandbox behind a frame-driven JS API. The page owns
//! the render loop and pulls transforms, meshes and scene changes from here.

use wasm_bindgen::prelude::*;

use crate::fracture::ConvexBreaker;
use crate::geometry::Vertex;
use crate::physics::RapierWorld;
use crate::sandbox::Sandbox;
use crate::scene::{NodeId, SceneNode};
use crate::sim::Simulation;
use crate::view::Camera;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("logger already initialised");
    }
}

#[wasm_bindgen]
pub struct WebSandbox {
    sim: Simulation<RapierWorld, ConvexBreaker>,
    camera: Camera,
    last_time_ms: Option<f64>,
    added: Vec<NodeId>,
    removed: Vec<NodeId>,
}

#[wasm_bindgen]
impl WebSandbox {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<WebSandbox, JsValue> {
        let mut sim = Sandbox::rapier(Sandbox::demo_config());
        Sandbox::build(&mut sim).map_err(|err| JsValue::from_str(&err.to_string()))?;

        let mut sandbox = Self {
            sim,
            camera: Camera::with_viewport(width, height),
            last_time_ms: None,
            added: Vec::new(),
            removed: Vec::new(),
        };
        sandbox.pull_changes();
        log::info!("web sandbox started at {}x{}", width, height);
        Ok(sandbox)
    }

    /// Steps by the time elapsed since the previous call. The first call
    /// only records the clock.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        self.step(delta)
    }

    /// Steps by `dt` seconds; returns the number of fractures.
    pub fn step(&mut self, dt: f32) -> u32 {
        let report = self.sim.step(dt);
        self.pull_changes();
        report.fractures as u32
    }

    pub fn throw_ball(&mut self, ndc_x: f32, ndc_y: f32) -> Result<(), JsValue> {
        let ray = self.camera.screen_to_ray(ndc_x, ndc_y);
        Sandbox::throw_ball(&mut self.sim, &ray)
            .map(|_| ())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.pull_changes();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn view_projection(&self) -> Vec<f32> {
        self.camera.view_projection().to_cols_array().to_vec()
    }

    /// Eight floats per node: id, position xyz, rotation xyzw.
    pub fn object_transforms(&self) -> Vec<f32> {
        let scene = self.sim.world().scene();
        let mut out = Vec::with_capacity(scene.len() * 8);
        for (id, node) in scene.iter() {
            let p = node.transform.position;
            let q = node.transform.rotation;
            out.extend_from_slice(&[id.raw() as f32, p.x, p.y, p.z, q.x, q.y, q.z, q.w]);
        }
        out
    }

    /// Flat-shaded position/normal pairs of the node's mesh in its local
    /// frame; empty if the node is gone.
    pub fn node_vertices(&self, id: f64) -> Vec<f32> {
        self.node(id)
            .map(|node| Vertex::as_floats(&node.mesh.to_vertices()).to_vec())
            .unwrap_or_default()
    }

    pub fn node_color(&self, id: f64) -> Vec<f32> {
        self.node(id)
            .map(|node| node.color.to_vec())
            .unwrap_or_default()
    }

    pub fn take_added(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.added)
            .into_iter()
            .map(|id| id.raw() as f64)
            .collect()
    }

    pub fn take_removed(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.removed)
            .into_iter()
            .map(|id| id.raw() as f64)
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.sim.world().len()
    }
}

impl WebSandbox {
    fn node(&self, id: f64) -> Option<&SceneNode> {
        if !(id >= 0.0) || id.fract() != 0.0 {
            return None;
        }
        self.sim.world().scene().get(NodeId::from_raw(id as u64))
    }

    fn pull_changes(&mut self) {
        let changes = self.sim.world_mut().scene_mut().take_changes();
        for id in changes.removed {
            // added and removed before the page saw it
            if let Some(pos) = self.added.iter().position(|a| *a == id) {
                self.added.remove(pos);
            } else {
                self.removed.push(id);
            }
        }
        self.added.extend(changes.added);
    }
}
