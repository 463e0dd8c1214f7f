//! Headless demo: builds the sandbox, throws a volley of balls from the
//! camera and logs what broke.
//!
//! ```text
//! RUST_LOG=info fracture-demo [config.yaml]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    env_logger::init();

    match demo::run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use fracture_sandbox::config::SandboxConfig;
    use fracture_sandbox::sandbox::Sandbox;
    use fracture_sandbox::view::Camera;
    use fracture_sandbox::Result;

    const FRAMES: u32 = 600;
    const FRAME_DELTA: f32 = 1.0 / 60.0;
    const THROW_EVERY: u32 = 40;

    /// Pointer positions in NDC, aimed at the towers, bridge, stones and
    /// mountain in turn.
    const VOLLEY: [(f32, f32); 8] = [
        (-0.35, 0.05),
        (-0.1, 0.25),
        (0.3, 0.05),
        (0.05, -0.3),
        (-0.2, -0.25),
        (0.45, 0.1),
        (0.0, 0.0),
        (0.25, -0.1),
    ];

    pub fn run(config_path: Option<String>) -> Result<()> {
        let config = match config_path {
            Some(path) => {
                log::info!("loading config from {}", path);
                SandboxConfig::load(path)?
            }
            None => Sandbox::demo_config(),
        };

        let mut sim = Sandbox::rapier(config);
        let layout = Sandbox::build(&mut sim)?;
        let camera = Camera::with_viewport(1280, 720);

        let mut throws = VOLLEY.iter();
        let (mut fractures, mut debris, mut removed) = (0, 0, 0);

        for frame in 0..FRAMES {
            if frame % THROW_EVERY == 0 {
                if let Some((x, y)) = throws.next() {
                    let ray = camera.screen_to_ray(*x, *y);
                    Sandbox::throw_ball(&mut sim, &ray)?;
                }
            }

            let report = sim.step(FRAME_DELTA);
            if report.fractures > 0 {
                log::info!(
                    "frame {}: {} fractures, {} debris, {} objects",
                    frame,
                    report.fractures,
                    report.debris_created,
                    sim.world().len()
                );
            }
            fractures += report.fractures;
            debris += report.debris_created;
            removed += report.removed.len();
        }

        let standing = layout
            .breakables()
            .filter(|id| sim.world().contains(*id))
            .count();
        log::info!(
            "done after {} frames: {} fractures, {} debris, {} removed, {} of {} starting pieces intact",
            sim.frames(),
            fractures,
            debris,
            removed,
            standing,
            layout.breakables().count()
        );
        Ok(())
    }
}
