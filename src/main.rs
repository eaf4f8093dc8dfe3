//! Tiltball entry point
//!
//! Native builds run a headless session and log the ball's trajectory.
//! The browser build is driven through `tiltball::wasm::TiltTable`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use tiltball::consts::*;
    use tiltball::sim::{FixedStepper, SimulationState, TickInput, tick};
    use tiltball::{ConfigurationProvider, Mode, Settings, SharedEnvironment};

    #[derive(Parser, Debug)]
    #[command(name = "tiltball", about = "Headless tilt-table simulation")]
    struct Args {
        /// sandbox, challenge or racing (ignored when --config is given)
        #[arg(short, long, default_value = "challenge")]
        mode: String,

        /// JSON settings document
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of fixed ticks to run
        #[arg(short, long, default_value_t = 600)]
        ticks: u32,

        /// Constant tilt about x (degrees)
        #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
        tilt_x: f32,

        /// Constant tilt about z (degrees)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        tilt_z: f32,

        /// Random-walk the tilt from this seed instead of holding it constant
        #[arg(long)]
        wander: Option<u64>,

        /// Start from a random spawn point within this half-extent
        #[arg(long)]
        spawn_extent: Option<f32>,

        /// Log every Nth tick
        #[arg(long, default_value_t = 60)]
        every: u32,
    }

    /// Drifting tilt that stays inside the clamp range
    struct Wander {
        rng: Pcg32,
        tilt: Vec2,
    }

    impl Wander {
        fn next(&mut self) -> TickInput {
            let kick = Vec2::new(
                self.rng.random_range(-1.5..=1.5),
                self.rng.random_range(-1.5..=1.5),
            );
            self.tilt = (self.tilt + kick)
                .clamp(Vec2::splat(-TILT_LIMIT_DEG), Vec2::splat(TILT_LIMIT_DEG));
            TickInput::from_degrees(self.tilt.x, self.tilt.y)
        }
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        let settings = match &args.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                let mode = Mode::from_str(&args.mode)
                    .with_context(|| format!("unknown mode '{}'", args.mode))?;
                Settings::from_mode(mode)
            }
        };

        log::info!(
            "Tiltball (native) mode={} policy={} limit={} pillars={}",
            settings.mode.as_str(),
            settings.physics.policy().as_str(),
            settings.physics.limit(),
            settings.physics.pillars().len()
        );

        let environment = SharedEnvironment::new(settings.environment);
        let mut state = SimulationState::default();
        if let Some(extent) = args.spawn_extent {
            let mut rng = Pcg32::seed_from_u64(args.wander.unwrap_or(0));
            state.spawn_random(&mut rng, extent);
        }

        let mut wander = args.wander.map(|seed| Wander {
            rng: Pcg32::seed_from_u64(seed),
            tilt: Vec2::ZERO,
        });
        let fixed = TickInput::from_degrees(args.tilt_x, args.tilt_z);

        let mut stepper = FixedStepper::default();
        let every = args.every.max(1) as u64;
        let mut max_speed = 0.0f32;
        let mut collisions = 0usize;
        let mut sanitized = 0usize;

        while state.time_ticks < args.ticks as u64 {
            stepper.advance(SIM_DT, |dt| {
                let input = wander.as_mut().map_or(fixed, Wander::next);
                let env = environment.environment();
                let report = tick(&mut state, &env, &settings.physics, &input, dt);

                max_speed = max_speed.max(report.speed);
                collisions += report.collisions.len();
                sanitized += report.sanitized as usize;

                if state.time_ticks % every == 0 {
                    log::info!(
                        "t={:6.2}s pos=({:6.2}, {:6.2}) v={:.3} a={:.3} modes={:?}",
                        state.elapsed_secs(dt),
                        state.body.pos.x,
                        state.body.pos.y,
                        report.speed,
                        report.acceleration,
                        report.modes()
                    );
                }
            });
        }

        println!(
            "{} ticks: final pos ({:.3}, {:.3}), speed {:.4}, max speed {:.4}, {} collisions, {} sanitized",
            state.time_ticks,
            state.body.pos.x,
            state.body.pos.y,
            state.body.speed(),
            max_speed,
            collisions,
            sanitized
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
