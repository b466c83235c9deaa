use clap::Parser;

use crate::section::Section;
use crate::surface::SurfaceBounds;

/// Animated particle and node-network backdrop.
#[derive(Parser, Debug)]
#[command(name = "nodefield", version, about, long_about = None)]
pub struct Args {
    /// Section preset to draw (Tab cycles at runtime)
    #[arg(short, long, value_enum, default_value_t = Section::Hero)]
    pub section: Section,

    /// Seed for reproducible layouts; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Initial surface width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial surface height in logical pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Run without a window, against an in-memory surface
    #[arg(long)]
    pub headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 600)]
    pub frames: u32,
}

impl Args {
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    pub fn surface_size(&self) -> SurfaceBounds {
        SurfaceBounds::new(self.width, self.height)
    }
}
