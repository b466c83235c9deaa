use crate::field::{DensityProfile, FieldStyle, COMPACT_BREAKPOINT};

/// Page section a backdrop is drawn behind. Sections share one simulation and
/// differ only in density and style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Section {
    Hero,
    About,
    Experience,
    Projects,
    Contact,
}

#[cfg(test)]
const ALL_SECTIONS: [Section; 5] = [
    Section::Hero,
    Section::About,
    Section::Experience,
    Section::Projects,
    Section::Contact,
];

/// Look shared by every section below the hero.
const SECONDARY_STYLE: FieldStyle = FieldStyle {
    particle_speed: 0.15,
    particle_radius: (0.5, 2.0),
    particle_opacity: (0.1, 0.4),
    node_speed: 0.1,
    node_radius: (2.0, 5.0),
    jitter: 80.0,
    glow_amplitude: 6.0,
    link_threshold: 150.0,
    link_opacity: 0.2,
    fade_alpha: 0.15,
};

/// Full-screen banner: denser, brighter, longer links.
const HERO_STYLE: FieldStyle = FieldStyle {
    particle_speed: 0.25,
    particle_radius: (1.0, 3.0),
    particle_opacity: (0.2, 0.7),
    node_speed: 0.15,
    node_radius: (3.0, 7.0),
    jitter: 100.0,
    glow_amplitude: 8.0,
    link_threshold: 200.0,
    link_opacity: 0.3,
    fade_alpha: 0.1,
};

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::Hero => "Hero",
            Section::About => "About",
            Section::Experience => "Experience",
            Section::Projects => "Projects",
            Section::Contact => "Contact",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Section::Hero => Section::About,
            Section::About => Section::Experience,
            Section::Experience => Section::Projects,
            Section::Projects => Section::Contact,
            Section::Contact => Section::Hero,
        }
    }

    #[cfg(test)]
    pub fn all() -> &'static [Section] {
        &ALL_SECTIONS
    }

    pub fn style(self) -> FieldStyle {
        match self {
            Section::Hero => HERO_STYLE,
            _ => SECONDARY_STYLE,
        }
    }

    /// Density for a viewport `viewport_width` pixels wide.
    /// Only About scales down on narrow viewports.
    pub fn density(self, viewport_width: u32) -> DensityProfile {
        let compact = viewport_width < COMPACT_BREAKPOINT;
        match self {
            Section::Hero => DensityProfile {
                particle_count: 80,
                grid_columns: 8,
                grid_rows: 6,
            },
            Section::About if compact => DensityProfile {
                particle_count: 25,
                grid_columns: 3,
                grid_rows: 2,
            },
            Section::About | Section::Experience | Section::Projects | Section::Contact => {
                DensityProfile {
                    particle_count: 50,
                    grid_columns: 6,
                    grid_rows: 4,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_every_section() {
        let mut section = Section::Hero;
        for expected in Section::all().iter().skip(1) {
            section = section.next();
            assert_eq!(section, *expected);
        }
        assert_eq!(section.next(), Section::Hero);
    }

    #[test]
    fn about_has_compact_tier() {
        assert_eq!(Section::About.density(767).node_count(), 6);
        assert_eq!(Section::About.density(767).particle_count, 25);
        assert_eq!(Section::About.density(768).node_count(), 24);
        assert_eq!(Section::About.density(768).particle_count, 50);
    }

    #[test]
    fn node_grids_stay_small() {
        for &section in Section::all() {
            for width in [320, 1920] {
                let n = section.density(width).node_count();
                assert!(n <= 48, "{} has {n} nodes", section.label());
            }
        }
    }

    #[test]
    fn hero_links_reach_further() {
        assert_eq!(Section::Hero.style().link_threshold, 200.0);
        for &section in &Section::all()[1..] {
            assert_eq!(section.style().link_threshold, 150.0);
        }
    }
}
