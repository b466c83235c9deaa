mod app;
mod backdrop;
mod cli;
mod debug;
mod error;
mod field;
mod headless;
mod host;
mod palette;
mod render;
mod section;
mod surface;

use clap::Parser;

fn main() {
    env_logger::init();
    let args = cli::Args::parse();
    log::info!("nodefield starting up ({} section)", args.section.label());

    if args.headless {
        let report = headless::run(&args);
        if !report.completed(args.frames) {
            log::error!("headless run stopped early: {report}");
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = app::run(&args) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
