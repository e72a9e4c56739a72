use vortex::VortexConfig;

fn main() {
    env_logger::init();

    if let Err(e) = vortex::run(VortexConfig::default()) {
        log::error!("vortex exited with error: {e}");
        std::process::exit(1);
    }
}
