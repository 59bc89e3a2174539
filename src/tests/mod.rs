#[cfg(feature = "log")]
use log::LevelFilter;


pub(crate) fn init_logger() {
    #[cfg(feature = "log")]
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Error)
        .filter(Some("delta_integrator"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}
