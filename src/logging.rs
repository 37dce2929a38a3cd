use tracing_subscriber::EnvFilter;

pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "kira_sepsisrisk=info",
        1 => "kira_sepsisrisk=debug",
        _ => "kira_sepsisrisk=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
