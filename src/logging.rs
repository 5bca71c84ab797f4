use std::sync::Mutex;

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

lazy_static! {
    static ref LOG_INITIALIZED: Mutex<bool> = Mutex::new(false);
}

/// Initialize logging if you set the environment variable `RUST_LOG` to a
/// non-empty value.  Because of limitations in shell-scripts driving our
/// tests, RUST_LOG is frequently set unconditionally but potentially with an
/// empty value, and we don't want that to be interpreted as a desire to
/// enable logging.
pub fn init_logging() {
    {
        let mut initialized = LOG_INITIALIZED.lock().unwrap();
        if *initialized {
            return;
        }
        *initialized = true;
    }

    if let Ok(rustlog) = std::env::var("RUST_LOG") {
        if !rustlog.is_empty() {
            if let Ok(env_filter) = EnvFilter::try_from_default_env() {
                let _ = tracing_subscriber::fmt()
                    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
                    .compact()
                    // We primarily expect this to go in a log which can be
                    // excerpted for email purposes, and so ANSI isn't helpful
                    // for this.
                    .with_ansi(false)
                    // In general we don't care about the wall time that much,
                    // and it takes up a lot of columns.
                    .without_time()
                    .with_env_filter(env_filter)
                    .try_init();
            }
        }
    }
}
