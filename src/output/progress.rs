use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::bright_yellow;

/// Spinner shown on stderr while a fetch is in flight.
pub fn spinner(message: impl std::fmt::Display) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(bright_yellow(message).to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
