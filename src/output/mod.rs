mod progress;
mod report;
mod styling;
mod tables;

pub use progress::spinner;
pub use report::{print_pipeline_report, print_repositories};
use styling::{dim, magenta_bold};

/// Prints the pipescope banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔭 pipescope"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Bitbucket Pipelines health reporter")
    );
}
