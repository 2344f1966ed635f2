use std::fmt::Write;

use comfy_table::Cell;

use crate::bitbucket::Repository;
use crate::report::ReportRow;

use super::styling::{bright, bright_yellow, dim};
use super::tables::{color_coded_success_cell, create_table, cyan_header};

/// Prints one repository's pipeline health table to stdout.
///
/// Success cells are color coded: green above 80%, yellow between 50% and
/// 80%, red below 50%.
pub fn print_pipeline_report(repo_name: &str, rows: &[ReportRow]) {
    println!("{}", render_pipeline_report(repo_name, rows));
}

/// Prints the workspace repository listing to stdout.
pub fn print_repositories(workspace: &str, repos: &[Repository]) {
    println!("{}", render_repositories(workspace, repos));
}

fn render_pipeline_report(repo_name: &str, rows: &[ReportRow]) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} {}",
        bright("📋"),
        bright(format!("Pipelines report for {repo_name}")).underlined()
    );

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Target",
        "Success",
        "Avg Time",
        "Last Failure",
        "Last Success",
    ]));

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.target),
            color_coded_success_cell(&row.success, row.success_rate),
            Cell::new(&row.avg_time),
            Cell::new(&row.last_failure),
            Cell::new(&row.last_success),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

fn render_repositories(workspace: &str, repos: &[Repository]) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} {}",
        bright("📦"),
        bright(format!("Repositories in {workspace}")).underlined()
    );

    if repos.is_empty() {
        let _ = writeln!(
            output,
            "{}",
            bright_yellow("No recently updated repositories found.")
        );
        return output;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&["Slug", "Name", "Last Updated"]));

    for repo in repos {
        let updated = repo.updated_on.map_or_else(
            || "N/A".to_string(),
            |updated| updated.format("%Y-%m-%d %H:%M UTC").to_string(),
        );

        table.add_row(vec![
            Cell::new(&repo.slug),
            Cell::new(&repo.name),
            Cell::new(updated),
        ]);
    }

    let _ = writeln!(output, "{table}");
    let _ = writeln!(output, "{}", dim(format!("{} repositories", repos.len())));
    output
}
