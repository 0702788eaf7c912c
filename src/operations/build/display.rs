//! Build summary output

use console::Style;

use super::BuildSummary;

/// Print the build summary to stdout
pub fn print_build_summary(summary: &BuildSummary) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let report = &summary.report;

    if summary.dry_run {
        println!(
            "[DRY RUN] Would build {} into {}",
            bold.apply_to(&summary.name),
            dim.apply_to(summary.output.display())
        );
    } else {
        println!(
            "Built {} into {}",
            bold.apply_to(&summary.name),
            dim.apply_to(summary.output.display())
        );
    }

    println!("  {} {}", bold.apply_to("Paths merged:"), report.merged);
    println!("  {} {}", bold.apply_to("Paths aliased:"), report.aliased);
    println!(
        "  {} {} by target, {} by higher-priority fallbacks",
        bold.apply_to("Paths shadowed:"),
        report.shadowed_by_target,
        report.shadowed_by_fallback
    );
    println!("  {} {}", bold.apply_to("Assets appended:"), summary.appended_assets);
    println!("  {} {}", bold.apply_to("Bundles appended:"), summary.payloads.len());

    for payload in &summary.payloads {
        println!(
            "    - {} {}",
            Style::new().cyan().apply_to(&payload.bundle),
            dim.apply_to(format!("({})", payload.res_version))
        );
    }
}
