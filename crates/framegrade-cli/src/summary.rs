use std::path::Path;

use console::Style;
use framegrade_core::pipeline::AggregateReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    good: Style,
    fair: Style,
    poor: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            fair: Style::new().yellow(),
            poor: Style::new().red(),
            path: Style::new().underlined(),
        }
    }

    fn score(&self, score: f64) -> &Style {
        if score >= 0.7 {
            &self.good
        } else if score >= 0.4 {
            &self.fair
        } else {
            &self.poor
        }
    }
}

/// Print one input's mean and worst table.
pub fn print_report(path: &Path, report: &AggregateReport, weighted: Option<u32>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.path.apply_to(path.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(report.frames_processed)
    );
    if let Some(score) = weighted {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Overall"),
            s.score(score as f64 / 100.0).apply_to(format!("{score}/100"))
        );
    }
    println!();
    println!(
        "    {:<14}{:>10}{:>14}{:>10}{:>14}",
        s.header.apply_to("Metric"),
        s.header.apply_to("Mean"),
        s.header.apply_to("Mean raw"),
        s.header.apply_to("Worst"),
        s.header.apply_to("Worst raw"),
    );
    for (mean, worst) in report.mean.iter().zip(&report.worst) {
        println!(
            "    {:<14}{:>10}{:>14.6}{:>10}{:>14.6}",
            s.label.apply_to(mean.name),
            s.score(mean.score).apply_to(format!("{:.3}", mean.score)),
            mean.raw,
            s.score(worst.score).apply_to(format!("{:.3}", worst.score)),
            worst.raw,
        );
    }
}

/// Print inputs ordered by overall score, best first.
pub fn print_ranking<'a>(ranked: impl Iterator<Item = (&'a Path, u32)>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Ranking"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(7)));
    for (rank, (path, score)) in ranked.enumerate() {
        println!(
            "  {:>3}  {:>7}  {}",
            rank + 1,
            s.score(score as f64 / 100.0).apply_to(format!("{score}/100")),
            path.display()
        );
    }
}
