//! Terminal rendering of view effects.

use anomaly_atlas_dashboard_models::Severity;
use anomaly_atlas_dashboard_models::analysis::RiskLevel;
use anomaly_atlas_dashboard_models::policy::Task;
use anomaly_atlas_view::analysis::AnalysisPage;
use anomaly_atlas_view::chart::{
    ChartHandle, ChartKind, ChartSlot, ChartSpec, ChartSurface, DistrictRow,
};
use anomaly_atlas_view::effect::{AffectedStateRow, FeatureView, PanelView, SummaryCards};
use anomaly_atlas_view::format::{format_number, format_percent};
use anomaly_atlas_view::policy::{PolicyCard, PolicyDetail, PolicyStats};
use anomaly_atlas_view::prediction::PredictionCard;
use anomaly_atlas_view::table::StateTable;
use anomaly_atlas_view::{
    Notification, NotificationLevel, SeverityTier, ViewEffect, classify_severity,
};
use console::{Color, Style, style};
use geo::Rect;

/// Width of the longest bar in a text chart.
const BAR_WIDTH: usize = 40;

#[must_use]
pub fn tier_style(tier: SeverityTier) -> Style {
    match tier {
        SeverityTier::Alert => Style::new().red().bold(),
        SeverityTier::Warning => Style::new().yellow(),
        SeverityTier::Success => Style::new().green(),
        SeverityTier::Neutral => Style::new().blue(),
    }
}

const fn severity_tier(severity: Severity) -> SeverityTier {
    anomaly_atlas_view::severity::tier_for(Some(severity))
}

fn risk_style(risk: RiskLevel) -> Style {
    match risk {
        RiskLevel::Critical => Style::new().red().bold(),
        RiskLevel::High => Style::new().red(),
        RiskLevel::Medium => Style::new().yellow(),
        RiskLevel::Low => Style::new().green(),
    }
}

/// Nearest 256-colour palette entry for a CSS `#RRGGBB`, `rgb(...)` or
/// `rgba(...)` colour. Alpha is ignored.
#[must_use]
pub fn css_color(css: &str) -> Option<Color> {
    let css = css.trim();
    let (r, g, b) = if let Some(hex) = css.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        (channel(0)?, channel(2)?, channel(4)?)
    } else {
        let inner = css
            .strip_prefix("rgba(")
            .or_else(|| css.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().ok());
        (parts.next()??, parts.next()??, parts.next()??)
    };

    let level = |c: u8| (u16::from(c) * 5 + 127) / 255;
    let index = 16 + 36 * level(r) + 6 * level(g) + level(b);
    u8::try_from(index).ok().map(Color::Color256)
}

/// Text lines for a chart: a title, then one row per data point.
///
/// Bars are scaled so the largest value spans `width` cells. Doughnuts
/// print each point's share of the total instead.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn chart_lines(chart: &ChartSpec, width: usize) -> Vec<String> {
    let label_width = chart
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = vec![chart.title.clone()];

    match chart.kind {
        ChartKind::Doughnut => {
            let total = chart.values.iter().copied().fold(0, u64::saturating_add);
            for (label, value) in chart.points() {
                let share = if total == 0 {
                    0.0
                } else {
                    value as f64 / total as f64 * 100.0
                };
                lines.push(format!(
                    "  {label:<label_width$}  {share:>5.1}%  {}",
                    format_number(value)
                ));
            }
        }
        ChartKind::Bar | ChartKind::HorizontalBar => {
            let max = chart.values.iter().copied().max().unwrap_or(0);
            for (label, value) in chart.points() {
                lines.push(format!(
                    "  {label:<label_width$}  {}  {}",
                    "█".repeat(bar_len(value, max, width)),
                    format_number(value)
                ));
            }
        }
    }

    lines
}

fn bar_len(value: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    let width64 = u64::try_from(width).unwrap_or(u64::MAX);
    usize::try_from(value.saturating_mul(width64) / max).unwrap_or(width)
}

/// Chart surface that prints charts to stdout.
#[derive(Debug, Default)]
pub struct TextChartSurface {
    next: u64,
    live: Vec<ChartHandle>,
}

impl TextChartSurface {
    /// Charts drawn and not yet disposed.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl ChartSurface for TextChartSurface {
    fn draw(&mut self, chart: &ChartSpec) -> ChartHandle {
        let mut lines = chart_lines(chart, BAR_WIDTH).into_iter();
        if let Some(title) = lines.next() {
            println!("{}", style(title).cyan().bold());
        }
        for (i, line) in lines.enumerate() {
            match chart.color_at(i).and_then(css_color) {
                Some(color) => println!("{}", Style::new().fg(color).apply_to(line)),
                None => println!("{line}"),
            }
        }
        println!();

        self.next += 1;
        let handle = ChartHandle(self.next);
        self.live.push(handle);
        handle
    }

    fn dispose(&mut self, handle: ChartHandle) {
        self.live.retain(|h| *h != handle);
        log::trace!("Disposed chart {handle:?}");
    }
}

pub fn print_summary(cards: &SummaryCards) {
    println!("{}", style("National summary").bold());
    println!("  Total records:        {}", cards.total_records);
    println!("  Total anomalies:      {}", cards.total_anomalies);
    println!("  Anomaly rate:         {}", cards.anomaly_rate);
    println!("  Verified fixed:       {}", cards.verified_fixed);
    println!("  Pending verification: {}", cards.pending_verification);
    println!("  Fix progress:         {}", cards.fix_progress);
    println!("  Last updated:         {}", style(&cards.last_updated).dim());
    println!("  Data as of:           {}", style(&cards.data_as_of).dim());
    println!();
}

pub fn print_affected(rows: &[AffectedStateRow]) {
    if rows.is_empty() {
        return;
    }
    println!("{}", style("Most affected states").bold());
    for row in rows {
        println!("  {:>2}. {:<24} {}", row.rank, row.state, row.anomalies);
    }
    println!();
}

pub fn print_states(table: &StateTable) {
    println!(
        "{}",
        style(format!(
            "{:<28} {:>10} {:>10} {:>8}  severity",
            "state", "records", "anomalies", "rate"
        ))
        .bold()
    );
    for stat in table.iter() {
        let tier = classify_severity(Some(stat));
        let rate = format_percent(stat.anomaly_rate);
        println!(
            "{:<28} {:>10} {:>10} {rate:>8}  {}",
            stat.state,
            format_number(stat.total_records),
            format_number(stat.total_anomalies),
            tier_style(tier).apply_to(tier.label())
        );
    }
    println!();
}

pub fn print_map(features: &[FeatureView]) {
    println!("{}", style("State boundaries").bold());
    for feature in features {
        let marker = tier_style(feature.tier).apply_to("■");
        let title = if feature.style.weight > 1 {
            style(&feature.tooltip.title).underlined().to_string()
        } else {
            feature.tooltip.title.clone()
        };
        let details = feature.tooltip.lines.join(" | ");
        let anchor = feature
            .anchor
            .map(|p| format!(" @ {:.2}, {:.2}", p.y(), p.x()))
            .unwrap_or_default();
        println!("  {marker} {title:<28} {}{anchor}", style(details).dim());
    }
    println!();
}

pub fn print_extent(extent: &Rect<f64>) {
    println!(
        "{}",
        style(format!(
            "Extent: lat {:.2} to {:.2}, lng {:.2} to {:.2}",
            extent.min().y,
            extent.max().y,
            extent.min().x,
            extent.max().x
        ))
        .dim()
    );
}

pub fn print_districts(state: &str, rows: &[DistrictRow]) {
    println!("{}", style(format!("{state} districts")).bold());
    println!(
        "{}",
        style(format!("  {:<28} {:>10} {:>10}", "district", "records", "anomalies")).dim()
    );
    for row in rows {
        println!(
            "  {:<28} {:>10} {:>10}",
            row.district, row.records, row.anomalies
        );
    }
    println!();
}

pub fn print_prediction(card: &PredictionCard) {
    println!(
        "{} {}",
        style(&card.state).bold(),
        tier_style(card.label_tier).apply_to(&card.label)
    );
    println!(
        "  Risk score:  {}",
        tier_style(card.score_tier).apply_to(format!("{}/100", card.score))
    );
    println!("  Confidence:  {}", card.confidence);
    println!("  Action:      {}", card.recommended_action);
    if !card.features.is_empty() {
        println!("  Top features:");
        for (feature, value) in &card.features {
            println!("    {feature:<28} {value}");
        }
    }
    println!();
}

pub fn print_policy_stats(stats: &PolicyStats) {
    println!(
        "{} policies: {} critical, {} high, {} medium",
        stats.total,
        risk_style(RiskLevel::Critical).apply_to(stats.critical),
        risk_style(RiskLevel::High).apply_to(stats.high),
        risk_style(RiskLevel::Medium).apply_to(stats.medium),
    );
    println!();
}

pub fn print_policy_cards(cards: &[PolicyCard]) {
    for card in cards {
        println!(
            "  #{:<3} [{}] {}",
            card.id,
            risk_style(card.severity).apply_to(card.severity),
            style(&card.title).bold()
        );
        println!("        {}", card.reason);
        println!(
            "        {}",
            style(format!("Executor: {} | Impact: {}", card.executor, card.impact)).dim()
        );
    }
    println!();
}

pub fn print_policy_detail(detail: &PolicyDetail) {
    let card = &detail.card;
    println!(
        "{} [{}]",
        style(&card.title).bold().underlined(),
        risk_style(card.severity).apply_to(card.severity)
    );
    println!("  Reason: {}", card.reason);
    if !detail.steps.is_empty() {
        println!("  Implementation steps:");
        for (i, step) in detail.steps.iter().enumerate() {
            println!("    {}. {step}", i + 1);
        }
    }
    println!("  Executor:         {}", card.executor);
    println!("  Expected outcome: {}", detail.expected_outcome);
    println!("  Estimated impact: {}", card.impact);
    println!();
}

pub fn print_task(task: &Task) {
    println!(
        "Task #{} {} ({}, {})",
        task.id,
        style(&task.title).bold(),
        task.status,
        task.priority
    );
}

/// Prints the panel, drawing its district chart into `slot`.
pub fn print_panel(panel: &PanelView, surface: &mut TextChartSurface, slot: &mut ChartSlot) {
    match panel {
        PanelView::Placeholder(text) => {
            slot.clear(surface);
            println!("{}", style(text).dim());
        }
        PanelView::Loading { state } => println!("Loading {state}..."),
        PanelView::Shown(content) => {
            println!("{}", style(&content.title).bold().underlined());
            println!("  Records:          {}", content.records);
            println!("  Anomalies:        {}", content.anomalies);
            println!("  Anomaly rate:     {}", content.anomaly_rate);
            println!("  Invalid PIN rate: {}", content.invalid_pin_rate);
            println!("  Duplicate rate:   {}", content.duplicate_rate);
            println!("  Missing DOB rate: {}", content.missing_dob_rate);
            if !content.top_anomaly_types.is_empty() {
                println!("  Top anomaly types:");
                for (kind, count) in &content.top_anomaly_types {
                    println!("    {kind:<28} {count}");
                }
            }
            println!();
            if content.district_chart.labels.is_empty() {
                slot.clear(surface);
            } else {
                slot.show(surface, &content.district_chart);
            }
        }
    }
}

pub fn print_notifications(notifications: &[Notification]) {
    for note in notifications {
        let label = match note.level {
            NotificationLevel::Info => style("info").cyan(),
            NotificationLevel::Warning => style("warning").yellow(),
            NotificationLevel::Error => style("error").red().bold(),
        };
        eprintln!("{label}: {}", note.message);
    }
}

/// Prints every effect in order.
pub fn print_effects(
    effects: &[ViewEffect],
    surface: &mut TextChartSurface,
    slot: &mut ChartSlot,
) {
    for effect in effects {
        match effect {
            ViewEffect::SummaryCards(cards) => print_summary(cards),
            ViewEffect::AffectedStates(rows) => print_affected(rows),
            ViewEffect::FitBounds(extent) => print_extent(extent),
            ViewEffect::MapStyles(features) => print_map(features),
            ViewEffect::Panel(panel) => print_panel(panel, surface, slot),
            ViewEffect::Notify(note) => print_notifications(std::slice::from_ref(note)),
        }
    }
}

/// Chart slots of the analysis page.
#[derive(Debug, Default)]
pub struct AnalysisSlots {
    charts: [ChartSlot; 4],
}

pub fn print_analysis(
    page: &AnalysisPage,
    surface: &mut TextChartSurface,
    slots: &mut AnalysisSlots,
) {
    println!("{}", style("Analysis report").bold());
    println!("  Records analyzed: {}", page.total_analyzed);
    println!("  Analysis date:    {}", page.analysis_date);
    println!();

    for (slot, chart) in slots.charts.iter_mut().zip(page.charts()) {
        slot.show(surface, chart);
    }

    if !page.warnings.is_empty() {
        println!("{}", style("Correlation warnings").bold());
        for warning in &page.warnings {
            let severity = tier_style(severity_tier(warning.severity)).apply_to(warning.severity);
            println!("  [{severity}] {} ({})", warning.text, warning.correlation);
        }
        println!();
    }

    if !page.patterns.is_empty() {
        println!("{}", style("Suspicious patterns").bold());
        for pattern in &page.patterns {
            println!(
                "  [{}] {} (affected records: {})",
                risk_style(pattern.risk_level).apply_to(pattern.risk_level),
                pattern.pattern,
                pattern.affected
            );
        }
        println!();
    }

    if !page.anomaly_types.is_empty() {
        println!("{}", style("Anomaly types").bold());
        for (kind, count) in &page.anomaly_types {
            println!("  {kind:<28} {count} cases detected");
        }
        println!();
    }
}
