//! PDF reporter: the printable version of the HTML report, laid out as text
//! tables on A4 pages with the built-in Helvetica faces.

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};

use super::Reporter;
use crate::equity::{breakdown, contribution_totals, criterion_share, team_summary};
use crate::model::{ContributionType, Founder, HistoryEntry, Milestone, MilestoneStatus};
use crate::output::formatter::parse_hex;
use crate::output::{format_amount, format_weight, group_thousands};
use crate::state::AppState;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const BOTTOM: f32 = 25.0;
const FOOTER_Y: f32 = 12.0;
const ROW_HEIGHT: f32 = 6.0;

type Rgb8 = (u8, u8, u8);

const PURPLE: Rgb8 = (90, 50, 168);
const BLACK: Rgb8 = (0, 0, 0);
const GREY: Rgb8 = (100, 100, 100);
const LIGHT_GREY: Rgb8 = (150, 150, 150);

const FOOTER_TEXT: &str =
    "Generated by Equity Growth Compass | This document is for informational purposes only.";

pub struct PdfReporter {
    pub title: String,
    pub generated_on: NaiveDate,
}

impl PdfReporter {
    pub fn new() -> Self {
        Self {
            title: "Startup Equity Distribution Report".to_string(),
            generated_on: Local::now().date_naive(),
        }
    }

    pub fn with_date(generated_on: NaiveDate) -> Self {
        Self {
            generated_on,
            ..Self::new()
        }
    }

    fn equity_table(&self, canvas: &mut Canvas, founders: &[Founder]) {
        canvas.heading("Current Equity Distribution");
        canvas.header(&[(0.0, "Co-founder"), (70.0, "Role"), (140.0, "Equity")]);
        for founder in founders {
            canvas.ensure(ROW_HEIGHT);
            canvas.cell(0.0, &fit(&founder.name, 32), false, founder_color(founder));
            canvas.cell(70.0, &fit(&founder.role, 32), false, BLACK);
            canvas.cell(140.0, &format!("{:.2}%", founder.equity_percentage), true, BLACK);
            canvas.next_row();
        }
    }

    fn score_summary(&self, canvas: &mut Canvas, state: &AppState) {
        let summary = team_summary(&state.founders, &state.contribution_weights);
        canvas.heading("Global Score Summary");
        canvas.line(
            &format!("Total Team Score: {}", group_thousands(summary.total_score)),
            12.0,
            BLACK,
        );
        canvas.line(
            &format!("Average Founder Score: {:.1}", summary.average_score),
            12.0,
            BLACK,
        );
    }

    fn milestone_weights(&self, canvas: &mut Canvas, milestones: &[Milestone]) {
        canvas.heading("Milestone Weights");
        canvas.header(&[(0.0, "Milestone"), (90.0, "Status"), (140.0, "Weight")]);
        for milestone in milestones {
            let status = milestone.status();
            canvas.ensure(ROW_HEIGHT);
            canvas.cell(0.0, &fit(&milestone.name, 40), false, BLACK);
            canvas.cell(90.0, status.label(), false, status_color(status));
            canvas.cell(140.0, &format_weight(milestone.weight), true, BLACK);
            canvas.next_row();
        }
    }

    fn contribution_weights(&self, canvas: &mut Canvas, state: &AppState) {
        canvas.heading("Contribution Type Weights");
        canvas.header(&[(0.0, "Contribution Type"), (90.0, "Weight Multiplier")]);
        for kind in ContributionType::ALL {
            canvas.ensure(ROW_HEIGHT);
            canvas.cell(0.0, kind.label(), false, BLACK);
            canvas.cell(
                90.0,
                &format_weight(state.contribution_weights.get(kind)),
                true,
                BLACK,
            );
            canvas.next_row();
        }
    }

    fn founder_detail(&self, canvas: &mut Canvas, founder: &Founder, state: &AppState) {
        let detail = breakdown(
            founder,
            &state.contribution_weights,
            state.active_milestone_weight(),
        );

        // Keep the name with at least the criteria table
        canvas.ensure(12.0 + ROW_HEIGHT * 10.0);
        canvas.subheading(
            &fit(&format!("{} - {}", founder.name, founder.role), 70),
            founder_color(founder),
        );
        canvas.header(&[(0.0, "Criterion"), (90.0, "Score (0-10)"), (140.0, "Percentage")]);
        for (criterion, score) in founder.scores.iter() {
            canvas.ensure(ROW_HEIGHT);
            canvas.cell(0.0, criterion.label(), false, BLACK);
            canvas.cell(90.0, &score.to_string(), false, BLACK);
            canvas.cell(
                140.0,
                &format!("{:.1}%", criterion_share(score, detail.criteria_score)),
                false,
                BLACK,
            );
            canvas.next_row();
        }
        canvas.ensure(ROW_HEIGHT);
        canvas.cell(0.0, "Total Score", true, BLACK);
        canvas.cell(90.0, &detail.criteria_score.to_string(), true, BLACK);
        canvas.cell(140.0, "100%", true, BLACK);
        canvas.next_row();

        if !founder.contributions.is_empty() {
            self.contribution_ledger(canvas, founder);
        }

        canvas.ensure(ROW_HEIGHT);
        canvas.cell(0.0, "Equity Allocation", true, PURPLE);
        canvas.cell(
            90.0,
            &format!("Weighted total {:.1}", detail.weighted_total),
            false,
            PURPLE,
        );
        canvas.cell(140.0, &format!("{:.2}%", founder.equity_percentage), true, PURPLE);
        canvas.next_row();
        canvas.gap(4.0);
    }

    fn contribution_ledger(&self, canvas: &mut Canvas, founder: &Founder) {
        canvas.gap(2.0);
        canvas.subheading("Additional Contributions", BLACK);
        canvas.header(&[(0.0, "Type"), (25.0, "Amount"), (65.0, "Description"), (145.0, "Date")]);

        for kind in ContributionType::ALL {
            for contribution in founder.contributions.iter().filter(|c| c.kind == kind) {
                canvas.ensure(ROW_HEIGHT);
                canvas.cell(0.0, kind.badge(), false, BLACK);
                canvas.cell(25.0, &format_amount(kind, contribution.amount), false, BLACK);
                canvas.cell(65.0, &fit(&contribution.description, 40), false, BLACK);
                canvas.cell(
                    145.0,
                    &contribution.date.format("%Y-%m-%d").to_string(),
                    false,
                    BLACK,
                );
                canvas.next_row();
            }
        }

        let totals = contribution_totals(founder);
        let parts: Vec<String> = ContributionType::ALL
            .into_iter()
            .filter(|kind| totals.get(*kind) > 0.0)
            .map(|kind| format_amount(kind, totals.get(kind)))
            .collect();
        canvas.line(&format!("Totals: {}", parts.join(", ")), 10.0, GREY);
    }

    fn history(&self, canvas: &mut Canvas, history: &[HistoryEntry]) {
        if history.is_empty() {
            return;
        }
        canvas.heading("Equity Evolution History");
        for entry in history {
            canvas.ensure(12.0 + ROW_HEIGHT * 2.0);
            canvas.subheading(
                &format!(
                    "Milestone: {} - {}",
                    fit(&entry.milestone_name, 50),
                    entry.date.format("%Y-%m-%d")
                ),
                PURPLE,
            );
            canvas.header(&[(0.0, "Co-founder"), (90.0, "Equity %")]);
            for founder in &entry.founders {
                canvas.ensure(ROW_HEIGHT);
                canvas.cell(0.0, &fit(&founder.name, 40), false, founder_color(founder));
                canvas.cell(90.0, &format!("{:.2}%", founder.equity_percentage), false, BLACK);
                canvas.next_row();
            }
            canvas.gap(3.0);
        }
    }

    fn progress(&self, canvas: &mut Canvas, milestones: &[Milestone]) {
        let started = milestones.iter().any(|m| m.completed || m.current);
        if !started {
            return;
        }
        canvas.heading("Startup Progress");
        canvas.header(&[(0.0, "Milestone"), (90.0, "Status")]);
        for milestone in milestones {
            let status = milestone.status();
            canvas.ensure(ROW_HEIGHT);
            canvas.cell(0.0, &fit(&milestone.name, 40), false, BLACK);
            canvas.cell(90.0, status.label(), false, status_color(status));
            canvas.next_row();
        }
    }

    /// Lay out every section and return the finished document.
    pub fn generate(&self, state: &AppState) -> Result<Vec<u8>> {
        let mut canvas = Canvas::new(&self.title)?;

        canvas.line(&fit(&self.title, 60), 20.0, PURPLE);
        canvas.line(
            &format!("Generated on {}", self.generated_on.format("%Y-%m-%d")),
            10.0,
            GREY,
        );

        self.equity_table(&mut canvas, &state.founders);
        self.score_summary(&mut canvas, state);
        self.milestone_weights(&mut canvas, &state.milestones);
        self.contribution_weights(&mut canvas, state);

        canvas.heading("Detailed Scoring");
        for founder in &state.founders {
            self.founder_detail(&mut canvas, founder, state);
        }

        self.history(&mut canvas, &state.history);
        self.progress(&mut canvas, &state.milestones);

        let pages = canvas.page_count();
        let bytes = canvas.finish()?;
        tracing::debug!(pages, bytes = bytes.len(), "pdf report laid out");
        Ok(bytes)
    }
}

impl Default for PdfReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for PdfReporter {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, state: &AppState) -> Result<Vec<u8>> {
        self.generate(state)
    }
}

/// A cursor over A4 pages. `y` is the baseline of the next line, in mm from
/// the bottom edge.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    done: Vec<PdfLayerReference>,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Canvas {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            done: Vec::new(),
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn page_count(&self) -> usize {
        self.done.len() + 1
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let next = self.doc.get_page(page).get_layer(layer);
        self.done.push(std::mem::replace(&mut self.layer, next));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Start a new page unless `height` mm still fit above the footer.
    fn ensure(&mut self, height: f32) {
        if self.y - height < BOTTOM {
            self.new_page();
        }
    }

    fn write(
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        color: Rgb8,
    ) {
        layer.set_fill_color(rgb(color));
        layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn cell(&self, x: f32, text: &str, bold: bool, color: Rgb8) {
        let font = if bold { &self.bold } else { &self.regular };
        Self::write(&self.layer, font, text, 10.0, MARGIN + x, self.y, color);
    }

    fn next_row(&mut self) {
        self.y -= ROW_HEIGHT;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn line(&mut self, text: &str, size: f32, color: Rgb8) {
        let height = size * 0.5;
        self.ensure(height);
        Self::write(&self.layer, &self.regular, text, size, MARGIN, self.y, color);
        self.y -= height;
    }

    fn heading(&mut self, text: &str) {
        self.ensure(16.0);
        self.y -= 6.0;
        Self::write(&self.layer, &self.bold, text, 16.0, MARGIN, self.y, BLACK);
        self.y -= 9.0;
    }

    fn subheading(&mut self, text: &str, color: Rgb8) {
        self.ensure(12.0);
        Self::write(&self.layer, &self.bold, text, 12.0, MARGIN, self.y, color);
        self.y -= 7.0;
    }

    fn header(&mut self, columns: &[(f32, &str)]) {
        self.ensure(ROW_HEIGHT * 2.0);
        for (x, title) in columns {
            self.cell(*x, title, true, PURPLE);
        }
        self.next_row();
    }

    /// Stamp the footer and page number on every page, then serialize.
    fn finish(self) -> Result<Vec<u8>> {
        let Canvas {
            doc,
            layer,
            mut done,
            regular,
            ..
        } = self;
        done.push(layer);

        let total = done.len();
        for (i, page) in done.iter().enumerate() {
            Self::write(page, &regular, FOOTER_TEXT, 8.0, MARGIN, FOOTER_Y, LIGHT_GREY);
            Self::write(
                page,
                &regular,
                &format!("Page {} of {}", i + 1, total),
                8.0,
                PAGE_WIDTH - MARGIN - 15.0,
                FOOTER_Y,
                LIGHT_GREY,
            );
        }
        drop(done);

        doc.save_to_bytes().map_err(pdf_error)
    }
}

fn rgb((r, g, b): Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn founder_color(founder: &Founder) -> Rgb8 {
    parse_hex(&founder.color).unwrap_or(GREY)
}

fn status_color(status: MilestoneStatus) -> Rgb8 {
    match status {
        MilestoneStatus::Completed => (0, 128, 0),
        MilestoneStatus::InProgress => (0, 0, 255),
        MilestoneStatus::Pending => GREY,
    }
}

/// Cut text to `max_chars`; there is no text measurement for the built-in fonts.
fn fit(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn pdf_error<E: std::fmt::Debug>(err: E) -> anyhow::Error {
    anyhow!("Failed to build PDF document: {:?}", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Criterion;
    use crate::state::{NewContribution, NewFounder};

    fn team(size: usize) -> AppState {
        let mut state = AppState::new();
        for i in 0..size {
            let id = state
                .add_founder(NewFounder {
                    name: format!("Founder {}", i + 1),
                    role: "Co-founder".to_string(),
                    ..Default::default()
                })
                .unwrap()
                .id
                .clone();
            state
                .add_contribution(
                    &id,
                    NewContribution {
                        kind: ContributionType::Cash,
                        amount: 1000.0 * (i + 1) as f64,
                        description: "Seed".to_string(),
                    },
                )
                .unwrap();
        }
        state
    }

    fn render(state: &AppState) -> Vec<u8> {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        PdfReporter::with_date(date).generate(state).unwrap()
    }

    #[test]
    fn test_renders_pdf_document() {
        let mut state = team(2);
        let id = state.founders[0].id.clone();
        state.set_score(&id, Criterion::Role, 10).unwrap();
        state.complete_milestone("initial").unwrap();

        let bytes = render(&state);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_state_renders() {
        let bytes = render(&AppState::new());
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_report_spans_pages() {
        let short = render(&team(1));
        let long = render(&team(12));
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn test_canvas_breaks_pages_near_the_footer() {
        let mut canvas = Canvas::new("test").unwrap();
        assert_eq!(canvas.page_count(), 1);
        for _ in 0..60 {
            canvas.ensure(ROW_HEIGHT);
            canvas.cell(0.0, "row", false, BLACK);
            canvas.next_row();
        }
        assert!(canvas.page_count() >= 2);
        assert!(canvas.y >= BOTTOM - ROW_HEIGHT);
        assert!(canvas.finish().unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("Ada", 10), "Ada");
        assert_eq!(fit("International Expansion", 10), "Interna...");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(MilestoneStatus::Completed), (0, 128, 0));
        assert_eq!(status_color(MilestoneStatus::Pending), GREY);
    }
}
