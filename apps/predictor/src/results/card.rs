//! Result card: presentation of one role match.
//!
//! The base content (company, role, score, label, strengths, gaps, summary) is
//! always shown. Expanding only adds text derived from data already on the
//! card, so toggling never triggers any I/O.

#![allow(dead_code)]

use std::fmt::Write;

use crate::models::RoleMatch;
use crate::results::classifier::{classify, Classification, ColorTier};

/// Only the first three positions get an ordinal badge.
pub const BADGED_RANKS: usize = 3;
const SCORE_BAR_CELLS: usize = 20;

const EXPAND_LABEL: &str = "View Full Details";
const COLLAPSE_LABEL: &str = "Show Less";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Plain,
    Ansi,
}

/// Supplementary text revealed by expanding a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub explanation: String,
    pub match_quality: &'static str,
    pub strengths_found: usize,
    pub next_steps: Vec<String>,
}

/// Everything a card displays, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    pub badge: Option<String>,
    pub company_name: &'a str,
    pub role_title: &'a str,
    pub fit_score: u8,
    pub classification: Classification,
    pub strengths: &'a [String],
    pub gaps: &'a [String],
    pub summary: &'a str,
    pub details: Option<CardDetails>,
    pub toggle_label: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ResultCard<'a> {
    role: &'a RoleMatch,
    rank: Option<usize>,
    expanded: bool,
}

impl<'a> ResultCard<'a> {
    /// `rank` is the zero-based list position chosen by the caller; the card
    /// never re-sorts or recomputes it.
    pub fn new(role: &'a RoleMatch, rank: Option<usize>) -> Self {
        Self {
            role,
            rank,
            expanded: false,
        }
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn badge(&self) -> Option<String> {
        self.rank
            .filter(|&r| r < BADGED_RANKS)
            .map(|r| format!("#{}", r + 1))
    }

    pub fn view(&self) -> CardView<'a> {
        let role = self.role;
        let classification = classify(role.fit_score);

        CardView {
            badge: self.badge(),
            company_name: &role.company_name,
            role_title: &role.role_title,
            fit_score: role.fit_score,
            classification,
            strengths: &role.strengths,
            gaps: &role.gaps,
            summary: &role.summary,
            details: self.expanded.then(|| details_for(role, classification)),
            toggle_label: if self.expanded {
                COLLAPSE_LABEL
            } else {
                EXPAND_LABEL
            },
        }
    }

    pub fn render(&self, style: Style) -> String {
        render_view(&self.view(), style)
    }
}

fn details_for(role: &RoleMatch, classification: Classification) -> CardDetails {
    CardDetails {
        explanation: format!(
            "Our AI analyzed your resume against this role's requirements and found strong \
             alignment in key areas. Your experience and skills match {}% of the job requirements.",
            role.fit_score
        ),
        match_quality: classification.match_quality,
        strengths_found: role.strengths.len(),
        next_steps: vec![
            format!("Research {}'s recent projects and culture", role.company_name),
            "Tailor your resume to highlight relevant strengths".to_string(),
            "Prepare examples addressing the skill gaps identified".to_string(),
            "Connect with current employees on LinkedIn".to_string(),
        ],
    }
}

fn score_bar(score: u8) -> String {
    let filled = (usize::from(score.min(100)) * SCORE_BAR_CELLS + 50) / 100;
    format!(
        "[{}{}]",
        "█".repeat(filled),
        "░".repeat(SCORE_BAR_CELLS - filled)
    )
}

fn paint(text: &str, color: ColorTier, style: Style) -> String {
    match style {
        Style::Plain => text.to_string(),
        Style::Ansi => {
            let code = match color {
                ColorTier::Green => "32",
                ColorTier::Sky => "36",
                ColorTier::Amber => "33",
            };
            format!("\x1b[{code}m{text}\x1b[0m")
        }
    }
}

// Writes to a String never fail, hence the ignored fmt::Results.
fn render_view(view: &CardView<'_>, style: Style) -> String {
    let mut out = String::new();
    let color = view.classification.color();

    let badge = view.badge.as_deref().unwrap_or("  ");
    let _ = writeln!(out, "{badge}  {}", view.company_name);
    let _ = writeln!(out, "    {}", view.role_title);

    let score_line = format!(
        "Fit Score {:>3}/100 {} {}",
        view.fit_score,
        score_bar(view.fit_score),
        view.classification.label
    );
    let _ = writeln!(out, "    {}", paint(&score_line, color, style));

    let _ = writeln!(out, "    Strengths");
    for s in view.strengths {
        let _ = writeln!(out, "      ✓ {s}");
    }
    let _ = writeln!(out, "    Areas to Develop");
    for g in view.gaps {
        let _ = writeln!(out, "      ! {g}");
    }
    let _ = writeln!(out, "    AI Summary");
    let _ = writeln!(out, "      {}", view.summary);

    if let Some(details) = &view.details {
        let _ = writeln!(out, "    Why This Match?");
        let _ = writeln!(out, "      {}", details.explanation);
        let _ = writeln!(out, "    Match Quality: {}", details.match_quality);
        let _ = writeln!(out, "    Strengths Found: {}", details.strengths_found);
        let _ = writeln!(out, "    Next Steps");
        for step in &details.next_steps {
            let _ = writeln!(out, "      • {step}");
        }
    }

    let _ = writeln!(out, "    [ {} ]", view.toggle_label);
    out
}
