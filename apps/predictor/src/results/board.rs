#![allow(dead_code)]

use crate::models::{AnalysisResult, RoleMatch};
use crate::results::card::{ResultCard, Style};

/// The results view: the received payload plus one expand cell per card,
/// indexed by list position. Cells are independent of each other.
#[derive(Debug, Clone)]
pub struct ResultBoard {
    result: AnalysisResult,
    expanded: Vec<bool>,
}

impl ResultBoard {
    pub fn new(result: AnalysisResult) -> Self {
        let expanded = vec![false; result.len()];
        Self { result, expanded }
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    pub fn matches(&self) -> &[RoleMatch] {
        &self.result.matches
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    /// Flips one card. Returns the new state, or `None` for an unknown index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let cell = self.expanded.get_mut(index)?;
        *cell = !*cell;
        Some(*cell)
    }

    pub fn expand_all(&mut self) {
        self.expanded.iter_mut().for_each(|cell| *cell = true);
    }

    pub fn card(&self, index: usize) -> Option<ResultCard<'_>> {
        let role = self.result.matches.get(index)?;
        Some(ResultCard::new(role, Some(index)).with_expanded(self.is_expanded(index)))
    }

    pub fn cards(&self) -> impl Iterator<Item = ResultCard<'_>> {
        (0..self.len()).filter_map(move |i| self.card(i))
    }

    pub fn render(&self, style: Style) -> String {
        if self.is_empty() {
            return "No matching roles were returned.\n".to_string();
        }
        self.cards()
            .map(|card| card.render(style))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
