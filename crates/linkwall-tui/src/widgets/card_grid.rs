//! Overview mode — every card in a masonry grid.
//!
//! Column assignment comes from [`linkwall_core::layout::pack_cards`]; this
//! widget only turns estimated pixel heights into terminal rows and scrolls
//! so the selected card stays on screen.

use crate::widgets::card_view::{card_lines, card_title};
use linkwall_core::layout::{estimate_height, pack_cards, Column};
use linkwall_core::{Card, Mention};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget, Wrap},
};

/// Estimated pixels per terminal row.
const ROW_PX: u32 = 20;
const MIN_ROWS: u16 = 4;

/// A card's position in the unscrolled grid, in terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub card: usize,
    pub column: usize,
    pub top: u32,
    pub rows: u16,
}

pub fn rows_for(card: &Card, mentions: &[Mention]) -> u16 {
    let len = card.mention_in(mentions).map_or(0, |m| m.text.chars().count());
    let px = estimate_height(card, len);
    (px.div_ceil(ROW_PX) as u16).max(MIN_ROWS)
}

/// Stack each column's cards top to bottom.
pub fn place(columns: &[Column], rows: impl Fn(usize) -> u16) -> Vec<Placement> {
    let mut out = Vec::new();
    for (column, col) in columns.iter().enumerate() {
        let mut top = 0u32;
        for &card in &col.items {
            let r = rows(card);
            out.push(Placement { card, column, top, rows: r });
            top += r as u32;
        }
    }
    out
}

/// First visible row so that `selected` is fully on screen.
pub fn scroll_for(placements: &[Placement], selected: usize, viewport_rows: u16) -> u32 {
    let Some(p) = placements.iter().find(|p| p.card == selected) else {
        return 0;
    };
    let bottom = p.top + p.rows as u32;
    bottom.saturating_sub(viewport_rows as u32).min(p.top)
}

pub struct CardGrid<'a> {
    cards: &'a [Card],
    mentions: &'a [Mention],
    selected: usize,
    columns: usize,
    timestamp_format: Option<&'a str>,
}

impl<'a> CardGrid<'a> {
    pub fn new(
        cards: &'a [Card],
        mentions: &'a [Mention],
        selected: usize,
        columns: usize,
        timestamp_format: Option<&'a str>,
    ) -> Self {
        Self { cards, mentions, selected, columns: columns.max(1), timestamp_format }
    }
}

impl Widget for CardGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.cards.is_empty() {
            Paragraph::new("no cards yet").render(area, buf);
            return;
        }

        let columns = pack_cards(self.cards, self.mentions, self.columns);
        let placements = place(&columns, |i| rows_for(&self.cards[i], self.mentions));
        let scroll = scroll_for(&placements, self.selected, area.height);
        let col_width = area.width / self.columns as u16;

        for p in &placements {
            let top = p.top as i64 - scroll as i64;
            let bottom = top + p.rows as i64;
            if bottom <= 0 || top >= area.height as i64 {
                continue;
            }
            // Cards straddling the edges are clipped to the viewport.
            let y = area.y + top.max(0) as u16;
            let height = (bottom.min(area.height as i64) - top.max(0)) as u16;
            let rect = Rect {
                x: area.x + col_width * p.column as u16,
                y,
                width: col_width,
                height,
            };

            let card = &self.cards[p.card];
            let border = if p.card == self.selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            let block = Block::bordered().title(card_title(card)).border_style(border);
            let lines = card_lines(card, card.mention_in(self.mentions), self.timestamp_format);
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .render(rect, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkwall_core::layout::pack;

    #[test]
    fn placements_stack_within_columns() {
        let cols = pack(&[100, 100, 100, 100], 2);
        let placed = place(&cols, |_| 5);
        assert_eq!(
            placed,
            vec![
                Placement { card: 0, column: 0, top: 0, rows: 5 },
                Placement { card: 2, column: 0, top: 5, rows: 5 },
                Placement { card: 1, column: 1, top: 0, rows: 5 },
                Placement { card: 3, column: 1, top: 5, rows: 5 },
            ]
        );
    }

    #[test]
    fn scroll_keeps_selection_visible() {
        let cols = pack(&[100; 6], 1);
        let placed = place(&cols, |_| 5);
        assert_eq!(scroll_for(&placed, 0, 12), 0);
        assert_eq!(scroll_for(&placed, 2, 12), 3);
        assert_eq!(scroll_for(&placed, 5, 12), 18);
        // taller than the viewport: align the top
        assert_eq!(scroll_for(&placed, 1, 3), 5);
    }
}
