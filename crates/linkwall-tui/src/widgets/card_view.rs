//! Highlight mode — the selected card on its own, with its full message.
//!
//! Also home to [`card_lines`], the text layout every card shares with the
//! overview grid.

use linkwall_core::{Card, MediaKind, Mention, VisibilityMode};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

pub(crate) fn kind_label(card: &Card) -> &'static str {
    match (card.kind, card.mode) {
        (MediaKind::Text, _) => "text",
        (MediaKind::Image, _) => "image",
        (MediaKind::Video, _) => "video",
        (MediaKind::Embed, VisibilityMode::Embed) => "embed",
        (MediaKind::Embed, _) | (MediaKind::Link, _) => "link",
    }
}

/// Title for a card's border: platform tag and kind, live marker.
pub(crate) fn card_title(card: &Card) -> String {
    let host = card.display_host();
    let tag = if host.is_empty() { card.platform.to_string() } else { host };
    let live = if card.is_streaming { " ●" } else { "" };
    format!(" {tag} · {}{live} ", kind_label(card))
}

/// Body lines for a card: author line, message, link target.
pub(crate) fn card_lines<'a>(
    card: &'a Card,
    mention: Option<&'a Mention>,
    timestamp_format: Option<&str>,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    if let Some(m) = mention {
        let mut head = vec![Span::styled(
            m.nick.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )];
        if let Some(fmt) = timestamp_format {
            head.push(Span::styled(
                format!("  {}", m.timestamp.format(fmt)),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        lines.push(Line::from(head));
        lines.push(Line::raw(m.text.as_str()));
    }
    if !card.url.is_empty() {
        lines.push(Line::styled(
            card.url.as_str(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        ));
    }
    lines
}

pub struct CardView<'a> {
    card: Option<&'a Card>,
    mention: Option<&'a Mention>,
    position: (usize, usize),
    timestamp_format: Option<&'a str>,
}

impl<'a> CardView<'a> {
    /// `position` is `(cursor, total)`.
    pub fn new(
        card: Option<&'a Card>,
        mention: Option<&'a Mention>,
        position: (usize, usize),
        timestamp_format: Option<&'a str>,
    ) -> Self {
        Self { card, mention, position, timestamp_format }
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(card) = self.card else {
            Paragraph::new("no cards yet")
                .block(Block::bordered())
                .render(area, buf);
            return;
        };

        let (cursor, total) = self.position;
        let block = Block::bordered()
            .title(card_title(card))
            .title_bottom(Line::from(format!(" {}/{} ", cursor + 1, total)).right_aligned())
            .border_style(Style::default().add_modifier(Modifier::BOLD));

        let mut lines = card_lines(card, self.mention, self.timestamp_format);
        if let Some(ref embed) = card.embed_url {
            lines.push(Line::default());
            lines.push(Line::styled(
                format!("embed: {embed}"),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        if card.source_url != card.url && !card.source_url.is_empty() {
            lines.push(Line::styled(
                format!("via: {}", card.source_url),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        if let Some(m) = self.mention {
            if !m.matched_terms.is_empty() {
                lines.push(Line::styled(
                    format!("matched: {}", m.matched_terms.join(", ")),
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
