//! Status bar — one line with terms, serving source, progress and the
//! current feed error. Key hints are right-aligned.

use linkwall_feeds::{FeedState, FeedView};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct StatusBar<'a> {
    view: &'a FeedView,
}

impl<'a> StatusBar<'a> {
    pub fn new(view: &'a FeedView) -> Self {
        Self { view }
    }
}

pub(crate) fn state_label(view: &FeedView) -> &'static str {
    match view.state {
        FeedState::Idle if view.terms.is_empty() => "no terms",
        FeedState::Idle => "idle",
        FeedState::AwaitingHistory => "connecting",
        FeedState::Fetching(_) => "loading",
        FeedState::FetchingMore => "loading more",
        FeedState::Ready if view.has_more => "ready",
        FeedState::Ready => "end of results",
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.view;
        let mut spans = vec![Span::styled(
            format!(" {} ", view.terms.join(", ")),
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
        )];
        if let Some(source) = view.source {
            spans.push(Span::raw(format!(" {source}")));
        }
        spans.push(Span::raw(format!(
            " · {} cards · {}",
            view.cards.len(),
            state_label(view)
        )));
        if !view.muted.is_empty() {
            spans.push(Span::raw(format!(" · {} muted", view.muted.len())));
        }
        if let Some(ref err) = view.error {
            spans.push(Span::styled(
                format!("  {err}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        let hint = " q:quit  ?:help ";
        let hint_x = area.right().saturating_sub(hint.len() as u16);
        buf.set_string(hint_x, area.y, hint, Style::default().add_modifier(Modifier::DIM));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_feed_state() {
        let mut view = FeedView::default();
        assert_eq!(state_label(&view), "no terms");
        view.terms = vec!["rust".into()];
        view.state = FeedState::Ready;
        assert_eq!(state_label(&view), "end of results");
        view.has_more = true;
        assert_eq!(state_label(&view), "ready");
    }
}
