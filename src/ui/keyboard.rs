//! Result page renderer.
//!
//! Turns one page of catalogue matches plus the active browse state into
//! the inline keyboard: item rows, pagination row, facet rows, close row.
//! Every actionable button re-encodes the full state so the callback
//! handler can rebuild it without any server-side session.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::database::models::{CatalogueItem, Category, Quality};
use crate::search::filter::total_pages;
use crate::ui::callback::CallbackAction;
use crate::ui::templates::Messages;
use crate::utils::truncate_caption;

/// Browse state reconstructed from a button payload.
#[derive(Clone, Debug, PartialEq)]
pub struct BrowseState {
    pub query: String,
    pub page: u64,
    pub category: Option<Category>,
    pub quality: Option<Quality>,
}

impl BrowseState {
    /// Fresh state for a new search (page 0, no facets).
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 0,
            category: None,
            quality: None,
        }
    }
}

const CAPTION_LABEL_CHARS: usize = 50;

fn callback_button(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.into(), action.encode())
}

/// Render the full result keyboard for one page.
///
/// Row order is fixed: items, pagination (only when there is more than one
/// page), quality facets (descending, counts > 0 only), category facets,
/// close. Facet buttons for the active value carry a tick and encode the
/// previous value so the handler can treat the press as a toggle-off.
pub fn render_results(
    items: &[CatalogueItem],
    match_count: u64,
    per_page: u32,
    state: &BrowseState,
    quality_counts: &[(Quality, u64)],
    category_counts: &[(Category, u64)],
    messages: &Messages,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for item in items {
        let label = format!(
            "[{}] {}",
            item.file_size,
            truncate_caption(&item.caption, CAPTION_LABEL_CHARS)
        );
        rows.push(vec![callback_button(
            label,
            CallbackAction::Select { item_id: item.id },
        )]);
    }

    let pages = total_pages(match_count, per_page);
    if pages > 1 {
        let mut nav = Vec::new();
        if state.page > 0 {
            nav.push(callback_button(
                messages.button_prev,
                CallbackAction::Page {
                    query: state.query.clone(),
                    page: state.page as i64 - 1,
                    category: state.category,
                    quality: state.quality,
                },
            ));
        }
        nav.push(callback_button(
            format!("Page {}/{}", state.page + 1, pages),
            CallbackAction::Noop,
        ));
        if state.page + 1 < pages {
            nav.push(callback_button(
                messages.button_next,
                CallbackAction::Page {
                    query: state.query.clone(),
                    page: state.page as i64 + 1,
                    category: state.category,
                    quality: state.quality,
                },
            ));
        }
        rows.push(nav);
    }

    let quality_row: Vec<InlineKeyboardButton> = quality_counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(quality, _)| {
            let active = state.quality == Some(*quality);
            let label = if active {
                format!("{}{}", quality, messages.button_tick)
            } else {
                quality.to_string()
            };
            callback_button(
                label,
                CallbackAction::QualityToggle {
                    query: state.query.clone(),
                    quality: *quality,
                    category: state.category,
                    prev_quality: state.quality,
                },
            )
        })
        .collect();
    if !quality_row.is_empty() {
        rows.push(quality_row);
    }

    let category_row: Vec<InlineKeyboardButton> = category_counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(category, _)| {
            let base = match category {
                Category::Movie => messages.button_movies,
                Category::Series => messages.button_series,
            };
            let active = state.category == Some(*category);
            let label = if active {
                format!("{}{}", base, messages.button_tick)
            } else {
                base.to_string()
            };
            callback_button(
                label,
                CallbackAction::Filter {
                    query: state.query.clone(),
                    category: *category,
                    quality: state.quality,
                    prev_category: state.category,
                },
            )
        })
        .collect();
    if !category_row.is_empty() {
        rows.push(category_row);
    }

    rows.push(vec![callback_button(
        messages.button_close,
        CallbackAction::Close,
    )]);

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn item(id: i64) -> CatalogueItem {
        CatalogueItem {
            id,
            caption: format!("Inception 2010 1080p part{id}"),
            file_size: "1.40 GB".into(),
            category: Category::Movie,
            quality: Quality::P1080,
        }
    }

    fn data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(d) => d,
            other => panic!("unexpected button kind: {other:?}"),
        }
    }

    fn render(
        items: &[CatalogueItem],
        match_count: u64,
        state: &BrowseState,
    ) -> Vec<Vec<InlineKeyboardButton>> {
        let quality_counts = vec![(Quality::P1080, match_count)];
        let category_counts = vec![(Category::Movie, match_count)];
        render_results(
            items,
            match_count,
            5,
            state,
            &quality_counts,
            &category_counts,
            &Messages::default(),
        )
        .inline_keyboard
    }

    #[test]
    fn test_first_page_of_seven_matches() {
        let items: Vec<_> = (1..=5).map(item).collect();
        let rows = render(&items, 7, &BrowseState::new("inception"));

        // 5 item rows + nav + quality + category + close
        assert_eq!(rows.len(), 9);
        assert_eq!(data(&rows[0][0]), "select:1");

        let nav = &rows[5];
        assert_eq!(nav.len(), 2); // indicator + next, no previous on page 0
        assert_eq!(nav[0].text, "Page 1/2");
        assert_eq!(data(&nav[0]), "noop");
        assert_eq!(data(&nav[1]), "page:inception:1:none:none");
    }

    #[test]
    fn test_last_page_has_previous_but_no_next() {
        let items: Vec<_> = (6..=7).map(item).collect();
        let state = BrowseState {
            page: 1,
            ..BrowseState::new("inception")
        };
        let rows = render(&items, 7, &state);

        let nav = &rows[2];
        assert_eq!(nav.len(), 2);
        assert_eq!(data(&nav[0]), "page:inception:0:none:none");
        assert_eq!(nav[1].text, "Page 2/2");
    }

    #[test]
    fn test_single_page_has_no_nav_row() {
        let items: Vec<_> = (1..=3).map(item).collect();
        let rows = render(&items, 3, &BrowseState::new("inception"));
        // 3 item rows + quality + category + close
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().flatten().all(|b| data(b) != "noop"));
    }

    #[test]
    fn test_active_quality_toggles_off() {
        let state = BrowseState {
            quality: Some(Quality::P1080),
            ..BrowseState::new("inception")
        };
        let rows = render(&[], 3, &state);

        let quality_row = &rows[0];
        assert!(quality_row[0].text.ends_with(" ✅"));
        // Pressing the active value encodes it as both selected and
        // previous, which the handler resolves to "cleared".
        assert_eq!(data(&quality_row[0]), "quality:inception:1080p:none:1080p");
    }

    #[test]
    fn test_facet_rows_skip_zero_counts() {
        let quality_counts = vec![
            (Quality::P2160, 0),
            (Quality::P1080, 2),
            (Quality::P720, 0),
            (Quality::P480, 1),
        ];
        let category_counts = vec![(Category::Movie, 2), (Category::Series, 0)];
        let rows = render_results(
            &[],
            3,
            5,
            &BrowseState::new("dune"),
            &quality_counts,
            &category_counts,
            &Messages::default(),
        )
        .inline_keyboard;

        let quality_row = &rows[0];
        assert_eq!(quality_row.len(), 2);
        assert_eq!(quality_row[0].text, "1080p");
        assert_eq!(quality_row[1].text, "480p");

        let category_row = &rows[1];
        assert_eq!(category_row.len(), 1);
        assert_eq!(data(&category_row[0]), "filter:dune:movie:none:none");
    }

    #[test]
    fn test_close_row_is_last() {
        let rows = render(&[item(1)], 1, &BrowseState::new("inception"));
        let close = rows.last().unwrap();
        assert_eq!(close.len(), 1);
        assert_eq!(data(&close[0]), "close");
    }
}
