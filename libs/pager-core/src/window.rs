//! Page-window planning.
//!
//! Given a result count and the current page, decide which page controls a
//! renderer should show. The output is pure data; no markup is produced
//! here.

use serde::{Deserialize, Serialize};

/// One entry in the rendered pagination window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageItem {
    Page { number: u64, active: bool },
    Prev { target: u64 },
    Next { target: u64 },
    Ellipsis,
    JumpTo,
}

/// Plan the visible window for `total_items` results at `page_size` per
/// page, viewed from `current_page` (1-based).
///
/// The width thresholds are hand-tuned legacy constants; the emitted
/// sequences are pinned by scenario tests and must not be re-derived. The
/// window stays bounded regardless of the page count while always keeping
/// the first two pages, the last two pages and the neighbourhood of the
/// current page reachable.
pub fn plan(total_items: u64, page_size: u64, current_page: u64, jump_to: bool) -> Vec<PageItem> {
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };

    // A single page needs no pager at all.
    if total_pages <= 1 {
        return Vec::new();
    }

    let mut items = Vec::new();
    if current_page > 1 {
        items.push(PageItem::Prev {
            target: current_page - 1,
        });
    }

    let mut last_emitted: Option<u64> = None;
    for i in 1..=total_pages {
        // The first two pages are always visible.
        let mut show = i <= 2;
        // Two pages on either side of the current one.
        show |= i + 2 >= current_page && i <= current_page + 2;
        // Widen the window near either end so the width stays constant.
        show |= current_page < 5 && i <= 7;
        show |= current_page + 5 > total_pages && i + 6 >= total_pages;
        // The last two pages are always visible.
        show |= i + 1 >= total_pages;

        if !show {
            continue;
        }
        if let Some(previous) = last_emitted {
            if previous + 1 != i {
                items.push(PageItem::Ellipsis);
            }
        }
        items.push(PageItem::Page {
            number: i,
            active: i == current_page,
        });
        last_emitted = Some(i);
    }

    if current_page < total_pages {
        items.push(PageItem::Next {
            target: current_page + 1,
        });
    }
    // The jump-to control sits right after `next`, or closes the window
    // when the last page is current.
    if jump_to {
        items.push(PageItem::JumpTo);
    }

    items
}
