//! Marks the active entry's token on the scene.
//!
//! The marker is a border colour. Projection is derived from the turn state
//! every time and never read back, so a marker removed by hand simply
//! reappears on the next change.

use serde::{Deserialize, Serialize};
use tracker_core::ItemId;

use crate::host::{Border, ItemPatch, Result, Roster, RosterItem};

/// Border colour that means "no border" to the host.
pub const CLEARED_COLOR: &str = "none";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightStyle {
    pub color: String,
    pub width: u32,
}

impl HighlightStyle {
    pub const DEFAULT_COLOR: &'static str = "#FF9900";
    pub const DEFAULT_WIDTH: u32 = 5;

    pub fn border(&self) -> Border {
        Border {
            color: self.color.clone(),
            width: self.width,
        }
    }

    fn marks(&self, item: &RosterItem) -> bool {
        item.border
            .as_ref()
            .is_some_and(|border| border.color == self.color)
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Self::DEFAULT_COLOR.to_owned(),
            width: Self::DEFAULT_WIDTH,
        }
    }
}

/// Patches that move the marker onto `target` (or remove it everywhere when
/// `target` is `None`). Items already in the right state get no patch.
pub fn plan(items: &[RosterItem], target: Option<&ItemId>, style: &HighlightStyle) -> Vec<ItemPatch> {
    let wanted = style.border();
    items
        .iter()
        .filter_map(|item| {
            if Some(&item.id) == target {
                (item.border.as_ref() != Some(&wanted)).then(|| ItemPatch {
                    id: item.id.clone(),
                    border: wanted.clone(),
                })
            } else if style.marks(item) {
                let width = item.border.as_ref().map_or(0, |border| border.width);
                Some(ItemPatch {
                    id: item.id.clone(),
                    border: Border {
                        color: CLEARED_COLOR.to_owned(),
                        width,
                    },
                })
            } else {
                None
            }
        })
        .collect()
}

/// Reads the roster, plans and applies the patches in a single call.
/// Returns the number of items patched.
pub async fn project<R>(roster: &R, target: Option<&ItemId>, style: &HighlightStyle) -> Result<usize>
where
    R: Roster + ?Sized,
{
    let items = roster.items().await?;
    let patches = plan(&items, target, style);
    let count = patches.len();
    if count > 0 {
        roster.update_items(patches).await?;
    }
    tracing::debug!(target: "tracker::highlight", target_item = ?target, patched = count, "projected highlight");
    Ok(count)
}
