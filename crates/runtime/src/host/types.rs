//! Value types exchanged with the host platform.

use serde::{Deserialize, Serialize};
use tracker_core::{Candidate, ItemId};

/// Room metadata: a flat JSON mapping shared by every client in the room.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Scene layer an item lives on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Layer {
    Map,
    Prop,
    Mount,
    Character,
    Attachment,
    Note,
    Text,
    Drawing,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ItemKind {
    Image,
    Shape,
    Label,
    Path,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub color: String,
    pub width: u32,
}

/// One item in the scene roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterItem {
    pub id: ItemId,
    pub name: String,
    /// Label rendered on the token, if any.
    #[serde(default)]
    pub plain_text: Option<String>,
    pub layer: Layer,
    pub kind: ItemKind,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub border: Option<Border>,
}

impl RosterItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, layer: Layer, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plain_text: None,
            layer,
            kind,
            image: None,
            border: None,
        }
    }

    /// A character token, the only kind of item that joins the order.
    pub fn character(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self::new(id, name, Layer::Character, ItemKind::Image)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.plain_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    /// Label shown in the order: token text, then item name, then a
    /// placeholder.
    pub fn display_name(&self) -> &str {
        [self.plain_text.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .find(|label| !label.is_empty())
            .unwrap_or("Unknown")
    }

    /// Candidate for the turn order, or `None` when the item is not on the
    /// character layer.
    pub fn to_candidate(&self) -> Option<Candidate> {
        if self.layer != Layer::Character {
            return None;
        }
        let candidate = Candidate::new(self.id.clone(), self.display_name());
        Some(match &self.image {
            Some(url) => candidate.with_image(url.clone()),
            None => candidate,
        })
    }
}

/// Partial update of one roster item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub id: ItemId,
    pub border: Border,
}

/// Every set field must match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    pub layer: Option<Layer>,
    pub kind: Option<ItemKind>,
}

impl ItemFilter {
    pub fn matches(&self, item: &RosterItem) -> bool {
        self.layer.is_none_or(|layer| item.layer == layer)
            && self.kind.is_none_or(|kind| item.kind == kind)
    }
}

/// Context-menu entry registered with the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMenu {
    pub id: String,
    pub label: String,
    pub filter: ItemFilter,
}

/// A click on a registered menu entry, carrying the items it applied to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMenuClick {
    pub menu_id: String,
    pub items: Vec<RosterItem>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}
