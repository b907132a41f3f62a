//! In-memory per-player selection and context menu.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracker_core::ItemId;

use super::MemoryRoster;
use crate::host::{
    ContextMenu, ContextMenuClick, HostError, Result, RosterItem, SelectionSource,
};

/// One player's selection over a shared [`MemoryRoster`].
#[derive(Clone)]
pub struct MemorySelection {
    inner: Arc<SelectionInner>,
}

struct SelectionInner {
    roster: MemoryRoster,
    selected: RwLock<Vec<ItemId>>,
    menus: RwLock<Vec<ContextMenu>>,
    clicks: broadcast::Sender<ContextMenuClick>,
}

impl MemorySelection {
    pub fn new(roster: MemoryRoster) -> Self {
        let (clicks, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(SelectionInner {
                roster,
                selected: RwLock::new(Vec::new()),
                menus: RwLock::new(Vec::new()),
                clicks,
            }),
        }
    }

    /// Replaces the selection. Ids not on the scene are dropped on read.
    pub fn select<I>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = ItemId>,
    {
        let mut selected = self
            .inner
            .selected
            .write()
            .map_err(|_| HostError::LockPoisoned)?;
        *selected = ids.into_iter().collect();
        Ok(())
    }

    pub fn menus(&self) -> Result<Vec<ContextMenu>> {
        self.inner
            .menus
            .read()
            .map(|menus| menus.clone())
            .map_err(|_| HostError::LockPoisoned)
    }

    /// Clicks a registered menu entry on `ids`. Only items passing the menu
    /// filter reach subscribers. Returns how many did.
    pub fn click(&self, menu_id: &str, ids: &[ItemId]) -> Result<usize> {
        let menu = self
            .menus()?
            .into_iter()
            .find(|menu| menu.id == menu_id)
            .ok_or_else(|| HostError::rejected("context menu click", format!("unknown menu {menu_id}")))?;

        let wanted: HashSet<&ItemId> = ids.iter().collect();
        let items: Vec<RosterItem> = self
            .inner
            .roster
            .snapshot()?
            .into_iter()
            .filter(|item| wanted.contains(&item.id) && menu.filter.matches(item))
            .collect();
        let count = items.len();

        let click = ContextMenuClick {
            menu_id: menu.id,
            items,
        };
        if self.inner.clicks.send(click).is_err() {
            tracing::trace!(target: "tracker::host", "menu click with no subscribers");
        }
        Ok(count)
    }
}

#[async_trait]
impl SelectionSource for MemorySelection {
    async fn selection(&self) -> Result<Vec<RosterItem>> {
        let selected = self
            .inner
            .selected
            .read()
            .map_err(|_| HostError::LockPoisoned)?
            .clone();

        let items = self.inner.roster.snapshot()?;
        Ok(selected
            .iter()
            .filter_map(|id| items.iter().find(|item| &item.id == id).cloned())
            .collect())
    }

    async fn register_context_menu(&self, menu: ContextMenu) -> Result<()> {
        let mut menus = self
            .inner
            .menus
            .write()
            .map_err(|_| HostError::LockPoisoned)?;
        menus.retain(|existing| existing.id != menu.id);
        menus.push(menu);
        Ok(())
    }

    fn subscribe_clicks(&self) -> broadcast::Receiver<ContextMenuClick> {
        self.inner.clicks.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ItemFilter, ItemKind, Layer};

    fn scene() -> MemoryRoster {
        let roster = MemoryRoster::new();
        roster.spawn(RosterItem::character("a", "A")).unwrap();
        roster
            .spawn(RosterItem::new("b", "Barrel", Layer::Prop, ItemKind::Image))
            .unwrap();
        roster
    }

    #[tokio::test]
    async fn selection_follows_scene() {
        let roster = scene();
        let selection = MemorySelection::new(roster.clone());
        selection
            .select([ItemId::new("a"), ItemId::new("b"), ItemId::new("gone")])
            .unwrap();

        assert_eq!(selection.selection().await.unwrap().len(), 2);

        roster.delete(&ItemId::new("a")).unwrap();
        let items = selection.selection().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, ItemId::new("b"));
    }

    #[tokio::test]
    async fn click_applies_menu_filter() {
        let selection = MemorySelection::new(scene());
        selection
            .register_context_menu(ContextMenu {
                id: "menu".into(),
                label: "Add".into(),
                filter: ItemFilter {
                    layer: Some(Layer::Character),
                    kind: Some(ItemKind::Image),
                },
            })
            .await
            .unwrap();
        let mut clicks = selection.subscribe_clicks();

        let count = selection
            .click("menu", &[ItemId::new("a"), ItemId::new("b")])
            .unwrap();
        assert_eq!(count, 1);
        let click = clicks.recv().await.unwrap();
        assert_eq!(click.items[0].id, ItemId::new("a"));

        assert!(selection.click("other", &[ItemId::new("a")]).is_err());
    }
}
