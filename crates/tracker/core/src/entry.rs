//! Turn entries and the candidates they are built from.

use core::fmt;

/// Reference to an item in the host's scene roster.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Initiative rank. Lower values act first.
///
/// Signed because nudging an entry above the first slot can push its value
/// to zero and below.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Initiative(pub i32);

impl Initiative {
    /// One rank earlier than `self`.
    pub const fn before(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// One rank later than `self`.
    pub const fn after(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Initiative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an entry relates to the host roster.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryLink {
    /// Backed by a roster item; highlighted on the scene and pruned when the
    /// item disappears.
    RosterLinked { id: ItemId },
    /// Logical slot injected next to the active turn without a roll. Never
    /// pruned and never highlighted.
    Invocation,
}

/// One slot in the turn order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "wire::EntryRecord", into = "wire::EntryRecord")
)]
pub struct TurnEntry {
    pub link: EntryLink,
    pub name: String,
    pub initiative: Initiative,
    pub image: Option<String>,
}

impl TurnEntry {
    /// Entry tied to a roster item.
    pub fn linked(id: ItemId, name: impl Into<String>, initiative: Initiative) -> Self {
        Self {
            link: EntryLink::RosterLinked { id },
            name: name.into(),
            initiative,
            image: None,
        }
    }

    /// Entry that exists only inside the turn order.
    pub fn invocation(name: impl Into<String>, initiative: Initiative) -> Self {
        Self {
            link: EntryLink::Invocation,
            name: name.into(),
            initiative,
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Roster id, if this entry is linked to one.
    pub fn id(&self) -> Option<&ItemId> {
        match &self.link {
            EntryLink::RosterLinked { id } => Some(id),
            EntryLink::Invocation => None,
        }
    }

    pub fn is_invocation(&self) -> bool {
        matches!(self.link, EntryLink::Invocation)
    }
}

/// A roster item offered for insertion into the order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: ItemId,
    pub name: String,
    pub image: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Builds the roster-linked entry for this candidate.
    pub fn into_linked(self, initiative: Initiative) -> TurnEntry {
        TurnEntry::linked(self.id, self.name, initiative).with_image(self.image)
    }

    /// Builds an invocation entry carrying this candidate's label and image.
    pub fn into_invocation(self, initiative: Initiative) -> TurnEntry {
        TurnEntry::invocation(self.name, initiative).with_image(self.image)
    }
}

#[cfg(feature = "serde")]
mod wire {
    //! Metadata-store representation of an entry.
    //!
    //! Hosts see the flat record `{ id?, name, initiative, image?, isInvocation }`.
    //! The presence of `id` decides the link; `isInvocation` is written for
    //! readers that only look at the flag.

    use super::{EntryLink, Initiative, ItemId, TurnEntry};

    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct EntryRecord {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<ItemId>,
        name: String,
        initiative: Initiative,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
        #[serde(default)]
        is_invocation: bool,
    }

    impl From<TurnEntry> for EntryRecord {
        fn from(entry: TurnEntry) -> Self {
            let is_invocation = entry.is_invocation();
            let id = match entry.link {
                EntryLink::RosterLinked { id } => Some(id),
                EntryLink::Invocation => None,
            };
            Self {
                id,
                name: entry.name,
                initiative: entry.initiative,
                image: entry.image,
                is_invocation,
            }
        }
    }

    impl TryFrom<EntryRecord> for TurnEntry {
        type Error = &'static str;

        fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
            let link = match record.id {
                Some(id) if id.0.is_empty() => return Err("entry id must not be empty"),
                Some(id) => EntryLink::RosterLinked { id },
                None => EntryLink::Invocation,
            };
            Ok(Self {
                link,
                name: record.name,
                initiative: record.initiative,
                image: record.image,
            })
        }
    }
}
