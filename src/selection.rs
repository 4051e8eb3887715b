use crate::ordering::OrderedPresentationList;

/// Raw position into a dropdown, headers included. The empty index is the
/// toolkit's "nothing selected".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SelectionIndex(Option<usize>);

impl SelectionIndex {
    pub const NONE: Self = Self(None);

    pub fn at(raw: usize) -> Self {
        Self(Some(raw))
    }

    /// Toolkits report "not found" as a negative index.
    pub fn from_raw(raw: i64) -> Self {
        usize::try_from(raw).map(Self::at).unwrap_or(Self::NONE)
    }

    pub fn get(self) -> Option<usize> {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<usize>> for SelectionIndex {
    fn from(raw: Option<usize>) -> Self {
        Self(raw)
    }
}

/// Translate a raw dropdown position into the selected preset name.
///
/// Headers sitting before `raw` are subtracted to land in the selectable-only
/// name array. Header positions themselves, the empty index, and anything
/// out of range resolve to `None`.
pub fn resolve_selection(list: &OrderedPresentationList, raw: SelectionIndex) -> Option<&str> {
    let raw = raw.get()?;
    if raw >= list.len() || list.is_header_at(raw) {
        return None;
    }

    let headers_before = list
        .header_positions()
        .iter()
        .filter(|&&position| position < raw)
        .count();
    list.name_at(raw - headers_before)
}

/// Raw position of `name`, the inverse of [`resolve_selection`].
pub fn raw_index_of(list: &OrderedPresentationList, name: &str) -> Option<usize> {
    list.entries()
        .iter()
        .position(|entry| entry.name() == Some(name))
}

/// Initial selection for a dropdown: the first selectable entry, skipping a
/// leading header.
pub fn first_selectable(list: &OrderedPresentationList) -> SelectionIndex {
    list.entries()
        .iter()
        .position(|entry| !entry.is_header())
        .into()
}
