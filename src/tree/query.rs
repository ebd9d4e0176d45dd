//! Typed, read-only node lists returned by block accessors

use std::fmt;
use std::ops::{Bound, Deref, Index, RangeBounds};

use super::{ResolveValue, Widget};
use crate::error::{AppTestError, Result};

/// Ordered list of references to nodes of one kind
pub struct ElementList<'a, T> {
    items: Vec<&'a T>,
}

impl<'a, T> ElementList<'a, T> {
    pub fn new(items: Vec<&'a T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.items.get(index).copied()
    }

    pub fn first(&self) -> Option<&'a T> {
        self.items.first().copied()
    }

    pub fn last(&self) -> Option<&'a T> {
        self.items.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().copied()
    }

    /// Sub-list of the same kind.
    ///
    /// Bounds past the end are clamped to the length, and an empty list is
    /// returned when the start is past the end.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let len = self.items.len();
        let start = match range.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&i) => i.saturating_add(1),
            Bound::Excluded(&i) => i,
            Bound::Unbounded => len,
        }
        .min(len);
        Self {
            items: self.items[start..end.max(start)].to_vec(),
        }
    }

    /// Resolved value of every node, in order
    pub fn values(&self) -> Result<Vec<T::Output>>
    where
        T: ResolveValue,
    {
        self.items.iter().map(|item| item.resolve()).collect()
    }
}

impl<'a, T> Clone for ElementList<'a, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<'a, T> Default for ElementList<'a, T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<'a, T: PartialEq> PartialEq for ElementList<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for ElementList<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<'a, T> Index<usize> for ElementList<'a, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.items[index]
    }
}

impl<'a, T> FromIterator<&'a T> for ElementList<'a, T> {
    fn from_iter<I: IntoIterator<Item = &'a T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for ElementList<'a, T> {
    type Item = &'a T;
    type IntoIter = std::vec::IntoIter<&'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, 'l, T> IntoIterator for &'l ElementList<'a, T> {
    type Item = &'a T;
    type IntoIter = std::iter::Copied<std::slice::Iter<'l, &'a T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().copied()
    }
}

// ============================================================================
// WIDGET LIST
// ============================================================================

/// [`ElementList`] of widgets, with lookup by user key
pub struct WidgetList<'a, T> {
    inner: ElementList<'a, T>,
}

impl<'a, T: Widget> WidgetList<'a, T> {
    /// First widget whose user key is `key`
    pub fn by_key(&self, key: &str) -> Result<&'a T> {
        self.inner
            .iter()
            .find(|widget| widget.key() == Some(key))
            .ok_or_else(|| AppTestError::KeyNotFound {
                key: key.to_string(),
            })
    }
}

impl<'a, T> WidgetList<'a, T> {
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        Self {
            inner: self.inner.slice(range),
        }
    }

    pub fn into_inner(self) -> ElementList<'a, T> {
        self.inner
    }
}

impl<'a, T> Deref for WidgetList<'a, T> {
    type Target = ElementList<'a, T>;

    fn deref(&self) -> &ElementList<'a, T> {
        &self.inner
    }
}

impl<'a, T> Clone for WidgetList<'a, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T: PartialEq> PartialEq for WidgetList<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for WidgetList<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<'a, T> Index<usize> for WidgetList<'a, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.inner[index]
    }
}

impl<'a, T> FromIterator<&'a T> for WidgetList<'a, T> {
    fn from_iter<I: IntoIterator<Item = &'a T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for WidgetList<'a, T> {
    type Item = &'a T;
    type IntoIter = std::vec::IntoIter<&'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, 'l, T> IntoIterator for &'l WidgetList<'a, T> {
    type Item = &'a T;
    type IntoIter = std::iter::Copied<std::slice::Iter<'l, &'a T>>;

    fn into_iter(self) -> Self::IntoIter {
        (&self.inner).into_iter()
    }
}
