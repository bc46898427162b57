// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tags are strings that name where code came from: an exact file path, a
//! bracketed description such as `[kernel.kallsyms]`, or a path prefix ending
//! in a wildcard. They are ordered coarsely by that class, then by the string
//! itself.

use std::cmp::Ordering;
use std::collections::btree_set::{self, BTreeSet};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagClass {
    ExactPath,
    Description,
    PrefixedPath,
}

pub fn classify(tag: &str) -> TagClass {
    if tag.contains('*') {
        TagClass::PrefixedPath
    } else if tag.contains('[') {
        TagClass::Description
    } else {
        TagClass::ExactPath
    }
}

/// Orders by [`TagClass`] first and falls back to comparing the strings.
pub fn compare_tags(a: &str, b: &str) -> Ordering {
    classify(a).cmp(&classify(b)).then_with(|| a.cmp(b))
}

/// A string ordered by [`compare_tags`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn class(&self) -> TagClass {
        classify(&self.0)
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_tags(&self.0, &other.0)
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of unique tags that iterates in [`compare_tags`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the tag was newly inserted.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(Tag::new(tag))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&Tag::new(tag))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(Tag::as_str)
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = btree_set::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Tag::new).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.tags.extend(iter.into_iter().map(Tag::new));
    }
}
