//! Namespace - 이름 기반 불변 컨테이너
//!
//! 한 번의 빌드로 만들어지고 이후에는 추가/삭제가 없다.
//! 순회 순서는 생성 시점에 결정된다 (삽입 순서 또는 사전순).

use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Namespace에 들어갈 수 있는 항목
pub trait Named {
    fn name(&self) -> &str;
}

/// 이름으로 색인되는 불변 컬렉션
pub struct Namespace<T> {
    label: String,
    entries: Vec<T>,
    index: HashMap<String, usize>,
    sorted: bool,
}

impl<T: Named> Namespace<T> {
    /// 항목들로 Namespace 생성
    ///
    /// `sort`가 true면 이름 사전순, 아니면 주어진 순서를 유지한다.
    /// 같은 이름이 두 번 나오면 `DuplicateName`.
    pub fn new(label: impl Into<String>, entries: impl IntoIterator<Item = T>, sort: bool) -> Result<Self> {
        let label = label.into();
        let mut entries: Vec<T> = entries.into_iter().collect();
        if sort {
            entries.sort_by(|a, b| a.name().cmp(b.name()));
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.name().to_string(), i).is_some() {
                return Err(Error::duplicate(label, entry.name()));
            }
        }

        Ok(Self {
            label,
            entries,
            index,
            sorted: sort,
        })
    }

    /// 빈 Namespace
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
            index: HashMap::new(),
            sorted: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 이름으로 조회 (없으면 `NotFound`)
    pub fn get(&self, name: &str) -> Result<&T> {
        self.find(name)
            .ok_or_else(|| Error::NotFound(format!("{}.{}", self.label, name)))
    }

    pub fn find(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 고정된 순서로 순회 (몇 번이든 같은 순서)
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Named::name)
    }
}

impl<'a, T> IntoIterator for &'a Namespace<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T> fmt::Debug for Namespace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Namespace({}, <{} members>, sort={})",
            self.label,
            self.entries.len(),
            self.sorted
        )
    }
}
