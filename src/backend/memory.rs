//! In-process backend.
//!
//! Entries live in a `BTreeMap` keyed by normalized path, which keeps prefix scans
//! (children, subtrees) cheap and iteration deterministic.
//!
//! Invariants:
//! - The root `""` is an implicit directory and never stored.
//! - Every stored entry's parent is either the root or a stored directory.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Backend;
use crate::errors::{BackendError, BackendResult};
use crate::path;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Dir,
    File(Vec<u8>),
}

/// A backend kept entirely in memory. Each instance is its own storage.
#[derive(Debug)]
pub struct MemoryFs {
    id: u64,
    entries: Mutex<BTreeMap<String, Node>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Node>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of every entry, parents before children.
    pub(crate) fn snapshot(&self) -> Vec<(String, Node)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn node_kind(map: &BTreeMap<String, Node>, norm: &str) -> Option<bool> {
        if norm.is_empty() {
            return Some(true);
        }
        map.get(norm).map(|n| matches!(n, Node::Dir))
    }

    fn require_parent(map: &BTreeMap<String, Node>, norm: &str) -> BackendResult<()> {
        let parent = path::parent(norm);
        match Self::node_kind(map, parent) {
            Some(true) => Ok(()),
            Some(false) => Err(BackendError::NotADirectory(parent.to_string())),
            None => Err(BackendError::NotFound(parent.to_string())),
        }
    }

    /// Keys strictly below `norm`.
    fn descendants(map: &BTreeMap<String, Node>, norm: &str) -> Vec<String> {
        let prefix = format!("{norm}/");
        map.range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

impl Backend for MemoryFs {
    fn describe(&self) -> String {
        format!("MemoryFs({})", self.id)
    }

    fn exists(&self, raw: &str) -> bool {
        match path::normalize(raw) {
            Ok(norm) => Self::node_kind(&self.lock(), &norm).is_some(),
            Err(_) => false,
        }
    }

    fn is_file(&self, raw: &str) -> bool {
        match path::normalize(raw) {
            Ok(norm) => Self::node_kind(&self.lock(), &norm) == Some(false),
            Err(_) => false,
        }
    }

    fn is_dir(&self, raw: &str) -> bool {
        match path::normalize(raw) {
            Ok(norm) => Self::node_kind(&self.lock(), &norm) == Some(true),
            Err(_) => false,
        }
    }

    fn list_dir(&self, raw: &str) -> BackendResult<Vec<String>> {
        let norm = path::normalize(raw)?;
        let map = self.lock();
        match Self::node_kind(&map, &norm) {
            Some(true) => {}
            Some(false) => return Err(BackendError::NotADirectory(norm)),
            None => return Err(BackendError::NotFound(norm)),
        }
        let names = if norm.is_empty() {
            map.keys().filter(|k| !k.contains('/')).cloned().collect()
        } else {
            Self::descendants(&map, &norm)
                .into_iter()
                .filter_map(|k| {
                    let rest = &k[norm.len() + 1..];
                    (!rest.contains('/')).then(|| rest.to_string())
                })
                .collect()
        };
        Ok(names)
    }

    fn make_dirs(&self, raw: &str) -> BackendResult<()> {
        let norm = path::normalize(raw)?;
        let mut map = self.lock();
        let mut current = String::new();
        for seg in path::parts(&norm) {
            current = path::join(&current, seg);
            match map.get(&current) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => return Err(BackendError::NotADirectory(current)),
                None => {
                    map.insert(current.clone(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn read_bytes(&self, raw: &str) -> BackendResult<Vec<u8>> {
        let norm = path::normalize(raw)?;
        match self.lock().get(&norm) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(BackendError::NotAFile(norm)),
            None if norm.is_empty() => Err(BackendError::NotAFile(norm)),
            None => Err(BackendError::NotFound(norm)),
        }
    }

    fn write_bytes(&self, raw: &str, data: &[u8]) -> BackendResult<()> {
        let norm = path::normalize(raw)?;
        let mut map = self.lock();
        if norm.is_empty() || matches!(map.get(&norm), Some(Node::Dir)) {
            return Err(BackendError::NotAFile(norm));
        }
        Self::require_parent(&map, &norm)?;
        map.insert(norm, Node::File(data.to_vec()));
        Ok(())
    }

    fn remove_file(&self, raw: &str) -> BackendResult<()> {
        let norm = path::normalize(raw)?;
        let mut map = self.lock();
        match map.get(&norm) {
            Some(Node::File(_)) => {
                map.remove(&norm);
                Ok(())
            }
            Some(Node::Dir) => Err(BackendError::NotAFile(norm)),
            None => Err(BackendError::NotFound(norm)),
        }
    }

    fn remove_dir(&self, raw: &str) -> BackendResult<()> {
        let norm = path::normalize(raw)?;
        if norm.is_empty() {
            return Err(BackendError::InvalidPath {
                path: raw.to_string(),
                reason: "cannot remove the backend root",
            });
        }
        let mut map = self.lock();
        match map.get(&norm) {
            Some(Node::Dir) => {
                if !Self::descendants(&map, &norm).is_empty() {
                    return Err(BackendError::DirectoryNotEmpty(norm));
                }
                map.remove(&norm);
                Ok(())
            }
            Some(Node::File(_)) => Err(BackendError::NotADirectory(norm)),
            None => Err(BackendError::NotFound(norm)),
        }
    }

    fn remove_tree(&self, raw: &str) -> BackendResult<()> {
        let norm = path::normalize(raw)?;
        if norm.is_empty() {
            return Err(BackendError::InvalidPath {
                path: raw.to_string(),
                reason: "cannot remove the backend root",
            });
        }
        let mut map = self.lock();
        match map.get(&norm) {
            Some(Node::Dir) => {
                for key in Self::descendants(&map, &norm) {
                    map.remove(&key);
                }
                map.remove(&norm);
                Ok(())
            }
            Some(Node::File(_)) => Err(BackendError::NotADirectory(norm)),
            None => Err(BackendError::NotFound(norm)),
        }
    }

    fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        let from = path::normalize(from)?;
        let to = path::normalize(to)?;
        if from.is_empty() || to.is_empty() {
            return Err(BackendError::InvalidPath {
                path: if from.is_empty() { from } else { to },
                reason: "cannot rename the backend root",
            });
        }
        if from == to {
            return Ok(());
        }
        if path::is_descendant(&from, &to) {
            return Err(BackendError::InvalidPath {
                path: to,
                reason: "cannot move a directory into itself",
            });
        }
        let mut map = self.lock();
        let node = match map.get(&from) {
            Some(node) => node.clone(),
            None => return Err(BackendError::NotFound(from)),
        };
        Self::require_parent(&map, &to)?;
        match (&node, map.get(&to)) {
            (Node::File(_), Some(Node::Dir)) => return Err(BackendError::NotAFile(to)),
            (Node::Dir, Some(Node::File(_))) => return Err(BackendError::NotADirectory(to)),
            (Node::Dir, Some(Node::Dir)) => {
                if !Self::descendants(&map, &to).is_empty() {
                    return Err(BackendError::DirectoryNotEmpty(to));
                }
            }
            _ => {}
        }
        let moved = Self::descendants(&map, &from);
        map.remove(&from);
        map.insert(to.clone(), node);
        for key in moved {
            if let Some(child) = map.remove(&key) {
                let suffix = &key[from.len()..];
                map.insert(format!("{to}{suffix}"), child);
            }
        }
        Ok(())
    }
}
