use std::collections::HashSet;
use std::path::PathBuf;

/// Concatenate `local` and `online`, keeping the first occurrence of every
/// path and dropping paths that no longer exist.
pub fn merge_unique(local: Vec<PathBuf>, online: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    local
        .into_iter()
        .chain(online)
        .filter(|p| p.exists() && seen.insert(p.clone()))
        .collect()
}
