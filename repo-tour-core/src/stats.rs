use std::collections::HashMap;

use serde::Serialize;

use crate::contract::TreeEntry;

/// How many extensions [`RepoStats::extension_frequency`] keeps.
pub const TOP_EXTENSIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionCount {
    pub extension: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoStats {
    pub total_files: usize,
    pub total_directories: usize,
    /// Most frequent extensions, count descending; ties keep first-seen order.
    pub extension_frequency: Vec<ExtensionCount>,
    pub top_level_directories: Vec<String>,
}

impl RepoStats {
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extension_frequency.iter().map(|e| e.extension.as_str())
    }

    pub fn count_for(&self, extension: &str) -> Option<usize> {
        self.extension_frequency
            .iter()
            .find(|e| e.extension == extension)
            .map(|e| e.count)
    }
}

/// Lower-cased text after the final `.` of a file name, if non-empty.
pub fn extension_of(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

pub fn aggregate(entries: &[TreeEntry]) -> RepoStats {
    let mut stats = RepoStats::default();
    let mut counts: Vec<ExtensionCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        if entry.is_dir() {
            stats.total_directories += 1;
            if !entry.path.contains('/') {
                stats.top_level_directories.push(entry.name.clone());
            }
            continue;
        }

        stats.total_files += 1;
        if let Some(ext) = extension_of(&entry.name) {
            match index.get(&ext) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(ext.clone(), counts.len());
                    counts.push(ExtensionCount {
                        extension: ext,
                        count: 1,
                    });
                }
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_EXTENSIONS);
    stats.extension_frequency = counts;
    stats
}
