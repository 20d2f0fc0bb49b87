//! Pattern-based classification of notable files.
//!
//! Six independent rule sets run over every file entry. A file may match several
//! of them; nothing short-circuits. All patterns are lower case and are compared
//! against the lower-cased path and name.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::contract::TreeEntry;

const DOC_PATTERNS: &[&str] = &["readme", "contributing", "license", "changelog", "docs/"];

const DEPENDENCY_PATTERNS: &[&str] = &[
    "requirements.txt",
    "pyproject.toml",
    "package.json",
    "poetry.lock",
    "yarn.lock",
    "package-lock.json",
    "pnpm-lock.yaml",
    "pipfile",
    "pipfile.lock",
    "setup.py",
    "setup.cfg",
    "go.mod",
    "go.sum",
    "cargo.toml",
    "cargo.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "gemfile",
    "gemfile.lock",
    "composer.json",
    "mix.exs",
];

const CONFIG_PATTERNS: &[&str] = &[
    ".env.example",
    ".gitignore",
    ".dockerignore",
    "config",
    "settings",
    "pytest.ini",
    "tox.ini",
    ".pre-commit-config.yaml",
    "docker-compose",
];

const ENTRY_POINT_PATTERNS: &[&str] = &[
    "main.py",
    "app.py",
    "server.py",
    "index.js",
    "index.ts",
    "main.ts",
    "main.rs",
    "main.go",
    "src/main",
    "app/main",
    "application.java",
    "main.java",
];

const CI_PATTERNS: &[&str] = &[
    ".github/workflows",
    "ci/",
    ".gitlab-ci.yml",
    "azure-pipelines.yml",
    "jenkinsfile",
    ".travis.yml",
    ".circleci/",
];

const DOCKER_PATTERNS: &[&str] = &[
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yaml",
    ".dockerignore",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Documentation,
    Dependencies,
    Config,
    EntryPoints,
    CiCd,
    Docker,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Documentation,
        Category::Dependencies,
        Category::Config,
        Category::EntryPoints,
        Category::CiCd,
        Category::Docker,
    ];

    /// Bucket key, e.g. `entry_points`.
    pub fn key(self) -> &'static str {
        match self {
            Category::Documentation => "documentation",
            Category::Dependencies => "dependencies",
            Category::Config => "config",
            Category::EntryPoints => "entry_points",
            Category::CiCd => "ci_cd",
            Category::Docker => "docker",
        }
    }

    /// Heading used in prompts: the key with `_` as space, each word capitalised.
    pub fn title(self) -> String {
        self.key()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn matches(self, path: &str, name: &str) -> bool {
        match self {
            Category::Documentation => DOC_PATTERNS
                .iter()
                .any(|p| path.contains(p) || name.contains(p)),
            Category::Dependencies => DEPENDENCY_PATTERNS
                .iter()
                .any(|p| name == *p || name.ends_with(p)),
            Category::Config => CONFIG_PATTERNS
                .iter()
                .any(|p| path.contains(p) || name == *p),
            Category::EntryPoints => ENTRY_POINT_PATTERNS.iter().any(|p| name.contains(p)),
            Category::CiCd => CI_PATTERNS.iter().any(|p| path.contains(p)),
            Category::Docker => DOCKER_PATTERNS.iter().any(|p| name.contains(p)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Notable file paths per category, each bucket in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportantFiles {
    pub documentation: Vec<String>,
    pub dependencies: Vec<String>,
    pub config: Vec<String>,
    pub entry_points: Vec<String>,
    pub ci_cd: Vec<String>,
    pub docker: Vec<String>,
}

impl ImportantFiles {
    pub fn bucket(&self, category: Category) -> &[String] {
        match category {
            Category::Documentation => &self.documentation,
            Category::Dependencies => &self.dependencies,
            Category::Config => &self.config,
            Category::EntryPoints => &self.entry_points,
            Category::CiCd => &self.ci_cd,
            Category::Docker => &self.docker,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Documentation => &mut self.documentation,
            Category::Dependencies => &mut self.dependencies,
            Category::Config => &mut self.config,
            Category::EntryPoints => &mut self.entry_points,
            Category::CiCd => &mut self.ci_cd,
            Category::Docker => &mut self.docker,
        }
    }

    /// Buckets in fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.bucket(c)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, paths)| paths.is_empty())
    }
}

pub fn classify(entries: &[TreeEntry]) -> ImportantFiles {
    let mut important = ImportantFiles::default();
    for entry in entries.iter().filter(|e| e.is_file()) {
        let path = entry.path.to_lowercase();
        let name = entry.name.to_lowercase();
        for category in Category::ALL {
            if category.matches(&path, &name) {
                important.bucket_mut(category).push(entry.path.clone());
            }
        }
    }
    debug!(
        documentation = important.documentation.len(),
        dependencies = important.dependencies.len(),
        config = important.config.len(),
        entry_points = important.entry_points.len(),
        ci_cd = important.ci_cd.len(),
        docker = important.docker.len(),
        "Classified important files"
    );
    important
}
