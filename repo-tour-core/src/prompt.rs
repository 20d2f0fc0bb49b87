//! Request assembly for the generation call.
//!
//! The size bounds here are fixed so assembled prompts are reproducible:
//! README text is cut to [`README_CHAR_LIMIT`] characters, the tree view uses at most
//! [`TREE_ENTRY_LIMIT`] entries, and each file category lists at most
//! [`FILES_PER_CATEGORY_LIMIT`] paths.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::classify::ImportantFiles;
use crate::contract::{RepoId, TreeEntry};
use crate::stats::RepoStats;

pub const README_CHAR_LIMIT: usize = 5000;
pub const TRUNCATION_MARKER: &str = "\n\n[... README truncated for brevity ...]";
pub const TREE_ENTRY_LIMIT: usize = 200;
pub const FILES_PER_CATEGORY_LIMIT: usize = 10;
const PROMPT_EXTENSIONS: usize = 5;
const PROMPT_TOP_LEVEL_DIRS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// README only.
    Summary,
    /// Full structural analysis.
    #[default]
    Tour,
}

impl RequestMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMode::Summary => "summary",
            RequestMode::Tour => "tour",
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(RequestMode::Summary),
            "tour" => Ok(RequestMode::Tour),
            other => Err(format!(
                "unknown mode '{other}': expected 'summary' or 'tour'"
            )),
        }
    }
}

/// Everything the assembler may draw on. Summary requests use only `repo` and `readme`.
#[derive(Debug, Clone, Copy)]
pub struct RepositoryContext<'a> {
    pub repo: &'a RepoId,
    pub readme: &'a str,
    pub entries: &'a [TreeEntry],
    pub important_files: &'a ImportantFiles,
    pub stats: &'a RepoStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub mode: RequestMode,
    /// Natural-language request with the repository context.
    pub body: String,
    /// Required JSON fields and the instruction to answer with the object only.
    pub shape_instruction: String,
}

impl Prompt {
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.body, self.shape_instruction)
    }
}

pub fn assemble(mode: RequestMode, ctx: &RepositoryContext<'_>) -> Prompt {
    let readme = truncate_readme(ctx.readme);
    match mode {
        RequestMode::Summary => Prompt {
            mode,
            body: format!(
                "Analyze the following GitHub repository README and provide a structured summary.\n\
                 \n\
                 Repository: {repo}\n\
                 README Content:\n\
                 {readme}",
                repo = ctx.repo,
            ),
            shape_instruction: summary_shape(ctx.repo),
        },
        RequestMode::Tour => Prompt {
            mode,
            body: format!(
                "You are a senior software engineer helping a new developer onboard to a GitHub repository.\n\
                 Analyze the following repository information and create a comprehensive, structured guided tour.\n\
                 \n\
                 Repository: {repo}\n\
                 \n\
                 === README CONTENT ===\n\
                 {readme}\n\
                 \n\
                 === REPOSITORY STRUCTURE ===\n\
                 {tree}\n\
                 \n\
                 === IMPORTANT FILES IDENTIFIED ===\n\
                 {files}\n\
                 \n\
                 === REPOSITORY STATISTICS ===\n\
                 {stats}",
                repo = ctx.repo,
                tree = render_tree(&ctx.entries[..ctx.entries.len().min(TREE_ENTRY_LIMIT)]),
                files = render_important_files(ctx.important_files),
                stats = render_stats(ctx.stats),
            ),
            shape_instruction: tour_shape(ctx.repo),
        },
    }
}

/// First [`README_CHAR_LIMIT`] characters, plus [`TRUNCATION_MARKER`] if anything was cut.
pub fn truncate_readme(readme: &str) -> Cow<'_, str> {
    match readme.char_indices().nth(README_CHAR_LIMIT) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &readme[..cut], TRUNCATION_MARKER)),
        None => Cow::Borrowed(readme),
    }
}

/// Indented tree view: directories first, then case-insensitive path order.
pub fn render_tree(entries: &[TreeEntry]) -> String {
    if entries.is_empty() {
        return "No files found in repository.".to_string();
    }

    let mut sorted: Vec<&TreeEntry> = entries.iter().collect();
    sorted.sort_by_cached_key(|e| (!e.is_dir(), e.path.to_lowercase()));

    let last = sorted.len() - 1;
    sorted
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let depth = entry.depth();
            let connector = match (depth, i == last) {
                (0, _) => "",
                (_, false) => "├── ",
                (_, true) => "└── ",
            };
            let marker = if entry.is_dir() { "📁" } else { "📄" };
            format!("{}{}{} {}", "  ".repeat(depth), connector, marker, entry.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per non-empty category, capped at [`FILES_PER_CATEGORY_LIMIT`] paths.
pub fn render_important_files(important: &ImportantFiles) -> String {
    important
        .iter()
        .filter(|(_, paths)| !paths.is_empty())
        .map(|(category, paths)| {
            let shown = &paths[..paths.len().min(FILES_PER_CATEGORY_LIMIT)];
            format!("  {}: {}", category.title(), shown.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_stats(stats: &RepoStats) -> String {
    let extensions: Vec<&str> = stats.extensions().take(PROMPT_EXTENSIONS).collect();
    let top_level: Vec<&str> = stats
        .top_level_directories
        .iter()
        .take(PROMPT_TOP_LEVEL_DIRS)
        .map(String::as_str)
        .collect();
    format!(
        "Total Files: {}\n\
         Total Directories: {}\n\
         Top File Extensions: {}\n\
         Top-Level Directories: {}",
        stats.total_files,
        stats.total_directories,
        extensions.join(", "),
        top_level.join(", "),
    )
}

fn summary_shape(repo: &RepoId) -> String {
    format!(
        r#"Please provide a JSON response with the following structure:
{{
    "repository_name": "{repo}",
    "overview": "A brief 1-2 sentence description of what the repository does",
    "key_features": ["feature1", "feature2", "feature3"],
    "technologies": ["tech1", "tech2", "tech3"],
    "use_cases": ["use case 1", "use case 2"],
    "getting_started": "Brief summary of how to get started",
    "important_notes": "Any critical information or requirements",
    "recommendation": "Is this project worth exploring? Why or why not?"
}}

Respond ONLY with the JSON object, no additional text."#
    )
}

fn tour_shape(repo: &RepoId) -> String {
    format!(
        r#"Please provide a JSON response with the following structure:
{{
    "repository_name": "{repo}",
    "one_line_summary": "A concise one-sentence description of what this project does",
    "what_it_does": "A 2-3 sentence explanation of the project's purpose and main functionality",
    "key_folders": {{
        "folder_name": "Explanation of what this folder contains and why it's important"
    }},
    "important_files_to_read_first": [
        {{
            "file_path": "path/to/file",
            "reason": "Why this file is important for understanding the project"
        }}
    ],
    "setup_and_run_instructions": "Step-by-step instructions for setting up and running the project (extract from README or infer from structure)",
    "code_organization": "Explanation of how the codebase is organized (architecture pattern, module structure, etc.)",
    "onboarding_path": [
        {{
            "step": 1,
            "action": "What the developer should do in this step",
            "files_to_examine": ["list", "of", "relevant", "files"],
            "learning_goal": "What they should understand after this step"
        }}
    ],
    "technologies_detected": ["list", "of", "technologies", "frameworks", "tools"],
    "testing_approach": "Information about how testing is set up (if detectable)",
    "deployment_info": "Information about deployment/CI-CD setup (if detectable)"
}}

Respond ONLY with the JSON object, no additional text. Make the onboarding_path practical and actionable."#
    )
}
