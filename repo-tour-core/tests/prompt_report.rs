// Prompt assembly, response extraction and report formatting.

use repo_tour_core::classify::ImportantFiles;
use repo_tour_core::contract::{EntryKind, RepoId, TreeEntry};
use repo_tour_core::error::ExtractError;
use repo_tour_core::extract::extract;
use repo_tour_core::prompt::{
    assemble, render_tree, truncate_readme, RepositoryContext, RequestMode, README_CHAR_LIMIT,
    TRUNCATION_MARKER,
};
use repo_tour_core::report::{format, format_statistics, format_summary, format_tour};
use repo_tour_core::stats::{aggregate, RepoStats};

fn entry(path: &str, kind: EntryKind) -> TreeEntry {
    TreeEntry {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap().to_string(),
        kind,
        size: 0,
    }
}

fn repo() -> RepoId {
    RepoId::parse("octo/demo").unwrap()
}

#[test]
fn test_readme_truncated_to_limit_with_marker() {
    let long = "a".repeat(README_CHAR_LIMIT + 1);
    let cut = truncate_readme(&long);
    assert_eq!(cut.len(), README_CHAR_LIMIT + TRUNCATION_MARKER.len());
    assert!(cut.starts_with(&"a".repeat(README_CHAR_LIMIT)));
    assert!(cut.ends_with(TRUNCATION_MARKER));

    // limit counts characters, not bytes
    let wide = "é".repeat(README_CHAR_LIMIT);
    assert_eq!(truncate_readme(&wide), wide.as_str());
}

#[test]
fn test_summary_prompt_has_no_structure_sections() {
    let repo = repo();
    let important = ImportantFiles::default();
    let stats = RepoStats::default();
    let long = "b".repeat(README_CHAR_LIMIT * 2);
    let ctx = RepositoryContext {
        repo: &repo,
        readme: &long,
        entries: &[],
        important_files: &important,
        stats: &stats,
    };

    let prompt = assemble(RequestMode::Summary, &ctx);
    let text = prompt.text();

    assert_eq!(prompt.mode, RequestMode::Summary);
    assert!(text.contains("Repository: octo/demo"));
    assert!(text.contains(TRUNCATION_MARKER));
    assert!(!text.contains(&"b".repeat(README_CHAR_LIMIT + 1)));
    assert!(!text.contains("REPOSITORY STRUCTURE"));
    assert!(text.contains("\"repository_name\": \"octo/demo\""));
    assert!(text.ends_with("Respond ONLY with the JSON object, no additional text."));
}

#[test]
fn test_tour_prompt_caps_tree_and_file_lists() {
    let repo = repo();
    let entries: Vec<TreeEntry> = (0..250)
        .map(|i| entry(&format!("f{i:03}.txt"), EntryKind::File))
        .collect();
    let important = ImportantFiles {
        documentation: (0..12).map(|i| format!("docs/p{i:02}.md")).collect(),
        ..ImportantFiles::default()
    };
    let stats = aggregate(&entries);
    let ctx = RepositoryContext {
        repo: &repo,
        readme: "hello",
        entries: &entries,
        important_files: &important,
        stats: &stats,
    };

    let text = assemble(RequestMode::Tour, &ctx).text();

    assert!(text.contains("📄 f199.txt"));
    assert!(!text.contains("f200.txt"));
    assert!(text.contains("  Documentation: docs/p00.md"));
    assert!(text.contains("docs/p09.md"));
    assert!(!text.contains("docs/p10.md"));
    assert!(text.contains("Total Files: 250\nTotal Directories: 0\nTop File Extensions: txt"));
    assert!(text.contains("Make the onboarding_path practical and actionable."));
}

#[test]
fn test_render_tree_puts_directories_first() {
    let entries = vec![
        entry("README.md", EntryKind::File),
        entry("src", EntryKind::Directory),
        entry("src/main.rs", EntryKind::File),
        entry("Cargo.toml", EntryKind::File),
    ];

    assert_eq!(
        render_tree(&entries),
        "📁 src\n📄 Cargo.toml\n📄 README.md\n  └── 📄 main.rs"
    );
    assert_eq!(render_tree(&[]), "No files found in repository.");
}

#[test]
fn test_extract_accepts_clean_and_wrapped_objects() {
    let clean = extract("  {\"a\": 1, \"b\": [true]}\n").unwrap();
    assert_eq!(clean["a"], 1);

    let wrapped = extract("Here is the result:\n{\"a\":1}\nThanks").unwrap();
    assert_eq!(wrapped.len(), 1);
    assert_eq!(wrapped["a"], 1);

    let reparsed = extract(&serde_json::to_string(&clean).unwrap()).unwrap();
    assert_eq!(reparsed, clean);
}

#[test]
fn test_extract_failures_are_distinguished() {
    assert!(matches!(
        extract("no json here"),
        Err(ExtractError::NoObjectDelimiters { .. })
    ));
    assert!(matches!(
        extract("[1, 2, 3]"),
        Err(ExtractError::NoObjectDelimiters { .. })
    ));
    assert!(matches!(
        extract("first {\"a\": 1} then {\"b\": 2}"),
        Err(ExtractError::SliceInvalid { .. })
    ));
    assert!(matches!(
        extract("} backwards {"),
        Err(ExtractError::NoObjectDelimiters { .. })
    ));
}

#[test]
fn test_formatting_is_total_for_sparse_objects() {
    let empty = extract("{}").unwrap();

    let summary = format_summary(&empty);
    assert!(summary.contains("📦 Repository: Unknown"));
    assert!(summary.contains("📝 Overview:\nN/A"));
    assert!(!summary.contains("Key Features"));
    assert!(summary.starts_with(&"=".repeat(70)));

    let tour = format_tour(&empty);
    assert!(tour.contains("🎯 GUIDED DEVELOPER TOUR: Unknown"));
    assert!(!tour.contains("📌"));
    assert!(tour.ends_with(&"=".repeat(80)));

    assert_eq!(format(&empty, RequestMode::Summary), summary);
    assert_eq!(format(&empty, RequestMode::Tour), tour);
}

#[test]
fn test_formatting_tolerates_unexpected_value_types() {
    let odd = extract(
        r#"{"repository_name": 42, "key_features": "just one", "overview": null,
            "technologies": [], "recommendation": false}"#,
    )
    .unwrap();

    let summary = format_summary(&odd);
    assert!(summary.contains("📦 Repository: 42"));
    assert!(summary.contains("📝 Overview:\nN/A"));
    assert!(summary.contains("⭐ Key Features:\n  • just one"));
    assert!(!summary.contains("Technologies"));
    assert!(!summary.contains("Recommendation"));

    let tour = extract(
        r#"{"onboarding_path": [{"action": "Look around"}, "stray"],
            "important_files_to_read_first": ["src/lib.rs"]}"#,
    )
    .unwrap();
    let text = format_tour(&tour);
    assert!(text.contains("Step ?: Look around"));
    assert!(text.contains("   • src/lib.rs\n     → Important for understanding the project"));
}

#[test]
fn test_statistics_block_lists_leading_extensions() {
    let entries = vec![
        entry("src", EntryKind::Directory),
        entry("src/a.rs", EntryKind::File),
        entry("b.md", EntryKind::File),
    ];
    let block = format_statistics(&aggregate(&entries));
    assert!(block.contains("📈 Repository Statistics:"));
    assert!(block.contains("Total Files: 2\nTotal Directories: 1"));
    assert!(block.contains("Top File Extensions: rs, md"));
    assert!(block.ends_with("Top-Level Directories: src"));

    let bare = format_statistics(&RepoStats::default());
    assert!(!bare.contains("Top File Extensions"));
}

#[test]
fn test_summary_layout_is_fixed() {
    let summary = extract(
        r#"{"repository_name": "octo/demo", "overview": "A demo.",
            "key_features": ["fast", "small"], "technologies": ["Rust"],
            "use_cases": ["learning"], "getting_started": "cargo run",
            "important_notes": "Beta.", "recommendation": "Try it."}"#,
    )
    .unwrap();
    let rule = "=".repeat(70);

    let expected = [
        rule.as_str(),
        "📦 Repository: octo/demo",
        rule.as_str(),
        "",
        "📝 Overview:",
        "A demo.",
        "",
        "⭐ Key Features:",
        "  • fast",
        "  • small",
        "",
        "🛠️  Technologies:",
        "  • Rust",
        "",
        "💡 Use Cases:",
        "  • learning",
        "",
        "🚀 Getting Started:",
        "cargo run",
        "",
        "⚠️  Important Notes:",
        "Beta.",
        "",
        "✅ Recommendation:",
        "Try it.",
        "",
        rule.as_str(),
    ]
    .join("\n");

    assert_eq!(format_summary(&summary), expected);
}

#[test]
fn test_tour_layout_is_fixed() {
    let tour = extract(
        r#"{"repository_name": "octo/demo",
            "one_line_summary": "A demo service.",
            "what_it_does": "Serves demo data.",
            "key_folders": {"app": "Application code", "tests": "Integration tests"},
            "important_files_to_read_first": [{"file_path": "app/main.py", "reason": "Entry point"}],
            "setup_and_run_instructions": "pip install -r requirements.txt\n\npython app/main.py",
            "code_organization": "Flat package.",
            "technologies_detected": ["Python", "Docker"],
            "testing_approach": "pytest",
            "deployment_info": "GitHub Actions",
            "onboarding_path": [
                {"step": 1, "action": "Read main", "files_to_examine": ["app/main.py"], "learning_goal": "Startup flow"},
                {"step": 2, "action": "Run tests"}
            ]}"#,
    )
    .unwrap();
    let rule = "=".repeat(80);

    let expected = [
        rule.as_str(),
        "🎯 GUIDED DEVELOPER TOUR: octo/demo",
        rule.as_str(),
        "",
        "📌 A demo service.",
        "",
        "📖 What This Project Does:",
        "   Serves demo data.",
        "",
        "📁 Key Folders:",
        "   • app/",
        "     Application code",
        "   • tests/",
        "     Integration tests",
        "",
        "📄 Important Files to Read First:",
        "   • app/main.py",
        "     → Entry point",
        "",
        "🚀 Setup and Run Instructions:",
        "   pip install -r requirements.txt",
        "   python app/main.py",
        "",
        "🏗️  Code Organization:",
        "   Flat package.",
        "",
        "🛠️  Technologies Detected:",
        "   • Python",
        "   • Docker",
        "",
        "🧪 Testing Approach:",
        "   pytest",
        "",
        "🚢 Deployment Information:",
        "   GitHub Actions",
        "",
        "🎓 Step-by-Step Onboarding Path:",
        "",
        "   Step 1: Read main",
        "      📂 Files to examine: app/main.py",
        "      🎯 Learning goal: Startup flow",
        "",
        "   Step 2: Run tests",
        "",
        rule.as_str(),
    ]
    .join("\n");

    assert_eq!(format_tour(&tour), expected);
}
