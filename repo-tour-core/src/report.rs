//! Fixed-layout rendering of generated results.
//!
//! Formatting is total: any JSON object renders. A field that is missing, null,
//! empty, `false` or `0` drops its section. Values of an unexpected type are
//! rendered as their JSON text rather than rejected.

use serde_json::Value;

use crate::extract::StructuredObject;
use crate::prompt::RequestMode;
use crate::stats::RepoStats;

const SUMMARY_RULE_WIDTH: usize = 70;
const TOUR_RULE_WIDTH: usize = 80;
const STATS_EXTENSIONS: usize = 5;
const STATS_TOP_LEVEL_DIRS: usize = 10;

pub fn format(object: &StructuredObject, mode: RequestMode) -> String {
    match mode {
        RequestMode::Summary => format_summary(object),
        RequestMode::Tour => format_tour(object),
    }
}

pub fn format_summary(summary: &StructuredObject) -> String {
    let rule = "=".repeat(SUMMARY_RULE_WIDTH);
    let mut out = vec![
        rule.clone(),
        format!(
            "📦 Repository: {}",
            text_or(summary.get("repository_name"), "Unknown")
        ),
        rule.clone(),
        format!("\n📝 Overview:\n{}", text_or(summary.get("overview"), "N/A")),
    ];

    for (key, heading) in [
        ("key_features", "⭐ Key Features:"),
        ("technologies", "🛠️  Technologies:"),
        ("use_cases", "💡 Use Cases:"),
    ] {
        if let Some(value) = present(summary, key) {
            out.push(format!("\n{heading}"));
            out.extend(items(value).map(|item| format!("  • {item}")));
        }
    }

    for (key, heading) in [
        ("getting_started", "🚀 Getting Started:"),
        ("important_notes", "⚠️  Important Notes:"),
        ("recommendation", "✅ Recommendation:"),
    ] {
        if let Some(value) = present(summary, key) {
            out.push(format!("\n{heading}\n{}", text(value)));
        }
    }

    out.push(format!("\n{rule}"));
    out.join("\n")
}

pub fn format_tour(tour: &StructuredObject) -> String {
    let rule = "=".repeat(TOUR_RULE_WIDTH);
    let mut out = vec![
        rule.clone(),
        format!(
            "🎯 GUIDED DEVELOPER TOUR: {}",
            text_or(tour.get("repository_name"), "Unknown")
        ),
        rule.clone(),
    ];

    if let Some(summary) = present(tour, "one_line_summary") {
        out.push(format!("\n📌 {}", text(summary)));
    }

    if let Some(what) = present(tour, "what_it_does") {
        out.push("\n📖 What This Project Does:".to_string());
        out.push(format!("   {}", text(what)));
    }

    if let Some(Value::Object(folders)) = present(tour, "key_folders") {
        out.push("\n📁 Key Folders:".to_string());
        for (folder, explanation) in folders {
            out.push(format!("   • {folder}/"));
            out.push(format!("     {}", text(explanation)));
        }
    }

    if let Some(files) = present(tour, "important_files_to_read_first") {
        out.push("\n📄 Important Files to Read First:".to_string());
        for file in items_raw(files) {
            let (path, reason) = match file {
                Value::Object(info) => (
                    text_or(info.get("file_path"), "Unknown"),
                    text_or(info.get("reason"), "Important for understanding the project"),
                ),
                Value::String(path) => (
                    path.clone(),
                    "Important for understanding the project".to_string(),
                ),
                _ => continue,
            };
            out.push(format!("   • {path}"));
            out.push(format!("     → {reason}"));
        }
    }

    if let Some(instructions) = present(tour, "setup_and_run_instructions") {
        out.push("\n🚀 Setup and Run Instructions:".to_string());
        for block in items(instructions) {
            out.extend(
                block
                    .split('\n')
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| format!("   {line}")),
            );
        }
    }

    if let Some(organization) = present(tour, "code_organization") {
        out.push("\n🏗️  Code Organization:".to_string());
        out.push(format!("   {}", text(organization)));
    }

    if let Some(technologies) = present(tour, "technologies_detected") {
        out.push("\n🛠️  Technologies Detected:".to_string());
        out.extend(items(technologies).map(|tech| format!("   • {tech}")));
    }

    if let Some(testing) = present(tour, "testing_approach") {
        out.push("\n🧪 Testing Approach:".to_string());
        out.push(format!("   {}", text(testing)));
    }

    if let Some(deployment) = present(tour, "deployment_info") {
        out.push("\n🚢 Deployment Information:".to_string());
        out.push(format!("   {}", text(deployment)));
    }

    if let Some(path) = present(tour, "onboarding_path") {
        out.push("\n🎓 Step-by-Step Onboarding Path:".to_string());
        for step in items_raw(path) {
            let Value::Object(step) = step else { continue };
            out.push(format!(
                "\n   Step {}: {}",
                text_or(step.get("step"), "?"),
                text_or(step.get("action"), "")
            ));
            if let Some(files) = step.get("files_to_examine").filter(|v| is_truthy(v)) {
                let files: Vec<String> = items(files).collect();
                out.push(format!("      📂 Files to examine: {}", files.join(", ")));
            }
            if let Some(goal) = step.get("learning_goal").filter(|v| is_truthy(v)) {
                out.push(format!("      🎯 Learning goal: {}", text(goal)));
            }
        }
    }

    out.push(format!("\n{rule}"));
    out.join("\n")
}

/// Statistics block printed after a tour.
pub fn format_statistics(stats: &RepoStats) -> String {
    let rule = "=".repeat(TOUR_RULE_WIDTH);
    let mut out = vec![
        rule.clone(),
        "📈 Repository Statistics:".to_string(),
        rule,
        format!("Total Files: {}", stats.total_files),
        format!("Total Directories: {}", stats.total_directories),
    ];
    if !stats.extension_frequency.is_empty() {
        let extensions: Vec<&str> = stats.extensions().take(STATS_EXTENSIONS).collect();
        out.push(format!("Top File Extensions: {}", extensions.join(", ")));
    }
    if !stats.top_level_directories.is_empty() {
        let dirs: Vec<&str> = stats
            .top_level_directories
            .iter()
            .take(STATS_TOP_LEVEL_DIRS)
            .map(String::as_str)
            .collect();
        out.push(format!("Top-Level Directories: {}", dirs.join(", ")));
    }
    out.join("\n")
}

fn present<'a>(object: &'a StructuredObject, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| is_truthy(v))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Strings verbatim, everything else as JSON text.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(v) => text(v),
    }
}

/// Array elements, or a lone scalar treated as a one-element list.
fn items_raw(value: &Value) -> impl Iterator<Item = &Value> {
    match value {
        Value::Array(values) => values.iter().collect::<Vec<_>>().into_iter(),
        other => vec![other].into_iter(),
    }
}

fn items(value: &Value) -> impl Iterator<Item = String> + '_ {
    items_raw(value).map(text)
}
