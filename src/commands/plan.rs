//! # Plan Command Implementation
//!
//! Runs a composition entirely in memory and prints what it would produce:
//! the staged files with the module that wrote each one, the merged manifest
//! entries, the pre-commit table, the queued post actions and any optional
//! edits that were skipped.
//!
//! This command is a safe, read-only operation that does not modify any files.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ptree::TreeItem;

use seedwright::output::{OutputConfig, Status};
use seedwright::path::display;
use seedwright::phases::{CompositionEngine, ProjectState};
use seedwright::render::TemplateEngine;
use seedwright::suggestions;

use super::{explain, InputArgs};

/// Show what a composition would produce
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Show planned files as a directory tree
    #[arg(long)]
    pub tree: bool,

    /// Only list files matching this glob pattern
    #[arg(long, value_name = "GLOB")]
    pub filter: Option<String>,
}

/// Execute the `plan` command.
pub fn execute(args: PlanArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    if let Some(pattern) = &args.filter {
        if let Err(err) = glob::Pattern::new(pattern) {
            return Err(suggestions::invalid_glob(pattern, &err));
        }
    }

    let inputs = args.inputs.load()?;
    let modules = inputs.build_modules()?;
    let renderer = TemplateEngine::new();
    let engine = CompositionEngine::new(&inputs.catalog, &inputs.resources, &renderer);
    let state = engine
        .plan(&modules, &inputs.configuration)
        .map_err(|err| explain(err, &inputs.catalog))?;

    let files = match &args.filter {
        Some(pattern) => state.fs.list_files_glob(pattern)?,
        None => state.fs.list_files(),
    };

    println!(
        "{} Plan for {} module(s)",
        out.label(Status::Info),
        modules.len()
    );
    print!("{}", render_plan(&state, &files, args.tree, &out)?);
    Ok(())
}

fn render_plan(
    state: &ProjectState,
    files: &[PathBuf],
    as_tree: bool,
    out: &OutputConfig,
) -> Result<String> {
    let mut text = String::new();

    writeln!(text, "\nFiles ({}):", files.len())?;
    if as_tree {
        let root = build_file_tree(state, files);
        let mut buffer = Vec::new();
        ptree::write_tree(&root, &mut buffer)?;
        text.push_str(&String::from_utf8_lossy(&buffer));
    } else {
        for file in files {
            writeln!(text, "  {}", file_label(state, &display(file), out))?;
        }
    }

    let manifest = &state.manifest;
    for (title, entries, separator) in [
        ("Dependencies", manifest.dependencies(), " "),
        ("Dev dependencies", manifest.dev_dependencies(), " "),
        ("Scripts", manifest.scripts(), ": "),
    ] {
        if entries.is_empty() {
            continue;
        }
        writeln!(text, "\n{}:", title)?;
        for (key, value) in entries {
            writeln!(text, "  {}{}{}", out.emphasis(key), separator, value)?;
        }
    }

    if !state.pre_commit.is_empty() {
        writeln!(text, "\nPre-commit:")?;
        for (filter, commands) in state.pre_commit.entries() {
            writeln!(text, "  {}: {}", out.emphasis(filter), commands.join(" && "))?;
        }
    }

    if !state.actions.is_empty() {
        writeln!(text, "\nPost actions:")?;
        for (index, (module, action)) in state.actions.describe().into_iter().enumerate() {
            writeln!(text, "  {}. {} [{}]", index + 1, action, module)?;
        }
    }

    for skipped in &state.skipped_edits {
        writeln!(
            text,
            "{} {}: skipped edit of {} ({})",
            out.label(Status::Warning),
            skipped.module,
            skipped.target,
            skipped.reason
        )?;
    }

    Ok(text)
}

fn file_label(state: &ProjectState, path: &str, out: &OutputConfig) -> String {
    match state.origin(path) {
        Some(module) => format!("{} [{}]", out.emphasis(path), module),
        None => format!("{} [generated]", out.emphasis(path)),
    }
}

#[derive(Default)]
struct Folder {
    folders: BTreeMap<String, Folder>,
    files: Vec<String>,
}

impl Folder {
    fn insert(&mut self, components: &[&str], label: String) {
        match components {
            [] => {}
            [_] => self.files.push(label),
            [first, rest @ ..] => self
                .folders
                .entry(first.to_string())
                .or_default()
                .insert(rest, label),
        }
    }

    fn into_node(self, label: String) -> TreeNode {
        let mut children: Vec<TreeNode> = self
            .folders
            .into_iter()
            .map(|(name, folder)| folder.into_node(format!("{}/", name)))
            .collect();
        children.extend(self.files.into_iter().map(|label| TreeNode {
            label,
            children: vec![],
        }));
        TreeNode { label, children }
    }
}

fn build_file_tree(state: &ProjectState, files: &[PathBuf]) -> TreeNode {
    let mut root = Folder::default();
    for file in files {
        let path = display(file);
        let components: Vec<&str> = path.split('/').collect();
        let name = components.last().copied().unwrap_or_default();
        let label = match state.origin(&path) {
            Some(module) => format!("{} [{}]", name, module),
            None => format!("{} [generated]", name),
        };
        root.insert(&components, label);
    }
    root.into_node(".".to_string())
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _style: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
