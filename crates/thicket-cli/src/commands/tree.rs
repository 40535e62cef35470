//! Tree listing command

use std::path::PathBuf;

use clap::Args;
use thicket_core::{Order, TraversalQuery};

use super::{load_model, node_row};
use crate::config::Config;
use crate::output::{print_rows, OutputFormat};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Manifest file (.json or .toml)
    pub file: PathBuf,

    /// Emit containers after their contents
    #[arg(long)]
    pub postorder: bool,

    /// Only include nodes of this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only include active nodes
    #[arg(short, long)]
    pub active: bool,

    /// Hide blocks that are only walked to reach the category
    #[arg(long)]
    pub no_parent_blocks: bool,
}

pub fn run(args: &TreeArgs, format: OutputFormat, config: &Config) -> anyhow::Result<()> {
    let (model, root) = load_model(&args.file)?;

    let mut query = TraversalQuery::new()
        .include_parent_blocks(!args.no_parent_blocks)
        .with_root_key("(root)");
    if let Some(category) = &args.category {
        query = query.with_category(category.as_str());
    }
    if args.active || config.active_only {
        query = query.only_active();
    }

    let order = if args.postorder {
        Order::Postorder
    } else {
        Order::Preorder
    };
    tracing::debug!("Listing {} in {}", args.file.display(), order);

    let names = model.generate_names_with(root, &TraversalQuery::new(), &config.prefix, |key| {
        key.to_string()
    })?;

    let mut rows = Vec::new();
    for (key, id) in model.traverse(root, order, &query)?.with_keys() {
        let name = match names.get(&id) {
            Some(name) => name.clone(),
            None => key.map(|k| k.to_string()).unwrap_or_default(),
        };
        rows.push(node_row(&model, root, id, name)?);
    }

    print_rows(&rows, format);
    Ok(())
}
