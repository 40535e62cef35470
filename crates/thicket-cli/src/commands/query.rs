//! Search commands: components, blocks, categories and names

use std::collections::{BTreeMap, HashMap};

use thicket_core::{Model, NodeId, TraversalQuery};

use super::{load_model, node_row, QueryArgs};
use crate::config::Config;
use crate::output::{format_json, print_rows, OutputFormat};

/// Names for every node under the root, used to label search results
fn all_names(model: &Model, root: NodeId, prefix: &str) -> anyhow::Result<HashMap<NodeId, String>> {
    Ok(model.generate_names_with(root, &TraversalQuery::new(), prefix, |key| key.to_string())?)
}

pub fn run_components(args: &QueryArgs, format: OutputFormat, config: &Config) -> anyhow::Result<()> {
    let (model, root) = load_model(&args.file)?;
    let query = args.to_query(config);
    let names = all_names(&model, root, &config.prefix)?;

    let mut rows = Vec::new();
    for id in model.components(root, &query)? {
        let name = names.get(&id).cloned().unwrap_or_default();
        rows.push(node_row(&model, root, id, name)?);
    }
    tracing::info!("Found {} components", rows.len());

    print_rows(&rows, format);
    Ok(())
}

pub fn run_blocks(args: &QueryArgs, format: OutputFormat, config: &Config) -> anyhow::Result<()> {
    let (model, root) = load_model(&args.file)?;
    let query = args.to_query(config);
    let names = all_names(&model, root, &config.prefix)?;

    let mut rows = Vec::new();
    for id in model.blocks(root, &query)? {
        let name = match names.get(&id) {
            Some(name) => name.clone(),
            None => "(root)".to_string(),
        };
        rows.push(node_row(&model, root, id, name)?);
    }
    tracing::info!("Found {} blocks", rows.len());

    print_rows(&rows, format);
    Ok(())
}

pub fn run_categories(
    args: &QueryArgs,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<()> {
    let (model, root) = load_model(&args.file)?;
    let query = args.to_query(config);
    let categories = model.collect_ctypes(root, &query)?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&categories)),
        OutputFormat::Table => {
            for category in &categories {
                println!("{}", category);
            }
        }
    }
    Ok(())
}

pub fn run_names(
    args: &QueryArgs,
    prefix: Option<&str>,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<()> {
    let (model, root) = load_model(&args.file)?;
    let query = args.to_query(config);
    let prefix = prefix.unwrap_or(&config.prefix);

    // Sorted by name for stable output
    let names: BTreeMap<String, String> = model
        .generate_names_with(root, &query, prefix, |key| key.to_string())?
        .into_iter()
        .map(|(id, name)| (name, id.to_string()))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", format_json(&names)),
        OutputFormat::Table => {
            for name in names.keys() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
