//! This module is responsible for loading the map graph, the training
//! examples and rule sets from their JSON interchange documents.

mod builder;
mod document;

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::info;

pub use builder::{GraphBuilder, ROUTABLE_TAG};
pub use document::{MapDocument, RawNode, RawWay};

use crate::{Error, learning::TrainingExample, model::GraphModel, rules::RuleSet};

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    Ok(BufReader::new(file))
}

/// Loads a map document and builds the routable graph from it
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a way
/// references a node missing from the document
pub fn load_graph(path: &Path) -> Result<GraphModel, Error> {
    info!("Loading map data from {}", path.display());
    let document: MapDocument = serde_json::from_reader(open(path)?)?;
    document.into_graph()
}

/// Loads the ordered list of training examples
pub fn load_training(path: &Path) -> Result<Vec<TrainingExample>, Error> {
    let examples: Vec<TrainingExample> = serde_json::from_reader(open(path)?)?;
    info!("Loaded {} training examples", examples.len());
    Ok(examples)
}

/// Loads a rule set stored as `{"W:key==value": [distance, fixed], ...}`
pub fn load_rules(path: &Path) -> Result<RuleSet, Error> {
    let rules: RuleSet = serde_json::from_reader(open(path)?)?;
    info!("Loaded {} rules", rules.len());
    Ok(rules)
}

/// Writes a rule set in the format read by [`load_rules`]
pub fn save_rules(path: &Path, rules: &RuleSet) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to create file '{}': {}", path.display(), e),
        )
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rules)?;
    writer.flush()?;
    info!("Saved {} rules to {}", rules.len(), path.display());
    Ok(())
}
