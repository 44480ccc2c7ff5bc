use std::{fs, path::Path};

use crate::{errors::DefinitionsError, ledger::TransactionDefinition};

/// Writes transaction definitions to disk atomically by staging to a temporary file.
pub fn save_definitions_to_file(
    definitions: &[TransactionDefinition],
    path: &Path,
) -> Result<(), DefinitionsError> {
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(definitions)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Loads transaction definitions from a JSON array on disk.
pub fn load_definitions_from_file(
    path: &Path,
) -> Result<Vec<TransactionDefinition>, DefinitionsError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
