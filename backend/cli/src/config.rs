//! Config loading shared by every subcommand.

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use textlift_config::{config_file_path, load_and_prepare, PreparedConfig};

/// Load the service config from `--config`, `TEXTLIFT_CONFIG` or `./textlift.yaml`,
/// with the process environment applied on top.
pub async fn load(explicit: Option<&Path>) -> Result<PreparedConfig> {
    let path = config_file_path(explicit);
    let env: HashMap<String, String> = std::env::vars().collect();
    load_and_prepare(&path, &env).await
}
