use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub fn load_json<T: DeserializeOwned>(file_path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let raw_data = fs::read_to_string(file_path)?;
    let value: T = serde_json::from_str(&raw_data)?;
    Ok(value)
}
