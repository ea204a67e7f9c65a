use crate::utils::constants::RESULT_FILE_SUFFIX;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Output path for an input file: `<dir>/<stem>_result<.ext>`
pub fn result_file_path(input: &Path) -> PathBuf {
    let mut file_name = OsString::new();
    if let Some(stem) = input.file_stem() {
        file_name.push(stem);
    }
    file_name.push(RESULT_FILE_SUFFIX);
    if let Some(ext) = input.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    input.with_file_name(file_name)
}

/// Result files of `inputs` that are already on disk
pub fn existing_results(inputs: &[PathBuf]) -> Vec<PathBuf> {
    inputs
        .iter()
        .map(|input| result_file_path(input))
        .filter(|output| output.exists())
        .collect()
}
