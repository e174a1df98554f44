use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::JudgeCoreError;
use crate::judge::TestdataConfig;

#[derive(Default)]
struct TestdataPair {
    input: Option<PathBuf>,
    answer: Option<PathBuf>,
}

/// Parse `N.in` / `N.out` into `(N, is_input)`. Other names yield `None`.
fn parse_testdata_name(file_name: &str) -> Option<(u32, bool)> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let is_input = match ext {
        "in" => true,
        "out" => false,
        _ => return None,
    };
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = stem.parse::<u32>().ok().filter(|&n| n > 0)?;
    Some((index, is_input))
}

/// Enumerate the test cases under `testdata_path`, ordered by number.
///
/// Cases are counted as `N.in`/`N.out` pairs and must be numbered `1..=count`
/// without gaps. Files that do not follow the naming scheme are ignored.
pub fn load_testdata(testdata_path: &Path) -> Result<Vec<TestdataConfig>, JudgeCoreError> {
    if !testdata_path.is_dir() {
        return Err(JudgeCoreError::TestdataError(format!(
            "test data directory not found: {:?}",
            testdata_path
        )));
    }

    let mut pairs: BTreeMap<u32, TestdataPair> = BTreeMap::new();
    for entry in fs::read_dir(testdata_path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some((index, is_input)) = file_name.to_str().and_then(parse_testdata_name) else {
            log::debug!("Ignoring {:?} in test data", file_name);
            continue;
        };
        let pair = pairs.entry(index).or_default();
        if is_input {
            pair.input = Some(entry.path());
        } else {
            pair.answer = Some(entry.path());
        }
    }

    let mut testdata_configs = Vec::with_capacity(pairs.len());
    for (expected_index, (index, pair)) in (1u32..).zip(pairs) {
        if index != expected_index {
            return Err(JudgeCoreError::TestdataError(format!(
                "test case {} is missing, numbering must be contiguous from 1",
                expected_index
            )));
        }
        match (pair.input, pair.answer) {
            (Some(input_file_path), Some(answer_file_path)) => {
                testdata_configs.push(TestdataConfig {
                    index,
                    input_file_path,
                    answer_file_path,
                })
            }
            (Some(_), None) => {
                return Err(JudgeCoreError::TestdataError(format!(
                    "{}.in has no matching {}.out",
                    index, index
                )))
            }
            (None, _) => {
                return Err(JudgeCoreError::TestdataError(format!(
                    "{}.out has no matching {}.in",
                    index, index
                )))
            }
        }
    }
    log::info!(
        "Loaded {} test cases from {:?}",
        testdata_configs.len(),
        testdata_path
    );
    Ok(testdata_configs)
}
