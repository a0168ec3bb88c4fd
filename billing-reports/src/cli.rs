use std::path::{Path, PathBuf};

use thiserror::Error;

/// Wrong number of command-line arguments. Displays the usage line.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("usage: {program} <input-file> [output-file]")]
pub struct UsageError {
    pub program: &'static str,
}

/// Input path and optional output path from `argv`, program name first.
pub fn parse_args(program: &'static str, args: &[String]) -> Result<(PathBuf, Option<PathBuf>), UsageError> {
    match args {
        [_, input] => Ok((PathBuf::from(input), None)),
        [_, input, output] => Ok((PathBuf::from(input), Some(PathBuf::from(output)))),
        _ => Err(UsageError { program }),
    }
}

pub fn aggregate_summary(saved: &Path) -> Vec<String> {
    vec![format!("Saved aggregated file to: {}", saved.display())]
}

pub fn conflict_summary(premises: usize, detail_rows: usize, saved: &Path) -> Vec<String> {
    vec![
        format!("Found {premises} premises with conflicts."),
        format!("Total rows in Detail sheet: {detail_rows}"),
        format!("Saved results to: {}", saved.display()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn input_alone_leaves_output_to_config() {
        let parsed = parse_args("aggregate", &argv(&["aggregate", "export.xlsx"])).unwrap();
        assert_eq!(parsed, (PathBuf::from("export.xlsx"), None));
    }

    #[test]
    fn explicit_output_is_kept() {
        let parsed = parse_args("find-conflicts", &argv(&["find-conflicts", "in.csv", "out.csv"])).unwrap();
        assert_eq!(parsed, (PathBuf::from("in.csv"), Some(PathBuf::from("out.csv"))));
    }

    #[test]
    fn missing_or_extra_arguments_are_usage_errors() {
        for args in [vec!["aggregate"], vec![], vec!["aggregate", "a", "b", "c"]] {
            let err = parse_args("aggregate", &argv(&args)).unwrap_err();
            assert_eq!(err.to_string(), "usage: aggregate <input-file> [output-file]");
        }
    }

    #[test]
    fn summaries_name_counts_and_saved_path() {
        assert_eq!(
            aggregate_summary(Path::new("usage.xlsx")),
            vec!["Saved aggregated file to: usage.xlsx"]
        );
        assert_eq!(
            conflict_summary(2, 7, Path::new("Premise_Conflicts.xlsx")),
            vec![
                "Found 2 premises with conflicts.",
                "Total rows in Detail sheet: 7",
                "Saved results to: Premise_Conflicts.xlsx",
            ]
        );
    }
}
