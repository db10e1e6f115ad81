//! Command-line surface: argument parsing and the `flatten` subcommand.

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::{PathBufValueParser, TypedValueParser};
use clap::{Parser, Subcommand, ValueEnum};
use flatkit_io_fs::{
    C_SEPARATOR_DEFAULT, EnumFlattenPatternMode, ReportFlatten, SpecFlattenOptions, flatten_copy,
};

/// Flatten folder structures by copying files with path-encoded names.
#[derive(Debug, Parser)]
#[command(name = "flatkit", version)]
pub struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Copy files from SOURCES into DEST, encoding nested paths into file names.
    Flatten(ArgsFlatten),
}

#[derive(Debug, clap::Args)]
pub struct ArgsFlatten {
    /// One or more existing source files or directories to flatten.
    #[arg(required = true, value_parser = existing_path_parser())]
    pub sources: Vec<PathBuf>,

    /// Destination directory for flattened files.
    #[arg(short, long)]
    pub dest: PathBuf,

    /// Separator used to encode path components.
    #[arg(long, env = "FLATKIT_SEPARATOR", default_value = C_SEPARATOR_DEFAULT)]
    pub sep: String,

    /// Only copy files whose name matches (repeatable).
    #[arg(long = "include")]
    pub patterns_include: Vec<String>,

    /// Skip files whose name matches (repeatable).
    #[arg(long = "exclude")]
    pub patterns_exclude: Vec<String>,

    /// Do not descend into directories whose name matches (repeatable).
    #[arg(long = "exclude-dir")]
    pub patterns_exclude_dir: Vec<String>,

    /// How include/exclude patterns are interpreted.
    #[arg(long, value_enum, default_value_t = ArgPatternMode::Glob)]
    pub pattern_mode: ArgPatternMode,

    /// Show what would be copied without writing files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArgPatternMode {
    Glob,
    Regex,
    Literal,
}

impl From<ArgPatternMode> for EnumFlattenPatternMode {
    fn from(value: ArgPatternMode) -> Self {
        match value {
            ArgPatternMode::Glob => Self::Glob,
            ArgPatternMode::Regex => Self::Regex,
            ArgPatternMode::Literal => Self::Literal,
        }
    }
}

/// Reject sources that do not exist (dangling links included) at parse time.
fn existing_path_parser() -> impl TypedValueParser<Value = PathBuf> {
    PathBufValueParser::new().try_map(|path: PathBuf| {
        if path.exists() {
            Ok(path)
        } else {
            Err(format!("Path '{}' does not exist.", path.display()))
        }
    })
}

fn non_empty(patterns: Vec<String>) -> Option<Vec<String>> {
    (!patterns.is_empty()).then_some(patterns)
}

impl ArgsFlatten {
    pub fn to_options(&self) -> SpecFlattenOptions {
        SpecFlattenOptions {
            separator: self.sep.clone(),
            patterns_include_files: non_empty(self.patterns_include.clone()),
            patterns_exclude_files: non_empty(self.patterns_exclude.clone()),
            patterns_exclude_dirs: non_empty(self.patterns_exclude_dir.clone()),
            rule_pattern: self.pattern_mode.into(),
            if_dry_run: self.dry_run,
        }
    }
}

/// Run the parsed command; fatal flatten errors come back as `Err`.
pub fn run(cli: Cli) -> Result<ReportFlatten> {
    match cli.command {
        Commands::Flatten(args) => {
            let spec_options = args.to_options();
            let report = flatten_copy(&args.sources, &args.dest, spec_options)?;
            let c_mode = if args.dry_run { " (dry run)" } else { "" };
            println!(
                "✓ Successfully flattened {} source(s) to {}{c_mode}",
                args.sources.len(),
                args.dest.display()
            );
            println!("{report}");
            Ok(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::Parser;
    use tempfile::TempDir;

    use super::{ArgPatternMode, Cli, Commands};
    use flatkit_io_fs::EnumFlattenPatternMode;

    #[test]
    fn parse_flatten_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let src_a = tmp.path().join("a");
        let src_b = tmp.path().join("b.txt");
        std::fs::create_dir(&src_a).expect("mkdir");
        std::fs::write(&src_b, "b").expect("write");

        let cli = Cli::try_parse_from([
            OsString::from("flatkit"),
            OsString::from("flatten"),
            src_a.into_os_string(),
            src_b.into_os_string(),
            OsString::from("--dest"),
            OsString::from("out"),
        ])
        .expect("parse");
        let Commands::Flatten(args) = cli.command;

        assert_eq!(args.sources.len(), 2);
        assert_eq!(args.dest.to_string_lossy(), "out");
        assert_eq!(args.pattern_mode, ArgPatternMode::Glob);

        let spec_options = args.to_options();
        assert_eq!(spec_options.patterns_include_files, None);
        assert!(!spec_options.if_dry_run);
    }

    #[test]
    fn parse_flatten_with_filters() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "flatkit",
            "-vv",
            "flatten",
            src.as_str(),
            "-d",
            "out",
            "--sep=--",
            "--include",
            r"^.*\.rs$",
            "--exclude-dir",
            "target",
            "--pattern-mode",
            "regex",
            "--dry-run",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        let Commands::Flatten(args) = cli.command;

        let spec_options = args.to_options();
        assert_eq!(spec_options.separator, "--");
        assert_eq!(
            spec_options.patterns_include_files,
            Some(vec![r"^.*\.rs$".to_string()])
        );
        assert_eq!(
            spec_options.patterns_exclude_dirs,
            Some(vec!["target".to_string()])
        );
        assert_eq!(spec_options.rule_pattern, EnumFlattenPatternMode::Regex);
        assert!(spec_options.if_dry_run);
    }

    #[test]
    fn parse_requires_sources_and_dest() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().to_string_lossy().to_string();
        assert!(Cli::try_parse_from(["flatkit", "flatten", "--dest", "out"]).is_err());
        assert!(Cli::try_parse_from(["flatkit", "flatten", src.as_str()]).is_err());
    }

    #[test]
    fn parse_rejects_missing_source() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("does_not_exist");
        let missing = missing.to_string_lossy().to_string();

        let err = Cli::try_parse_from(["flatkit", "flatten", missing.as_str(), "-d", "out"])
            .expect_err("missing source rejected");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("does not exist"));
    }
}
