//! xmpstamp CLI - write structure metadata into image headers

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use xmpstamp::controller::ABORT_MESSAGE;
use xmpstamp::journal::{JsonLinesJournal, LogJournal, TeeJournal};
use xmpstamp::render::Invocation;
use xmpstamp::writer::WriteOutcome;
use xmpstamp::{
    load_config, load_properties, load_ruleset, load_structure, CommandWriter, Controller,
    DryRunWriter, FolderImageSource, HeaderWriter, ImageSource, Journal, JournalEntry,
    ProcessProperties, RenderMode, Ruleset, RunReport, SelectedConfig, StructureFile,
    VariableReplacer,
};

#[derive(Parser)]
#[command(name = "xmpstamp")]
#[command(author = "xmpstamp contributors")]
#[command(version)]
#[command(about = "Write structure metadata into image headers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write headers into all configured image folders
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Print the writer calls instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Append journal entries as JSON lines to this file
        #[arg(long, value_name = "FILE", env = "XMPSTAMP_JOURNAL")]
        journal: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the rendered tokens of every image in a folder
    Tokens {
        #[command(flatten)]
        input: InputArgs,

        /// Folder identifier (defaults to the first configured folder)
        #[arg(long, value_name = "NAME")]
        folder: Option<String>,

        /// Print the tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a summary of a document structure
    Info {
        /// Document structure (JSON)
        #[arg(value_name = "FILE")]
        structure: PathBuf,

        /// Ruleset (JSON), used to detect the anchor
        #[arg(short, long, value_name = "FILE")]
        ruleset: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct InputArgs {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", env = "XMPSTAMP_CONFIG")]
    config: PathBuf,

    /// Project name used to select the configuration block
    #[arg(long, default_value = "*")]
    project: String,

    /// Step name used to select the configuration block
    #[arg(long, default_value = "*")]
    step: String,

    /// Document structure (JSON)
    #[arg(short, long, value_name = "FILE")]
    structure: PathBuf,

    /// Ruleset (JSON)
    #[arg(short, long, value_name = "FILE")]
    ruleset: PathBuf,

    /// Process properties (JSON)
    #[arg(short, long, value_name = "FILE")]
    properties: Option<PathBuf>,

    /// Directory holding one subdirectory per folder identifier
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    images: PathBuf,

    /// Map a folder identifier to a directory (NAME=DIR)
    #[arg(long = "map", value_name = "NAME=DIR", value_parser = parse_key_value)]
    mappings: Vec<(String, String)>,

    /// Custom value for variable sources (KEY=VALUE)
    #[arg(long = "value", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    values: Vec<(String, String)>,
}

/// Configuration, ruleset and properties. The structure is read by the controller.
struct Settings {
    selected: SelectedConfig,
    ruleset: Ruleset,
    properties: ProcessProperties,
}

impl InputArgs {
    fn load_settings(&self) -> xmpstamp::Result<Settings> {
        let selected = load_config(&self.config, &self.project, &self.step)?;
        let ruleset = load_ruleset(&self.ruleset)?;
        let properties = match &self.properties {
            Some(path) => load_properties(path)?,
            None => ProcessProperties::new(),
        };
        Ok(Settings {
            selected,
            ruleset,
            properties,
        })
    }

    fn image_source(&self) -> FolderImageSource {
        let mut images = FolderImageSource::new(&self.images);
        for (name, dir) in &self.mappings {
            images = images.with_folder(name.clone(), dir);
        }
        images
    }

    fn structure(&self) -> StructureFile {
        StructureFile::new(&self.structure)
    }

    fn controller(&self, settings: Settings) -> Controller {
        let mut variables = VariableReplacer::new().with_properties(settings.properties.clone());
        for (key, value) in &self.values {
            variables = variables.with_value(key.clone(), value.clone());
        }

        Controller::from_selected(settings.selected, settings.ruleset, self.image_source())
            .with_properties(settings.properties)
            .with_variables(variables)
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

/// Advances a progress bar for every header written.
struct ProgressWriter<W> {
    inner: W,
    bar: ProgressBar,
}

impl<W: HeaderWriter> HeaderWriter for ProgressWriter<W> {
    fn write(&mut self, command: &Path, args: &[String]) -> xmpstamp::Result<WriteOutcome> {
        if let Some(file) = args.last() {
            let name = Path::new(file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.bar.set_message(name);
        }
        let outcome = self.inner.write(command, args)?;
        self.bar.inc(1);
        Ok(outcome)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            dry_run,
            journal,
            quiet,
            json,
        } => cmd_run(&input, dry_run, journal.as_deref(), quiet, json),
        Commands::Tokens {
            input,
            folder,
            json,
        } => cmd_tokens(&input, folder.as_deref(), json),
        Commands::Info { structure, ruleset } => cmd_info(&structure, ruleset.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

/// Number of images listed in the given folders.
fn image_count(images: &dyn ImageSource, folders: &[String]) -> usize {
    folders
        .iter()
        .map(|folder| images.list(folder).map(|l| l.len()).unwrap_or(0))
        .sum()
}

/// Load the settings and run the controller. Every fatal error is journaled once.
fn run_headers(
    input: &InputArgs,
    dry_run: bool,
    quiet: bool,
    journal: &mut dyn Journal,
) -> xmpstamp::Result<(RunReport, Vec<Invocation>)> {
    let settings = match input.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            journal.record(JournalEntry::error(format!("{}: {}", ABORT_MESSAGE, e)));
            return Err(e);
        }
    };

    let total = image_count(&input.image_source(), &settings.selected.config.folders);
    let bar = progress_bar(total as u64, quiet);

    let controller = input.controller(settings);
    let structure = input.structure();

    let (result, invocations) = if dry_run {
        let mut writer = ProgressWriter {
            inner: DryRunWriter::new(),
            bar: bar.clone(),
        };
        let result = controller.run(&structure, &mut writer, journal);
        (result, writer.inner.into_invocations())
    } else {
        let mut writer = ProgressWriter {
            inner: CommandWriter::new(),
            bar: bar.clone(),
        };
        let result = controller.run(&structure, &mut writer, journal);
        (result, Vec::new())
    };

    match result {
        Ok(report) => {
            bar.finish_with_message("Done!");
            Ok((report, invocations))
        }
        Err(e) => {
            bar.abandon_with_message("Aborted");
            Err(e)
        }
    }
}

fn cmd_run(
    input: &InputArgs,
    dry_run: bool,
    journal_path: Option<&Path>,
    quiet: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut log_journal = LogJournal;
    let mut file_journal = match journal_path.map(JsonLinesJournal::open).transpose() {
        Ok(file) => file,
        Err(e) => {
            log_journal.record(JournalEntry::error(format!("{}: {}", ABORT_MESSAGE, e)));
            return Err(e.into());
        }
    };
    let mut journal = TeeJournal::new().with(&mut log_journal);
    if let Some(file) = file_journal.as_mut() {
        journal = journal.with(file as &mut dyn Journal);
    }

    let (report, invocations) = run_headers(input, dry_run, quiet, &mut journal)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for invocation in &invocations {
        println!("{}", invocation.command_line());
    }

    println!("\n{}", "Folders:".green().bold());
    let count = report.folders.len();
    for (i, folder) in report.folders.iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        let mode = match folder.mode {
            RenderMode::PerPage => folder.mode.to_string().normal(),
            RenderMode::Default => folder.mode.to_string().yellow(),
        };
        println!(
            "  {} {}: {} images ({})",
            branch.dimmed(),
            folder.folder,
            folder.images_written,
            mode
        );
    }
    println!(
        "\n{} {} images written",
        "Done!".green().bold(),
        report.images_written()
    );

    Ok(())
}

fn cmd_tokens(
    input: &InputArgs,
    folder: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = input.controller(input.load_settings()?);

    let folder = match folder {
        Some(f) => f.to_string(),
        None => controller
            .config()
            .folders
            .first()
            .cloned()
            .ok_or("no folders configured")?,
    };

    let previews = controller.preview(&input.structure(), &folder)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
        return Ok(());
    }

    for preview in &previews {
        let page = match preview.page {
            Some(id) => format!("node {}", id.index()),
            None => "default".to_string(),
        };
        println!(
            "{} {}",
            preview.image.display().to_string().bold(),
            format!("({})", page).dimmed()
        );
        for token in &preview.tokens {
            println!("  {}", token);
        }
    }

    Ok(())
}

fn cmd_info(structure: &Path, ruleset: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_structure(structure)?;
    let ruleset = match ruleset {
        Some(path) => load_ruleset(path)?,
        None => Ruleset::new(),
    };

    println!("{}", "Structure Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), structure.display());
    println!("{}: {}", "Nodes".bold(), doc.len());

    let top = doc.top_structs(&ruleset)?;
    println!("{}: {}", "Top logical".bold(), doc.node(top.logical).type_name);
    match top.anchor {
        Some(anchor) => println!("{}: {}", "Anchor".bold(), doc.node(anchor).type_name),
        None => println!("{}: {}", "Anchor".bold(), "none".dimmed()),
    }
    println!("{}: {}", "Physical".bold(), doc.node(top.physical).type_name);

    let pages = doc.pages();
    let references: usize = pages.iter().map(|p| doc.references(*p).len()).sum();
    let unreferenced = pages.iter().filter(|p| doc.references(**p).is_empty()).count();

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages".bold(), pages.len());
    println!("{}: {}", "References".bold(), references);
    println!("{}: {}", "Unreferenced pages".bold(), unreferenced);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "xmpstamp".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Image header metadata tool");
    println!();
    println!("Repository: {}", "https://github.com/xmpstamp/xmpstamp".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use xmpstamp::journal::MemoryJournal;
    use xmpstamp::{ErrorKind, LogType};

    const CONFIG: &str = r#"
[[config]]
folders = ["media"]
command = "/usr/bin/exiftool"
parameters = ["-overwrite_original", "{PARAM}", "{FILE}"]

[[config.field]]
name = "-xmp-dc:title"

[[config.field.source]]
type = "metadata"
name = "TitleDocMain"
use = "logical"
"#;

    const RULESET: &str = r#"{"metadata": [{"name": "TitleDocMain"}], "structures": []}"#;

    const STRUCTURE: &str = r#"{
        "nodes": [
            {"type": "Monograph", "metadata": [{"type": "TitleDocMain", "value": "Faust"}]},
            {"type": "BoundBook", "children": [2, 3]},
            {"type": "page", "references": [0]},
            {"type": "page", "references": [0]}
        ],
        "logical": 0,
        "physical": 1
    }"#;

    /// Write the input files and two images into `dir`.
    fn write_inputs(dir: &Path, config: &str, structure: &str) {
        fs::write(dir.join("config.toml"), config).unwrap();
        fs::write(dir.join("ruleset.json"), RULESET).unwrap();
        fs::write(dir.join("structure.json"), structure).unwrap();
        let media = dir.join("media");
        fs::create_dir(&media).unwrap();
        for n in 1..=2 {
            File::create(media.join(format!("{:08}.tif", n))).unwrap();
        }
    }

    fn input_args(dir: &Path) -> InputArgs {
        let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "xmpstamp".to_string(),
            "run".to_string(),
            "-c".to_string(),
            path("config.toml"),
            "-s".to_string(),
            path("structure.json"),
            "-r".to_string(),
            path("ruleset.json"),
            "-i".to_string(),
            dir.to_string_lossy().into_owned(),
        ])
        .unwrap();
        match cli.command {
            Commands::Run { input, .. } => input,
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("master=/data/master").unwrap(),
            ("master".to_string(), "/data/master".to_string())
        );
        assert_eq!(
            parse_key_value("title=a=b").unwrap(),
            ("title".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("nothing").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "xmpstamp",
            "run",
            "--config",
            "x.toml",
            "--structure",
            "s.json",
            "--ruleset",
            "r.json",
            "--map",
            "media=/tmp/media",
            "--dry-run",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                input,
                dry_run,
                json,
                ..
            } => {
                assert!(dry_run);
                assert!(json);
                assert_eq!(input.mappings, vec![("media".to_string(), "/tmp/media".to_string())]);
                assert_eq!(input.project, "*");
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_unreadable_structure_is_journaled() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), CONFIG, "{ not json");
        let input = input_args(dir.path());

        let journal_path = dir.path().join("journal.jsonl");
        let mut journal = JsonLinesJournal::open(&journal_path).unwrap();
        let err = run_headers(&input, true, true, &mut journal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MetadataRead);
        drop(journal);

        let text = fs::read_to_string(&journal_path).unwrap();
        let entries: Vec<JournalEntry> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogType::Error);
        assert!(entries[0].message.starts_with(ABORT_MESSAGE));
    }

    #[test]
    fn test_settings_errors_are_journaled() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), "[[config]\nfolders = ", STRUCTURE);
        let input = input_args(dir.path());

        let mut journal = MemoryJournal::new();
        let err = run_headers(&input, true, true, &mut journal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(journal.entries_of(LogType::Error).count(), 1);

        // broken ruleset, valid config
        fs::write(dir.path().join("config.toml"), CONFIG).unwrap();
        fs::write(dir.path().join("ruleset.json"), "{\"metadata\": 3}").unwrap();
        let err = run_headers(&input, true, true, &mut journal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(journal.entries_of(LogType::Error).count(), 2);
    }

    #[test]
    fn test_dry_run_from_files() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), CONFIG, STRUCTURE);
        let input = input_args(dir.path());

        let mut journal = MemoryJournal::new();
        let (report, invocations) = run_headers(&input, true, true, &mut journal).unwrap();
        assert_eq!(report.images_written(), 2);
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].args[1], "-xmp-dc:title=Faust");
        assert_eq!(journal.entries_of(LogType::Error).count(), 0);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["folders"][0]["mode"], "perPage");
        assert_eq!(value["folders"][0]["images_written"], 2);
    }

    #[test]
    fn test_image_count_follows_listings() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), CONFIG, STRUCTURE);
        File::create(dir.path().join("media").join("00000003.tif")).unwrap();
        File::create(dir.path().join("media").join("notes.txt")).unwrap();
        let input = input_args(dir.path());

        let images = input.image_source();
        let folders = vec!["media".to_string(), "missing".to_string()];
        // three images against two pages, a missing folder counts nothing
        assert_eq!(image_count(&images, &folders), 3);
    }
}
