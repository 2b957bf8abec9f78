//! Reconciliation controller: one run over all configured folders.
//!
//! For every folder the images are matched against the pages of the physical
//! structure. Equal counts pair them in order; otherwise the default
//! configuration (if any) is rendered for every image without page context.
//! Any failure aborts the run: it is journaled once and returned as `Err`.
//!
//! ```no_run
//! use xmpstamp::config::ConfigFile;
//! use xmpstamp::controller::{Controller, StructureFile};
//! use xmpstamp::images::FolderImageSource;
//! use xmpstamp::journal::LogJournal;
//! use xmpstamp::writer::CommandWriter;
//!
//! let selected = ConfigFile::load("xmpstamp.toml")?.select("Digitization", "Write headers")?;
//! let ruleset = xmpstamp::load_ruleset("ruleset.json")?;
//! let controller = Controller::from_selected(selected, ruleset, FolderImageSource::new("/data/42/images"));
//!
//! let report = controller.run(
//!     &StructureFile::new("/data/42/structure.json"),
//!     &mut CommandWriter::new(),
//!     &mut LogJournal,
//! )?;
//! println!("{} images written", report.images_written());
//! # Ok::<(), xmpstamp::Error>(())
//! ```

mod report;
mod source;

pub use report::{FolderReport, ImagePreview, RenderMode, RunReport};
pub use source::{StructureFile, StructureSource};

use crate::config::{OutputField, RunConfig, SelectedConfig};
use crate::error::{Error, Result};
use crate::images::ImageSource;
use crate::journal::{Journal, JournalEntry};
use crate::model::{DocumentStructure, NodeId, ProcessProperties, Ruleset, TopStructs};
use crate::render::{build_invocation, render_image};
use crate::resolve::{Context, Resolver};
use crate::variables::{VariableReplacer, VariableResolver};
use crate::writer::HeaderWriter;
use log::{debug, error, info, warn};
use std::path::PathBuf;

/// Prefix of the journal entry written when a run aborts.
pub const ABORT_MESSAGE: &str = "Error while writing the image headers";

/// Drives a run: structure, folders, images, writer.
pub struct Controller {
    config: RunConfig,
    default_config: Option<RunConfig>,
    ruleset: Ruleset,
    properties: ProcessProperties,
    variables: Box<dyn VariableResolver>,
    custom_variables: bool,
    images: Box<dyn ImageSource>,
}

/// Images of one folder paired with their pages.
struct FolderPlan<'c> {
    mode: RenderMode,
    fields: &'c [OutputField],
    images: Vec<(PathBuf, Option<NodeId>)>,
}

impl Controller {
    /// Create a controller for a main configuration.
    pub fn new(config: RunConfig, ruleset: Ruleset, images: impl ImageSource + 'static) -> Self {
        Self {
            config,
            default_config: None,
            ruleset,
            properties: ProcessProperties::default(),
            variables: Box::new(VariableReplacer::new()),
            custom_variables: false,
            images: Box::new(images),
        }
    }

    /// Create a controller from a selected configuration file block.
    pub fn from_selected(
        selected: SelectedConfig,
        ruleset: Ruleset,
        images: impl ImageSource + 'static,
    ) -> Self {
        let controller = Self::new(selected.config, ruleset, images);
        match selected.default_config {
            Some(default) => controller.with_default_config(default),
            None => controller,
        }
    }

    /// Set the fallback configuration used when page and image counts differ.
    pub fn with_default_config(mut self, config: RunConfig) -> Self {
        self.default_config = Some(config);
        self
    }

    /// Set the process properties.
    pub fn with_properties(mut self, properties: ProcessProperties) -> Self {
        if !self.custom_variables {
            self.variables = Box::new(VariableReplacer::new().with_properties(properties.clone()));
        }
        self.properties = properties;
        self
    }

    /// Set the resolver for `variable` sources.
    ///
    /// Without one, a [`VariableReplacer`] over the process properties is used.
    pub fn with_variables(mut self, variables: impl VariableResolver + 'static) -> Self {
        self.variables = Box::new(variables);
        self.custom_variables = true;
        self
    }

    /// The main configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run over all folders.
    ///
    /// Returns the report of a completed run. On abort, exactly one error
    /// entry is journaled and the error is returned; writes already done are
    /// kept.
    pub fn run(
        &self,
        source: &dyn StructureSource,
        writer: &mut dyn HeaderWriter,
        journal: &mut dyn Journal,
    ) -> Result<RunReport> {
        match self.execute(source, writer, journal) {
            Ok(report) => {
                info!(
                    "run completed: {} images in {} folders",
                    report.images_written(),
                    report.folders.len()
                );
                Ok(report)
            }
            Err(e) => {
                error!("run aborted ({}): {}", e.kind(), e);
                journal.record(JournalEntry::error(format!("{}: {}", ABORT_MESSAGE, e)));
                Err(e)
            }
        }
    }

    /// Render the tokens of every image in a folder without writing.
    ///
    /// The same pre-flight checks as [`Controller::run`] apply.
    pub fn preview(&self, source: &dyn StructureSource, folder: &str) -> Result<Vec<ImagePreview>> {
        self.preflight()?;

        let structure = source.load()?;
        let top = structure.top_structs(&self.ruleset)?;
        let pages = pages(&structure)?;
        let plan = self.plan_folder(folder, pages)?;

        let resolver = self.resolver();

        plan.images
            .into_iter()
            .map(|(image, page)| {
                let ctx = context(&structure, top, &image, page);
                let tokens = render_image(&resolver, plan.fields, &ctx)?;
                Ok(ImagePreview {
                    image,
                    page,
                    tokens,
                })
            })
            .collect()
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.ruleset, &self.properties, self.variables.as_ref())
    }

    fn preflight(&self) -> Result<()> {
        if self.config.folders.is_empty() {
            return Err(Error::Configuration("no folders configured".to_string()));
        }
        if self.config.command.trim().is_empty() {
            return Err(Error::Configuration("no command configured".to_string()));
        }
        if self.ruleset.is_empty() {
            return Err(Error::Configuration("The ruleset is not valid".to_string()));
        }
        let missing = self.config.missing_placeholders();
        if !missing.is_empty() {
            warn!(
                "parameter template lacks {}, writer calls will not carry them",
                missing.join(" and ")
            );
        }
        Ok(())
    }

    fn execute(
        &self,
        source: &dyn StructureSource,
        writer: &mut dyn HeaderWriter,
        journal: &mut dyn Journal,
    ) -> Result<RunReport> {
        self.preflight()?;

        let structure = source.load()?;
        let top = structure.top_structs(&self.ruleset)?;
        let pages = pages(&structure)?;
        debug!("structure has {} pages", pages.len());

        let resolver = self.resolver();

        let mut report = RunReport::default();
        for folder in &self.config.folders {
            let plan = self.plan_folder(folder, pages)?;
            debug!("folder {}: {} images, {} mode", folder, plan.images.len(), plan.mode);

            for (image, page) in &plan.images {
                let ctx = context(&structure, top, image, *page);
                self.write_image(&resolver, plan.fields, &ctx, writer)?;
            }

            let written = plan.images.len();
            info!("folder {} done: {} images ({})", folder, written, plan.mode);
            journal.record(JournalEntry::info(format!(
                "Wrote image headers for {} images in folder {} ({})",
                written, folder, plan.mode
            )));
            report.folders.push(FolderReport {
                folder: folder.clone(),
                mode: plan.mode,
                images_written: written,
            });
        }

        Ok(report)
    }

    fn plan_folder(&self, folder: &str, pages: &[NodeId]) -> Result<FolderPlan<'_>> {
        let images = self.images.list(folder)?;

        if images.len() == pages.len() {
            return Ok(FolderPlan {
                mode: RenderMode::PerPage,
                fields: &self.config.fields,
                images: images
                    .into_iter()
                    .zip(pages.iter().map(|p| Some(*p)))
                    .collect(),
            });
        }

        match &self.default_config {
            Some(default) => {
                warn!(
                    "folder {}: {} images but {} pages, using default configuration",
                    folder,
                    images.len(),
                    pages.len()
                );
                Ok(FolderPlan {
                    mode: RenderMode::Default,
                    fields: &default.fields,
                    images: images.into_iter().map(|i| (i, None)).collect(),
                })
            }
            None => Err(Error::DataMismatch {
                folder: folder.to_string(),
                pages: pages.len(),
                images: images.len(),
            }),
        }
    }

    fn write_image(
        &self,
        resolver: &Resolver<'_>,
        fields: &[OutputField],
        ctx: &Context<'_>,
        writer: &mut dyn HeaderWriter,
    ) -> Result<()> {
        let tokens = render_image(resolver, fields, ctx)?;
        let invocation = build_invocation(
            &self.config.command,
            &self.config.parameters,
            &tokens,
            ctx.image,
        );
        debug!("running {}", invocation);

        let outcome = writer.write(&invocation.command, &invocation.args)?;
        if !outcome.is_success() {
            return Err(Error::ExternalTool {
                image: ctx.image.to_path_buf(),
                code: outcome.exit_code,
                stderr: outcome.stderr,
            });
        }
        Ok(())
    }
}

fn pages(structure: &DocumentStructure) -> Result<&[NodeId]> {
    let pages = structure.pages();
    if pages.is_empty() {
        return Err(Error::NoPages);
    }
    Ok(pages)
}

fn context<'a>(
    structure: &'a DocumentStructure,
    top: TopStructs,
    image: &'a std::path::Path,
    page: Option<NodeId>,
) -> Context<'a> {
    let ctx = Context::new(structure, top, image);
    match page {
        Some(page) => ctx.with_page(page),
        None => ctx,
    }
}
