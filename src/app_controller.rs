use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::annotations::{self, AnnotationRecord};
use crate::app_config::Config;
use crate::document::{self, DocumentAssembler, PageGeometry, TextStyle};
use crate::errors::SkipReason;
use crate::file_utils::FileManager;
use crate::render::{ImagingMode, RecordRenderer, RenderSettings};

// @module: Application controller for annotation report export

/// A record that did not make it into the report
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// 1-based position in the annotation list
    pub position: usize,
    pub label: String,
    pub reason: SkipReason,
}

/// Outcome of an export run
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Records taken from the list after applying `max_images`
    pub selected: usize,
    /// Positions of the records that were rendered, in output order
    pub rendered: Vec<usize>,
    pub skipped: Vec<SkippedRecord>,
    /// Number of individual boxes that were not drawn
    pub skipped_boxes: usize,
    pub pages: usize,
    pub output_file: PathBuf,
    pub bytes_written: usize,
    pub elapsed: Duration,
}

/// Outcome of checking the annotation list against the image folder
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub total: usize,
    /// Position and resolved image path of every record whose image exists
    pub resolved: Vec<(usize, PathBuf)>,
    pub missing: Vec<SkippedRecord>,
    /// Images in the folder that no record refers to
    pub unreferenced: Vec<PathBuf>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Imaging capability, resolved once
    mode: ImagingMode,

    // @field: Output page layout
    geometry: PageGeometry,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let mode = ImagingMode::from_config(&config.image);

        Ok(Self {
            config,
            mode,
            geometry: PageGeometry::a4(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn imaging_mode(&self) -> ImagingMode {
        self.mode
    }

    /// Warning shown before an export when images are embedded unprocessed
    pub fn passthrough_notice(&self) -> Option<&'static str> {
        match self.mode {
            ImagingMode::Passthrough => Some(
                "Image processing disabled. Bounding box plotting and image optimization will be skipped; images are embedded as-is.",
            ),
            ImagingMode::Full => None,
        }
    }

    fn renderer(&self) -> Result<RecordRenderer> {
        let text_columns = self.geometry.text_columns(&TextStyle::annotation_body());
        let settings = RenderSettings::from_config(&self.config.image, text_columns)?;
        Ok(RecordRenderer::new(&self.config.image_dir, settings, self.mode))
    }

    fn load_records(&self) -> Result<Vec<AnnotationRecord>> {
        let path = &self.config.annotation_file;
        annotations::load_annotations(path)
            .with_context(|| format!("Failed to load annotations from {}", path.display()))
    }

    /// Run the export without drawing a progress bar
    pub fn run_export(&self) -> Result<ExportReport> {
        self.run_export_with_progress(ProgressBar::hidden())
    }

    /// Run the export with a progress bar on stderr
    pub fn run_export_interactive(&self) -> Result<ExportReport> {
        let progress_bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        self.run_export_with_progress(progress_bar)
    }

    fn run_export_with_progress(&self, progress_bar: ProgressBar) -> Result<ExportReport> {
        let start_time = Instant::now();

        if let Some(notice) = self.passthrough_notice() {
            warn!("{}", notice);
        }

        let records = self.load_records()?;
        let selected: Vec<AnnotationRecord> = records.into_iter().take(self.config.max_images).collect();
        let selected_count = selected.len();

        info!("Preparing {} annotation entries for the report", selected_count);

        let renderer = self.renderer()?;
        let mut assembler = DocumentAssembler::new(self.geometry);
        let mut rendered = Vec::new();
        let mut skipped = Vec::new();
        let mut skipped_boxes = 0;

        progress_bar.set_length(selected_count as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} annotations ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        for record in &selected {
            progress_bar.set_message(record.label());

            match renderer.render(record) {
                Ok(rendered_record) => {
                    for skipped_box in &rendered_record.skipped_boxes {
                        progress_bar.suspend(|| {
                            warn!(
                                "Could not draw bbox {} on {} (annotation {}): {}",
                                skipped_box.index,
                                rendered_record.image_path.display(),
                                record.position(),
                                skipped_box.reason
                            )
                        });
                    }
                    skipped_boxes += rendered_record.skipped_boxes.len();
                    rendered.push(rendered_record.position);
                    assembler.add_record(rendered_record);
                }
                Err(reason) => {
                    progress_bar.suspend(|| {
                        warn!(
                            "Skipping annotation {} ({}): {}",
                            record.position(),
                            record.label(),
                            reason
                        )
                    });
                    skipped.push(SkippedRecord {
                        position: record.position(),
                        label: record.label(),
                        reason,
                    });
                }
            }

            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();

        if assembler.record_count() == 0 {
            warn!("No annotation could be rendered; the report will contain a single blank page");
        }

        info!("Starting final PDF generation, this may take some time depending on content size…");
        let laid_out = assembler.finish();
        let pages = laid_out.pages.len();

        let output_file = self.config.output_file.clone();
        let title = format!("Annotations from {}", self.config.annotation_file.display());
        let bytes_written = document::write_pdf(&laid_out, &title, &output_file)
            .with_context(|| format!("Error building PDF at {}", output_file.display()))?;

        if !skipped.is_empty() && self.config.write_issues_log {
            self.write_issues_log(&skipped, &output_file);
        }

        let elapsed = start_time.elapsed();
        info!(
            "PDF successfully created at {} ({} annotations, {} skipped, {} pages) in {}",
            output_file.display(),
            rendered.len(),
            skipped.len(),
            pages,
            Self::format_duration(elapsed)
        );

        Ok(ExportReport {
            selected: selected_count,
            rendered,
            skipped,
            skipped_boxes,
            pages,
            output_file,
            bytes_written,
            elapsed,
        })
    }

    /// Append the skipped records to `<output stem>.issues.log`
    fn write_issues_log(&self, skipped: &[SkippedRecord], output_file: &Path) {
        let log_path = FileManager::sibling_path(output_file, "issues.log");

        for entry in skipped {
            let line = format!("annotation {} ({}): {}", entry.position, entry.label, entry.reason);
            if let Err(e) = FileManager::append_to_log_file(&log_path, &line) {
                warn!("Failed to write issues log: {}", e);
                return;
            }
        }

        info!("Skipped annotations written to {}", log_path.display());
    }

    /// Check which records resolve to an image and which images are never referenced
    pub fn check(&self) -> Result<CheckReport> {
        let records = self.load_records()?;
        let renderer = self.renderer()?;
        let mut report = CheckReport {
            total: records.len(),
            ..CheckReport::default()
        };

        for record in &records {
            match renderer.locate_image(record) {
                Ok(path) => {
                    debug!(
                        "Annotation {} ({}): {} [{}]",
                        record.position(),
                        record.label(),
                        path.display(),
                        record.describe()
                    );
                    report.resolved.push((record.position(), path));
                }
                Err(reason) => {
                    warn!("Annotation {} ({}): {}", record.position(), record.label(), reason);
                    report.missing.push(SkippedRecord {
                        position: record.position(),
                        label: record.label(),
                        reason,
                    });
                }
            }
        }

        if FileManager::dir_exists(&self.config.image_dir) {
            let referenced: HashSet<&PathBuf> = report.resolved.iter().map(|(_, path)| path).collect();
            let unreferenced: Vec<PathBuf> = FileManager::find_image_files(&self.config.image_dir)?
                .into_iter()
                .filter(|path| !referenced.contains(path))
                .collect();
            report.unreferenced = unreferenced;
        } else {
            warn!("Image folder does not exist: {}", self.config.image_dir.display());
        }

        for path in &report.unreferenced {
            info!("Not referenced by any annotation: {}", path.display());
        }

        info!(
            "{} annotations: {} with images, {} missing, {} unreferenced images",
            report.total,
            report.resolved.len(),
            report.missing.len(),
            report.unreferenced.len()
        );

        Ok(report)
    }

    /// Create an empty annotation list if none exists yet.
    ///
    /// Returns `true` when a file was created.
    pub fn init_annotation_file(&self) -> Result<bool> {
        let path = &self.config.annotation_file;
        let records = annotations::load_or_empty(path)
            .with_context(|| format!("Existing annotation file is not usable: {}", path.display()))?;

        if FileManager::file_exists(path) {
            info!("Annotation file already exists with {} entries: {}", records.len(), path.display());
            return Ok(false);
        }

        annotations::save_annotations(path, &records)
            .with_context(|| format!("Failed to create annotation file: {}", path.display()))?;
        info!("Created empty annotation file: {}", path.display());
        Ok(true)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
