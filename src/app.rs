//! Application orchestration for a single generate/edit run.

use crate::ai::{GeminiImageClient, ImageGenerationService, ImageRequest};
use crate::history::{HistoryEntry, HistoryStore};
use crate::image::{write_images, SavedImage};
use crate::models::{Config, Mode};
use crate::workflows::WorkflowTemplate;
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One unit of work: a request plus where its output goes.
#[derive(Debug, Clone)]
pub struct Job {
    pub mode: Mode,
    pub request: ImageRequest,
    pub output: PathBuf,
    pub workflow: Option<&'static WorkflowTemplate>,
    /// Source files behind `request.images`, recorded in history.
    pub input_paths: Vec<PathBuf>,
}

impl Job {
    pub fn new(mode: Mode, request: ImageRequest) -> Self {
        Self {
            mode,
            request,
            output: PathBuf::from(mode.default_output()),
            workflow: None,
            input_paths: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }

    pub fn with_workflow(mut self, workflow: &'static WorkflowTemplate) -> Self {
        self.workflow = Some(workflow);
        self
    }

    pub fn with_input_paths(mut self, input_paths: Vec<PathBuf>) -> Self {
        self.input_paths = input_paths;
        self
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub saved: Vec<SavedImage>,
    pub texts: Vec<String>,
    pub elapsed: Duration,
}

/// Coordinates the request/response exchange, image output, and history.
pub struct App {
    generator: Box<dyn ImageGenerationService>,
    history: Option<HistoryStore>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(
        generator: Box<dyn ImageGenerationService>,
        history: Option<HistoryStore>,
    ) -> Self {
        Self { generator, history }
    }

    /// Construct an app talking to the configured Gemini endpoint.
    pub fn new(config: &Config, record_history: bool) -> Self {
        let client = GeminiImageClient::new(config);
        info!(
            "Image provider: Gemini (model: {}, base URL: {})",
            client.model(),
            config.base_url
        );
        let history = record_history.then(|| HistoryStore::new(config.history_file.clone()));
        Self::with_services(Box::new(client), history)
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    pub async fn run(&self, job: &Job) -> Result<RunOutcome> {
        info!(
            "[{}] Requesting image ({} input images)",
            job.mode,
            job.request.images.len()
        );
        if let (Some(ratio), Some(size)) = (job.request.aspect_ratio, job.request.image_size) {
            let (w, h) = ratio.pixels(size);
            info!("[{}] Target {} at {} (~{}x{})", job.mode, ratio, size, w, h);
        }

        let started = Instant::now();
        let content = self.generator.generate(&job.request).await?;
        let elapsed = started.elapsed();

        let texts = content.texts();
        for text in &texts {
            info!("[{}] Model text: {}", job.mode, text);
        }

        let images = content.images()?;
        if images.is_empty() {
            warn!("[{}] Response contained no image parts", job.mode);
            return Err(Error::NoImage { texts });
        }

        let saved = write_images(&images, &job.output)?;
        for image in &saved {
            match image.dimensions {
                Some((w, h)) => info!(
                    "[{}] Saved {}x{} {} to {}",
                    job.mode,
                    w,
                    h,
                    image.mime_type,
                    image.path.display()
                ),
                None => info!(
                    "[{}] Saved {} bytes to {}",
                    job.mode,
                    image.size_bytes,
                    image.path.display()
                ),
            }
        }
        info!(
            "[{}] Generation took {:.1}s",
            job.mode,
            elapsed.as_secs_f64()
        );

        if let Some(store) = &self.history {
            let entry = Self::history_entry(job, &saved, elapsed);
            if let Err(e) = store.record(entry) {
                warn!(
                    "Could not update history at {}: {}",
                    store.path().display(),
                    e
                );
            }
        }

        Ok(RunOutcome {
            saved,
            texts,
            elapsed,
        })
    }

    fn history_entry(job: &Job, saved: &[SavedImage], elapsed: Duration) -> HistoryEntry {
        let first = &saved[0];
        let mut entry = HistoryEntry::new(
            job.mode,
            job.request.prompt.clone(),
            first.mime_type.clone(),
        );
        entry.aspect_ratio = job.request.aspect_ratio.map(|r| r.to_string());
        entry.image_size = job.request.image_size.map(|s| s.to_string());
        entry.workflow_id = job.workflow.map(|w| w.id.to_string());
        entry.workflow_name = job.workflow.map(|w| w.name.to_string());
        entry.outputs = saved.iter().map(|s| s.path.clone()).collect();
        entry.width = first.dimensions.map(|(w, _)| w);
        entry.height = first.dimensions.map(|(_, h)| h);
        entry.input_images = job.input_paths.clone();
        entry.generation_secs = elapsed.as_secs_f64();
        entry
    }
}
