use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use imagegen::ai::{AspectRatio, ImageRequest, ImageSize, SourceImage};
use imagegen::app::{App, Job};
use imagegen::history::HistoryStore;
use imagegen::models::{AuthHeaderMode, Config, Mode};
use imagegen::{prompts, workflows};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "imagegen")]
#[command(about = "Generate and edit images with a Gemini-compatible API")]
struct CliArgs {
    #[command(flatten)]
    endpoint: EndpointArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct EndpointArgs {
    /// Base URL of the API or relay (overrides GEMINI_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model ID (overrides GEMINI_IMAGE_MODEL).
    #[arg(long, global = true)]
    model: Option<String>,

    /// Full request path replacing /v1beta/models/{model}:generateContent.
    #[arg(long, global = true)]
    api_path: Option<String>,

    /// Header carrying the API key: x-goog-api-key or authorization.
    #[arg(long, global = true, value_parser = parse_auth_header_arg)]
    auth_header: Option<AuthHeaderMode>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// History file (overrides IMAGEGEN_HISTORY_FILE).
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,

    /// Don't record this run in the history file.
    #[arg(long, global = true)]
    no_history: bool,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output aspect ratio, e.g. 16:9.
    #[arg(long, value_parser = parse_aspect_ratio_arg)]
    aspect_ratio: Option<AspectRatio>,

    /// Output resolution tier: 1K, 2K or 4K.
    #[arg(long, value_parser = parse_image_size_arg)]
    image_size: Option<ImageSize>,

    /// Where to write the image.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate an image from a text prompt.
    Generate {
        prompt: String,
        /// Optional reference images.
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Edit one or more images according to a prompt.
    Edit {
        prompt: String,
        #[arg(short, long = "image", required = true)]
        images: Vec<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply a preset workflow to input images.
    Workflow {
        id: String,
        #[arg(short, long = "image", required = true)]
        images: Vec<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the available workflows.
    Workflows,
    /// Regenerate only the white area of a mask.
    Inpaint {
        prompt: String,
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        mask: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Inspect or edit the generation history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    /// Show recent entries, newest first.
    List {
        /// Maximum entries to show; 0 shows all.
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Find entries whose prompt or workflow name contains a keyword.
    Search { keyword: String },
    /// Delete one entry.
    Remove {
        #[arg(value_parser = parse_uuid_arg)]
        id: Uuid,
    },
    /// Delete every entry.
    Clear,
}

fn parse_aspect_ratio_arg(input: &str) -> std::result::Result<AspectRatio, String> {
    input.parse().map_err(|e: imagegen::Error| e.to_string())
}

fn parse_image_size_arg(input: &str) -> std::result::Result<ImageSize, String> {
    input.parse().map_err(|e: imagegen::Error| e.to_string())
}

fn parse_auth_header_arg(input: &str) -> std::result::Result<AuthHeaderMode, String> {
    input.parse().map_err(|e: imagegen::Error| e.to_string())
}

fn parse_uuid_arg(input: &str) -> std::result::Result<Uuid, String> {
    Uuid::parse_str(input).map_err(|_| format!("Invalid history id '{}'", input))
}

impl EndpointArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(api_path) = &self.api_path {
            config.api_path = Some(api_path.clone());
        }
        if let Some(auth_header) = self.auth_header {
            config.auth_header = auth_header;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(history_file) = &self.history_file {
            config.history_file = history_file.clone();
        }
    }
}

fn load_images(paths: &[PathBuf]) -> imagegen::Result<Vec<SourceImage>> {
    paths.iter().map(|p| SourceImage::from_path(p)).collect()
}

fn build_job(
    mode: Mode,
    prompt: String,
    paths: Vec<PathBuf>,
    output: OutputArgs,
) -> imagegen::Result<Job> {
    let mut request = ImageRequest::new(prompt);
    request.images = load_images(&paths)?;
    request.aspect_ratio = output.aspect_ratio;
    request.image_size = output.image_size;

    let mut job = Job::new(mode, request).with_input_paths(paths);
    if let Some(path) = output.output {
        job = job.with_output(path);
    }
    Ok(job)
}

async fn run_job(config: &Config, record_history: bool, job: Job) -> imagegen::Result<()> {
    let app = App::new(config, record_history);
    let outcome = app.run(&job).await?;

    for text in &outcome.texts {
        println!("{}", text);
    }
    for image in &outcome.saved {
        println!("Saved {}", image.path.display());
    }
    Ok(())
}

fn run_history(store: &HistoryStore, action: HistoryAction) -> imagegen::Result<()> {
    match action {
        HistoryAction::List { limit, offset } => {
            let history = store.load()?;
            for entry in history.list(Some(limit), offset) {
                print_entry(entry);
            }
        }
        HistoryAction::Search { keyword } => {
            let history = store.load()?;
            for entry in history.search(&keyword) {
                print_entry(entry);
            }
        }
        HistoryAction::Remove { id } => {
            if store.remove(id)? {
                println!("Removed {}", id);
            } else {
                println!("No history entry {}", id);
            }
        }
        HistoryAction::Clear => {
            store.clear()?;
            println!("History cleared");
        }
    }
    Ok(())
}

fn print_entry(entry: &imagegen::history::HistoryEntry) {
    let outputs: Vec<String> = entry
        .outputs
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!(
        "{}  {}  {:<8}  {:>5.1}s  {}  {}",
        entry.id,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.mode,
        entry.generation_secs,
        outputs.join(","),
        entry.workflow_name.as_deref().unwrap_or(&entry.prompt)
    );
}

fn history_path(endpoint: &EndpointArgs) -> PathBuf {
    dotenvy::dotenv().ok();
    endpoint
        .history_file
        .clone()
        .unwrap_or_else(|| Config::history_file_from_lookup(|key| std::env::var(key).ok()))
}

fn print_workflows() {
    for workflow in workflows::WORKFLOWS {
        println!(
            "{:<20} {:<20} {}",
            workflow.id, workflow.name, workflow.description
        );
    }
}

async fn dispatch(args: CliArgs) -> imagegen::Result<()> {
    let CliArgs { endpoint, command } = args;

    let job = match command {
        Command::Workflows => {
            print_workflows();
            return Ok(());
        }
        Command::History { action } => {
            return run_history(&HistoryStore::new(history_path(&endpoint)), action);
        }
        Command::Generate {
            prompt,
            images,
            output,
        } => build_job(Mode::Generate, prompt, images, output)?,
        Command::Edit {
            prompt,
            images,
            output,
        } => build_job(Mode::Edit, prompt, images, output)?,
        Command::Workflow { id, images, output } => {
            let workflow = workflows::resolve(&id, images.len())?;
            info!("Running workflow {} ({})", workflow.id, workflow.name);
            build_job(Mode::Workflow, workflow.prompt.to_string(), images, output)?
                .with_workflow(workflow)
        }
        Command::Inpaint {
            prompt,
            image,
            mask,
            output,
        } => build_job(
            Mode::Inpaint,
            prompts::inpainting(&prompt)?,
            vec![image, mask],
            output,
        )?,
    };

    let mut config = Config::from_env()?;
    endpoint.apply(&mut config);
    run_job(&config, !endpoint.no_history, job).await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagegen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    match dispatch(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_with_options() {
        let args = CliArgs::try_parse_from([
            "imagegen",
            "generate",
            "a nano banana dish",
            "--aspect-ratio",
            "16:9",
            "--image-size",
            "2K",
            "--base-url",
            "https://relay.example.com",
        ])
        .unwrap();

        assert_eq!(
            args.endpoint.base_url.as_deref(),
            Some("https://relay.example.com")
        );
        match args.command {
            Command::Generate {
                prompt,
                images,
                output,
            } => {
                assert_eq!(prompt, "a nano banana dish");
                assert!(images.is_empty());
                assert_eq!(output.aspect_ratio, Some(AspectRatio::Landscape16x9));
                assert_eq!(output.image_size, Some(ImageSize::TwoK));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_aspect_ratio() {
        let err = CliArgs::try_parse_from([
            "imagegen",
            "generate",
            "x",
            "--aspect-ratio",
            "16:10",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("16:10"));
    }

    #[test]
    fn test_edit_requires_image() {
        assert!(CliArgs::try_parse_from(["imagegen", "edit", "Add a cat"]).is_err());
        assert!(
            CliArgs::try_parse_from(["imagegen", "edit", "Add a cat", "-i", "111.png"]).is_ok()
        );
    }

    #[test]
    fn test_endpoint_args_override_config() {
        let args = CliArgs::try_parse_from([
            "imagegen",
            "workflows",
            "--model",
            "gemini-3-pro-image-preview",
            "--auth-header",
            "authorization",
            "--timeout",
            "45",
        ])
        .unwrap();

        let mut config = Config::new("k".to_string());
        args.endpoint.apply(&mut config);

        assert_eq!(config.model, "gemini-3-pro-image-preview");
        assert_eq!(config.auth_header, AuthHeaderMode::Authorization);
        assert_eq!(config.timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_build_job_missing_image_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputArgs {
            aspect_ratio: None,
            image_size: None,
            output: None,
        };
        let err = build_job(
            Mode::Edit,
            "Add a cat".to_string(),
            vec![dir.path().join("111.png")],
            output,
        )
        .unwrap_err();
        assert!(matches!(err, imagegen::Error::Io(_)));
    }

    #[test]
    fn test_inpaint_rejects_blank_description_before_reading_files() {
        let args = CliArgs::try_parse_from([
            "imagegen", "inpaint", "   ", "-i", "photo.png", "-m", "mask.png",
        ])
        .unwrap();

        let err = tokio_test::block_on(dispatch(args)).unwrap_err();
        assert!(matches!(err, imagegen::Error::InvalidRequest(_)));
    }

    #[test]
    fn test_parse_history_remove_validates_id() {
        assert!(CliArgs::try_parse_from(["imagegen", "history", "remove", "nope"]).is_err());
        let id = Uuid::new_v4().to_string();
        assert!(CliArgs::try_parse_from(["imagegen", "history", "remove", id.as_str()]).is_ok());
    }
}
