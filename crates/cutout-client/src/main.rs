//! Command-line front end: detect, extract, edit and export in one run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cutout_client::{write_export, ClientConfig, ServiceClient, WorkflowController};
use cutout_core::{ExportKind, ParameterUpdate, TransformParameters};

#[derive(Parser)]
#[command(name = "cutout")]
#[command(about = "Detect objects in an image, cut one out and edit it")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Object to extract, by list index or label. Without it, detections are
    /// only listed.
    #[arg(long, value_name = "INDEX|LABEL")]
    object: Option<String>,

    /// Brightness multiplier (0.5 to 2.0)
    #[arg(long)]
    brightness: Option<f32>,

    /// Contrast multiplier (0.5 to 2.0)
    #[arg(long)]
    contrast: Option<f32>,

    /// Saturation multiplier (0.5 to 2.0)
    #[arg(long)]
    saturation: Option<f32>,

    /// Blur radius in pixels (0 to 10)
    #[arg(long)]
    blur: Option<f32>,

    /// Rotation in degrees, clockwise (-180 to 180)
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f32>,

    /// Mirror left to right (`--flip-horizontal=false` undoes a params file)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    flip_horizontal: Option<bool>,

    /// Mirror top to bottom (`--flip-vertical=false` undoes a params file)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    flip_vertical: Option<bool>,

    /// JSON file with a full parameter set; flags override its values
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Also save the unedited extraction
    #[arg(long)]
    raw: bool,

    /// Output directory (defaults to CUTOUT_OUTPUT_DIR or the current directory)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

impl Cli {
    /// Parameter updates from the params file and flags, in that order.
    fn parameter_updates(&self) -> anyhow::Result<Vec<ParameterUpdate>> {
        let mut updates = Vec::new();

        if let Some(path) = &self.params {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let params: TransformParameters = serde_json::from_str(&text)
                .with_context(|| format!("Invalid parameter file {}", path.display()))?;
            updates.extend(params.as_updates());
        }

        let flags = [
            self.brightness.map(ParameterUpdate::Brightness),
            self.contrast.map(ParameterUpdate::Contrast),
            self.saturation.map(ParameterUpdate::Saturation),
            self.blur.map(ParameterUpdate::Blur),
            self.rotation.map(ParameterUpdate::Rotation),
            self.flip_horizontal.map(ParameterUpdate::FlipHorizontal),
            self.flip_vertical.map(ParameterUpdate::FlipVertical),
        ];
        updates.extend(flags.into_iter().flatten());

        for update in &updates {
            update.validate()?;
        }
        Ok(updates)
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("cutout=info".parse()?)
        .add_directive("cutout_client=info".parse()?)
        .add_directive("cutout_core=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Resolve `--object` as an index first, then as a label.
fn resolve_object(controller: &WorkflowController, selector: &str) -> anyhow::Result<usize> {
    let count = controller.detections().len();
    if let Ok(index) = selector.parse::<usize>() {
        if index >= count {
            bail!("Object index {index} out of range ({count} detected)");
        }
        return Ok(index);
    }
    controller
        .find_object(selector)
        .with_context(|| format!("No detected object labelled \"{selector}\""))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(out) = &cli.out {
        config.output_dir = out.clone();
    }
    info!(?config, "Starting cutout");

    // Reject bad parameters before any network call
    let updates = cli.parameter_updates()?;

    let bytes = tokio::fs::read(&cli.image_path)
        .await
        .with_context(|| format!("Failed to read {}", cli.image_path.display()))?;
    let services = ServiceClient::from_config(&config)?;

    let mut controller = WorkflowController::new();
    controller.select_file(file_name(&cli.image_path), bytes);

    let detections = controller.detect(&services).await?;
    if detections.is_empty() {
        println!("No objects detected");
        return Ok(());
    }
    for (index, object) in detections.iter().enumerate() {
        println!("{index}: {} ({})", object.label, object.confidence_percent());
    }

    let Some(selector) = cli.object.as_deref() else {
        return Ok(());
    };
    let index = resolve_object(&controller, selector)?;
    controller.extract(index, &services).await?;

    if !updates.is_empty() {
        controller.update_parameters(updates)?;
    }
    if let Some(err) = controller.session().and_then(|s| s.last_render_error()) {
        warn!(error = %err, "Edits could not be rendered; exporting the last good image");
    }

    let mut kinds = vec![ExportKind::Edited];
    if cli.raw {
        kinds.push(ExportKind::RawExtraction);
    }
    for kind in kinds {
        let exported = controller.export(kind)?;
        let path = write_export(&config.output_dir, &exported).await?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["cutout", "cat.png"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn params_file(json: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), json).unwrap();
        file
    }

    #[test]
    fn test_flip_flag_without_value_means_true() {
        let args = cli(&["--flip-horizontal"]);
        assert_eq!(args.flip_horizontal, Some(true));
        assert_eq!(args.flip_vertical, None);
        assert_eq!(
            args.parameter_updates().unwrap(),
            vec![ParameterUpdate::FlipHorizontal(true)]
        );
    }

    #[test]
    fn test_flip_flag_overrides_params_file() {
        let file = params_file(r#"{"flipHorizontal": true, "flipVertical": true}"#);
        let path = file.path().to_str().unwrap();
        let args = cli(&[
            "--params",
            path,
            "--flip-horizontal=false",
            "--flip-vertical=false",
        ]);

        let mut params = TransformParameters::default();
        for update in args.parameter_updates().unwrap() {
            params.apply(update).unwrap();
        }
        assert!(!params.flip_horizontal);
        assert!(!params.flip_vertical);
    }

    #[test]
    fn test_numeric_flags_override_params_file() {
        let file = params_file(r#"{"brightness": 1.8, "rotation": 45}"#);
        let path = file.path().to_str().unwrap();
        let args = cli(&["--params", path, "--rotation", "-90"]);

        let mut params = TransformParameters::default();
        for update in args.parameter_updates().unwrap() {
            params.apply(update).unwrap();
        }
        assert_eq!(params.brightness, 1.8);
        assert_eq!(params.rotation, -90.0);
    }

    #[test]
    fn test_out_of_range_flag_is_rejected() {
        let args = cli(&["--blur", "12"]);
        assert!(args.parameter_updates().is_err());
    }
}
