//! The conversion command: markdown in, paste-ready HTML out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use mdpaste_diagrams::{DiagramRenderer, ResolveReport};
use mdpaste_hosting::{BoundedHost, HttpImageHost};
use mdpaste_transform::{DocumentTransform, ThemeId};

use crate::config::{CliSettings, Config};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the conversion run.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Input markdown file.
    input: PathBuf,

    /// Output HTML file (default: the input path with an .html extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Color theme (antigravity or light).
    #[arg(long, default_value = "antigravity")]
    theme: String,

    /// Per-upload deadline in milliseconds (overrides config).
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Render diagrams in parallel.
    #[arg(long)]
    parallel: bool,

    /// Embed images as data: URIs for a self-contained document.
    #[arg(long)]
    embed: bool,

    /// Disable payload compression in render URLs.
    #[arg(long)]
    no_compress: bool,

    /// Path to configuration file (default: auto-discover mdpaste.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (show upload and fallback logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the conversion.
    ///
    /// Diagram upload failures are reported on stderr but do not fail the
    /// process; their blocks carry fallback or error markup inline.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failures, invalid arguments or invalid
    /// configuration.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let theme = ThemeId::parse(&self.theme).ok_or_else(|| {
            CliError::Validation(format!(
                "unknown theme '{}' (expected antigravity or light)",
                self.theme
            ))
        })?;

        let cli_settings = CliSettings {
            timeout_ms: self.timeout_ms,
            compress: self.no_compress.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }

        let markdown = std::fs::read_to_string(&self.input)?;
        let out_path = self
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input));

        let transform = DocumentTransform::new(theme);
        let result = transform.transform(&markdown);
        output.info(&format!(
            "Converting {} ({} diagram blocks)",
            self.input.display(),
            result.diagrams().len()
        ));

        let deadline = Duration::from_millis(config.render.timeout_ms);
        let host = HttpImageHost::new(
            &config.hosting.api_url,
            &config.hosting.url_prefix,
            deadline,
        );
        let renderer = DiagramRenderer::new(BoundedHost::new(Arc::new(host), deadline), theme)
            .with_service_url(&config.render.service_url)
            .with_image_type(&config.render.image_type)
            .with_max_url_len(config.render.max_url_len)
            .with_compression(config.render.compress)
            .with_embedded_images(self.embed);

        let rendered = if self.parallel {
            renderer.render_all_parallel(result.diagrams())
        } else {
            renderer.render_all(result.diagrams())
        };

        let report = ResolveReport::tally(&rendered);
        let markup: HashMap<String, String> = rendered
            .into_iter()
            .map(|diagram| (diagram.id, diagram.html))
            .collect();
        let html = result.substitute(&markup);

        std::fs::write(&out_path, html)?;

        summarize(output, &report, &out_path);
        Ok(())
    }
}

/// Default output path: the input path with an `.html` extension.
fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("html")
}

/// Report the conversion result on stderr.
fn summarize(output: &Output, report: &ResolveReport, out_path: &Path) {
    if report.total() > 0 {
        output.info(&format!(
            "Diagrams: {} hosted, {} fallback, {} failed",
            report.hosted, report.fallback, report.failed
        ));
    }
    if report.fallback > 0 {
        output.warning(&format!(
            "{} diagram(s) use direct render URLs; they may load slowly",
            report.fallback
        ));
    }
    if report.has_failures() {
        output.warning(&format!(
            "{} diagram(s) failed; error boxes were embedded in the output",
            report.failed
        ));
    }
    output.success(&format!("Wrote {}", out_path.display()));
}
