//! Classify Command
//!
//! Reads ticket keys from a table, enriches them from the tracker when
//! credentials are available, classifies each one and writes the result
//! table.
//!
//! Usage:
//!   porotos classify <INPUT> [-o OUTPUT] [--provider P] [--model M]
//!                    [--speed fast|accurate] [--prefix SMPR] [--no-tracker]

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::ai::{ModelSpeed, ProviderKind, create_gateway};
use crate::classify::Classifier;
use crate::cli::progress::{ConsoleRenderer, format_duration};
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::ingest::{KeyExtractor, read_ticket_refs};
use crate::output::{default_output_path, save_results, summarize};
use crate::pipeline::{Pipeline, ProgressTracker};
use crate::tracker::TrackerClient;
use crate::types::{PorotoError, Result};

/// Classify run options (CLI overrides on top of the loaded config)
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Input table
    pub input: PathBuf,
    /// Output table (defaults to the current quarter's name)
    pub output: Option<PathBuf>,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub speed: Option<ModelSpeed>,
    /// Ticket key prefix override
    pub prefix: Option<String>,
    /// Skip tracker enrichment even when credentials exist
    pub no_tracker: bool,
    pub quiet: bool,
}

impl ClassifyOptions {
    /// CLI flags win over every config layer
    pub fn apply(&self, config: &mut Config) {
        if let Some(provider) = self.provider {
            config.llm.provider = Some(provider);
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
        if let Some(speed) = self.speed {
            config.llm.speed = Some(speed);
        }
        if let Some(prefix) = &self.prefix {
            config.input.prefix = prefix.clone();
        }
        if self.no_tracker {
            config.tracker.enabled = false;
        }
    }
}

pub fn run(options: ClassifyOptions) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    options.apply(&mut config);
    config.validate()?;

    let rt = Runtime::new()?;
    rt.block_on(run_async(options, config))
}

async fn run_async(options: ClassifyOptions, config: Config) -> Result<()> {
    let out = Output::new().quiet(options.quiet);
    let lookup = |name: &str| std::env::var(name).ok();

    if !options.input.exists() {
        return Err(PorotoError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", options.input.display()),
        )));
    }

    // Credentials are checked before any ticket is touched
    let provider_config = config.provider_config(lookup)?;
    let gateway = create_gateway(provider_config)?;
    let provider_name = gateway.display_name();
    info!(provider = %provider_name, "LLM gateway ready");
    out.success(&format!("LLM: {}", provider_name));

    let extractor = KeyExtractor::new(&config.input.prefix)?;
    let refs = read_ticket_refs(&options.input, &extractor)?;
    out.info(&format!("Encontrados: {} porotos", refs.len()));

    let delimiter = config.output.delimiter_byte()?;
    let output_path = options.output.clone().unwrap_or_else(default_output_path);

    if refs.is_empty() {
        warn!(input = %options.input.display(), "No ticket keys found");
        out.warning(&format!(
            "No se encontraron claves {}-<n> en {}",
            extractor.prefix(),
            options.input.display()
        ));
        save_results(&output_path, &[], delimiter)?;
        return Ok(());
    }

    let classifier = Classifier::new(gateway, config.retry.classifier_policy());
    let progress = ProgressTracker::new();
    let mut pipeline = Pipeline::new(classifier).with_progress(progress.clone());

    pipeline = attach_tracker(pipeline, &config, lookup, &out);

    if pipeline.has_tracker() && config.tracker.preflight {
        let first = &refs[0].key;
        if !pipeline.preflight_tracker(first).await {
            out.warning(&format!(
                "Jira no respondio para {}, se usan los titulos del archivo",
                first
            ));
        }
    }

    if !pipeline.has_tracker() && refs.iter().all(|r| r.title.trim().is_empty()) {
        out.warning("Sin Jira y sin titulos en el archivo: todos los tickets quedaran en ERROR");
    }

    let renderer = ConsoleRenderer::new(&progress)
        .with_bar(!options.quiet)
        .spawn();

    let report = pipeline.run(&refs).await;
    drop(pipeline);
    drop(progress);
    if let Err(e) = renderer.await {
        warn!(error = %e, "Progress renderer stopped unexpectedly");
    }

    save_results(&output_path, &report.results, delimiter)?;
    out.success(&format!("Resultado guardado en: {}", output_path.display()));
    out.field("Tiempo", &format_duration(report.elapsed));
    if report.tracker_errors > 0 {
        out.warning(&format!(
            "{} tickets sin datos de Jira",
            report.tracker_errors
        ));
    }

    out.summary(&summarize(&report.results));

    let errors = report.error_count();
    if errors > 0 {
        out.warning(&format!("{} tickets con ERROR", errors));
    }

    Ok(())
}

/// Enable enrichment when tracker settings are complete and usable. A
/// tracker that cannot be set up only degrades the run.
fn attach_tracker<F>(pipeline: Pipeline, config: &Config, lookup: F, out: &Output) -> Pipeline
where
    F: Fn(&str) -> Option<String>,
{
    let Some(settings) = config.tracker_settings(lookup) else {
        out.warning("Sin Jira, clasificando solo por titulo");
        return pipeline;
    };

    let base_url = settings.base_url.clone();
    match TrackerClient::new(settings, config.retry.tracker_policy()) {
        Ok(client) => {
            out.success(&format!("Jira: {}", base_url));
            pipeline.with_tracker(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "Tracker client unavailable, using input titles");
            out.warning(&format!(
                "Jira no disponible ({}), clasificando solo por titulo",
                e
            ));
            pipeline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ProviderConfig;
    use crate::classify::RetryPolicy;

    fn pipeline() -> Pipeline {
        let gateway = create_gateway(ProviderConfig::new(ProviderKind::Groq, "gsk-test")).unwrap();
        Pipeline::new(Classifier::new(gateway, RetryPolicy::default()))
    }

    fn tracker_env(base_url: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| match name {
            "JIRA_BASE_URL" => Some(base_url.to_string()),
            "JIRA_EMAIL" => Some("me@company.com".to_string()),
            "JIRA_API_TOKEN" => Some("token".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_malformed_tracker_url_degrades_to_no_tracker() {
        let out = Output::new().quiet(true);
        let pipeline = attach_tracker(
            pipeline(),
            &Config::default(),
            tracker_env("not a url"),
            &out,
        );
        assert!(!pipeline.has_tracker());
    }

    #[test]
    fn test_valid_tracker_settings_attach_client() {
        let out = Output::new().quiet(true);
        let pipeline = attach_tracker(
            pipeline(),
            &Config::default(),
            tracker_env("https://company.atlassian.net"),
            &out,
        );
        assert!(pipeline.has_tracker());
    }

    #[test]
    fn test_missing_tracker_settings_leave_no_tracker() {
        let out = Output::new().quiet(true);
        let pipeline = attach_tracker(pipeline(), &Config::default(), |_: &str| None, &out);
        assert!(!pipeline.has_tracker());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.llm.provider = Some(ProviderKind::Gemini);

        let options = ClassifyOptions {
            input: PathBuf::from("in.csv"),
            provider: Some(ProviderKind::Groq),
            speed: Some(ModelSpeed::Accurate),
            prefix: Some("OPS".to_string()),
            no_tracker: true,
            ..Default::default()
        };
        options.apply(&mut config);

        assert_eq!(config.llm.provider, Some(ProviderKind::Groq));
        assert_eq!(config.llm.speed, Some(ModelSpeed::Accurate));
        assert_eq!(config.input.prefix, "OPS");
        assert!(!config.tracker.enabled);
        assert!(config.llm.model.is_none());
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config::default();
        config.llm.model = Some("custom".to_string());

        ClassifyOptions::default().apply(&mut config);

        assert_eq!(config.llm.model.as_deref(), Some("custom"));
        assert!(config.tracker.enabled);
        assert_eq!(config.input.prefix, "SMPR");
    }
}
