//! Multi-sample pipeline: project, merge, split, prioritize and sub-tier
//! every sample of a run, each into its own output directory.
//!
//! Samples are independent units of work. A failing sample is reported in
//! the run report and never stops the others.

use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use fxhash::FxHashSet;
use log::{error, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use varcon_acmg::{SplitOptions, SplitReport, VusReport, split, vus};
use varcon_core::errors::Result;
use varcon_core::models::ChromNaming;
use varcon_io::{OutputFormat, publish_serialized};
use varcon_merge::{Discriminator, MergeOptions, MergeOutputs, MergeReport, merge};
use varcon_prio::{ConfigError, PrioritizeConfig, PrioritizeReport, prioritize};
use varcon_reconcile::consts::DEFAULT_FIELDS;
use varcon_reconcile::{ProjectOptions, ProjectReport, project};

pub const PIPELINE_REPORT_FILE: &str = "pipeline_report.json";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SampleConfig {
    pub name: String,
    pub annotated_vcf: PathBuf,
    pub classifier: PathBuf,
}

///
/// A pipeline run, as loaded from TOML.
///
/// Relative input paths and `output_dir` are resolved against the directory
/// of the config file.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub chrom_naming: ChromNaming,
    /// Fields to project from the annotated VCF.
    pub fields: Option<Vec<String>>,
    /// `CLASSIFIER_COL:VCF_COL`
    pub discriminator: Option<String>,
    /// Classification column of the merged table; detected when absent.
    pub classification_column: Option<String>,
    #[serde(default)]
    pub prioritize: PrioritizeConfig,
    pub samples: Vec<SampleConfig>,
}

impl PipelineConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.samples.is_empty() {
            return Err(ConfigError::Invalid("no samples configured".to_string()));
        }
        let mut seen = FxHashSet::default();
        for sample in &self.samples {
            if matches!(sample.name.as_str(), "" | "." | "..")
                || sample.name.contains(['/', '\\'])
            {
                return Err(ConfigError::Invalid(format!(
                    "sample name '{}' cannot be used as a directory name",
                    sample.name
                )));
            }
            if !seen.insert(sample.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "sample '{}' is listed more than once",
                    sample.name
                )));
            }
        }
        self.prioritize.validate()
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.output_dir);
        if let Some(genes) = self.prioritize.genes.as_mut() {
            resolve(genes);
        }
        for sample in self.samples.iter_mut() {
            resolve(&mut sample.annotated_vcf);
            resolve(&mut sample.classifier);
        }
    }

    pub fn sample_paths(&self, sample: &str) -> SamplePaths {
        SamplePaths::new(&self.output_dir, sample, self.prioritize.format)
    }
}

impl TryFrom<&Path> for PipelineConfig {
    type Error = ConfigError;

    fn try_from(value: &Path) -> std::result::Result<Self, ConfigError> {
        if value.extension() != Some(OsStr::new("toml")) {
            return Err(ConfigError::InvalidFileType(value.to_path_buf()));
        }
        let toml_str = read_to_string(value)?;
        let mut config: PipelineConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        if let Some(base) = value.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }
}

///
/// Every artifact one sample produces, under `<output_dir>/<sample>/`.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplePaths {
    pub dir: PathBuf,
    pub projected: PathBuf,
    pub merged: PathBuf,
    pub unmatched_classifier: PathBuf,
    pub unmatched_vcf: PathBuf,
    pub acmg: PathBuf,
    pub prioritized: PathBuf,
    pub vus: PathBuf,
}

impl SamplePaths {
    pub fn new(output_dir: &Path, sample: &str, format: OutputFormat) -> Self {
        let dir = output_dir.join(sample);
        let file = |suffix: &str| dir.join(format!("{}.{}", sample, suffix));
        SamplePaths {
            projected: file("projected.tsv"),
            merged: file("merged.tsv"),
            unmatched_classifier: file("unmatched.classifier.tsv"),
            unmatched_vcf: file("unmatched.vcf.tsv"),
            acmg: file("acmg.tsv"),
            prioritized: file(&format!("prioritized.{}", format.extension())),
            vus: file("vus.tsv"),
            dir,
        }
    }

    pub fn merge_outputs(&self) -> MergeOutputs {
        MergeOutputs {
            merged: self.merged.clone(),
            unmatched_classifier: self.unmatched_classifier.clone(),
            unmatched_vcf: self.unmatched_vcf.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleStages {
    pub project: ProjectReport,
    pub merge: MergeReport,
    pub acmg: SplitReport,
    pub prioritize: PrioritizeReport,
    pub vus: VusReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleStatus {
    Completed { stages: Box<SampleStages> },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleOutcome {
    pub sample: String,
    pub output_dir: PathBuf,
    #[serde(flatten)]
    pub status: SampleStatus,
}

impl SampleOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, SampleStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub output_dir: PathBuf,
    pub completed: usize,
    pub failed: usize,
    pub samples: Vec<SampleOutcome>,
}

impl PipelineReport {
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(PIPELINE_REPORT_FILE)
    }
}

///
/// Run every stage for a single sample. The first failing stage stops the
/// sample; outputs of the stages before it stay in place.
///
pub fn run_sample(sample: &SampleConfig, config: &PipelineConfig) -> Result<SampleStages> {
    let paths = config.sample_paths(&sample.name);

    let fields = match &config.fields {
        Some(fields) => fields.clone(),
        None => DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
    };
    let project_options = ProjectOptions {
        fields,
        naming: config.chrom_naming,
    };
    let project = project(&sample.annotated_vcf, &paths.projected, &project_options)?;

    let merge_options = MergeOptions {
        naming: config.chrom_naming,
        discriminator: config
            .discriminator
            .as_deref()
            .map(str::parse::<Discriminator>)
            .transpose()?,
    };
    let merge = merge(
        &sample.classifier,
        &paths.projected,
        &paths.merge_outputs(),
        &merge_options,
    )?;

    let split_options = SplitOptions {
        column: config.classification_column.clone(),
    };
    let acmg = split(&paths.merged, &paths.acmg, &split_options)?;

    let prioritize = prioritize(&paths.acmg, &paths.prioritized, &config.prioritize)?;

    // graded over the full split table so the sub-tier does not depend on top_n or format
    let vus = vus(&paths.acmg, &paths.vus)?;

    Ok(SampleStages {
        project,
        merge,
        acmg,
        prioritize,
        vus,
    })
}

///
/// Run all samples in parallel and publish `pipeline_report.json` into the
/// output directory.
///
/// # Arguments
/// - config: the run
/// - on_sample_done: called once per sample as soon as it finishes
///
pub fn run_pipeline<F>(config: &PipelineConfig, on_sample_done: F) -> Result<PipelineReport>
where
    F: Fn(&SampleOutcome) + Sync + Send,
{
    info!(
        "Running {} samples into {}",
        config.samples.len(),
        config.output_dir.display()
    );

    let samples: Vec<SampleOutcome> = config
        .samples
        .par_iter()
        .map(|sample| {
            let status = match run_sample(sample, config) {
                Ok(stages) => SampleStatus::Completed {
                    stages: Box::new(stages),
                },
                Err(e) => {
                    error!("Sample {} failed: {}", sample.name, e);
                    SampleStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            let outcome = SampleOutcome {
                sample: sample.name.clone(),
                output_dir: config.sample_paths(&sample.name).dir,
                status,
            };
            on_sample_done(&outcome);
            outcome
        })
        .collect();

    let failed = samples.iter().filter(|s| s.is_failed()).count();
    let report = PipelineReport {
        output_dir: config.output_dir.clone(),
        completed: samples.len() - failed,
        failed,
        samples,
    };

    publish_serialized(report.report_path(), &report, OutputFormat::Json)?;
    info!(
        "Pipeline finished: {} completed, {} failed",
        report.completed, report.failed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const CONFIG: &str = r#"
output_dir = "results"
chrom_naming = "prefixed"

[prioritize]
top_n = 50
format = "json"

[[samples]]
name = "S1"
annotated_vcf = "S1.ann.vcf.gz"
classifier = "/data/S1.hg38_multianno.txt.intervar"
"#;

    #[rstest]
    fn test_load_config_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, CONFIG).unwrap();

        let config = PipelineConfig::try_from(path.as_path()).unwrap();
        assert_eq!(config.output_dir, dir.path().join("results"));
        assert_eq!(config.chrom_naming, ChromNaming::Prefixed);
        assert_eq!(config.prioritize.top_n, 50);
        assert_eq!(config.prioritize.format, OutputFormat::Json);
        assert_eq!(config.samples[0].annotated_vcf, dir.path().join("S1.ann.vcf.gz"));
        assert_eq!(
            config.samples[0].classifier,
            PathBuf::from("/data/S1.hg38_multianno.txt.intervar")
        );
    }

    #[rstest]
    #[case("output_dir = \"out\"\nsamples = []\n")]
    #[case("output_dir = \"out\"\n[[samples]]\nname = \"S1\"\nannotated_vcf = \"a\"\nclassifier = \"b\"\n[[samples]]\nname = \"S1\"\nannotated_vcf = \"c\"\nclassifier = \"d\"\n")]
    #[case("output_dir = \"out\"\n[[samples]]\nname = \"a/b\"\nannotated_vcf = \"a\"\nclassifier = \"b\"\n")]
    #[case("output_dir = \"out\"\n[[samples]]\nname = \".\"\nannotated_vcf = \"a\"\nclassifier = \"b\"\n")]
    #[case("output_dir = \"out\"\n[[samples]]\nname = \"..\"\nannotated_vcf = \"a\"\nclassifier = \"b\"\n")]
    fn test_invalid_configs(#[case] content: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, content).unwrap();
        assert!(matches!(
            PipelineConfig::try_from(path.as_path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[rstest]
    fn test_sample_paths() {
        let paths = SamplePaths::new(Path::new("out"), "S1", OutputFormat::Yaml);
        assert_eq!(paths.dir, PathBuf::from("out/S1"));
        assert_eq!(paths.projected, PathBuf::from("out/S1/S1.projected.tsv"));
        assert_eq!(
            paths.unmatched_classifier,
            PathBuf::from("out/S1/S1.unmatched.classifier.tsv")
        );
        assert_eq!(paths.unmatched_vcf, PathBuf::from("out/S1/S1.unmatched.vcf.tsv"));
        assert_eq!(paths.prioritized, PathBuf::from("out/S1/S1.prioritized.yaml"));
        assert_eq!(paths.vus, PathBuf::from("out/S1/S1.vus.tsv"));
    }
}
