/**
 * Release pipeline
 *
 * Walks the version tags oldest to newest. For each tag:
 *
 *   export snapshot -> locate ontology -> load graph -> IRI tables
 *   -> competency questions -> rewrite metadata -> generate docs
 *   -> assemble artifacts -> (latest only) mirror into the output root
 *
 * The previous tag is carried forward for `owl:priorVersion`. Tags are
 * processed one at a time; each gets its own snapshot and staging folder,
 * both removed once the tag is done.
 */

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::assembler::{copy_tree, ArtifactAssembler};
use crate::competency::{run_competency_questions, CompetencyOutcome};
use crate::config::PipelineConfig;
use crate::docgen::{DocGenerator, GenerationOutcome};
use crate::errors::{ReleaseError, Result};
use crate::git::GitDriver;
use crate::ontology::{
    iri_table, rewrite_metadata, table_file_name, write_release_file, OntologyGraph, OntologyLocator, ReleaseInfo,
    RewrittenMetadata,
};
use crate::snapshot::TagSnapshot;
use crate::tags::VersionTag;

/// What happened to one tag
#[derive(Debug, Clone, Serialize)]
pub struct TagReport {
    pub tag: String,
    pub version: String,
    pub output_dir: PathBuf,
    /// Primary ontology file name inside the tag
    pub ontology: String,
    pub metadata: RewrittenMetadata,
    /// IRI table files written, non-empty tables only
    pub iri_tables: Vec<String>,
    pub competency: CompetencyOutcome,
    pub generation: GenerationOutcome,
    /// Diagram and static index files copied in
    pub copied: Vec<String>,
    /// Whether this version was mirrored into the output root
    pub latest: bool,
}

/// Result of a full run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub output_root: PathBuf,
    pub tags: Vec<TagReport>,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Report of the version mirrored into the output root
    pub fn latest(&self) -> Option<&TagReport> {
        self.tags.iter().find(|report| report.latest)
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    git: GitDriver,
    assembler: ArtifactAssembler,
    generator: DocGenerator,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let git = GitDriver::new(&config.repository);
        let assembler = ArtifactAssembler::new(&config.output_dir);
        let generator = DocGenerator::new(&config.generator, &config.languages);
        Self {
            config,
            git,
            assembler,
            generator,
        }
    }

    /// Version tags in release order
    pub fn version_tags(&self) -> Result<Vec<VersionTag>> {
        if !self.git.is_repository() {
            return Err(ReleaseError::Git(format!(
                "{} is not a git repository",
                self.git.repo_path().display()
            )));
        }
        self.git.version_tags(&self.config.tag_prefix)
    }

    /// Process every version tag
    ///
    /// A failing tag aborts the run. No tags is an empty, successful run.
    pub fn run(&self) -> Result<RunSummary> {
        let tags = self.version_tags()?;
        let mut summary = RunSummary {
            output_root: self.assembler.output_root().to_path_buf(),
            tags: Vec::with_capacity(tags.len()),
        };

        if tags.is_empty() {
            tracing::warn!(
                repo = %self.git.repo_path().display(),
                prefix = %self.config.tag_prefix,
                "No version tags found"
            );
            return Ok(summary);
        }

        tracing::info!(count = tags.len(), "Building documentation for version tags");

        let versions: Vec<&str> = tags.iter().map(|tag| tag.version()).collect();
        let mut previous: Option<&VersionTag> = None;
        for (index, tag) in tags.iter().enumerate() {
            // Only the newest tag mirrors, and it needs every version folder name
            let mirror = if index + 1 == tags.len() { Some(versions.as_slice()) } else { None };
            let report = self.process_tag(tag, previous, mirror).map_err(|e| {
                tracing::error!(tag = %tag, error = %e, "Tag failed, aborting run");
                e
            })?;
            summary.tags.push(report);
            previous = Some(tag);
        }

        Ok(summary)
    }

    /// `mirror` holds every version folder name when this tag is the latest
    fn process_tag(&self, tag: &VersionTag, previous: Option<&VersionTag>, mirror: Option<&[&str]>) -> Result<TagReport> {
        let version = tag.version();
        let is_latest = mirror.is_some();
        tracing::info!(tag = %tag, version, latest = is_latest, "Processing tag");

        let snapshot = TagSnapshot::export(&self.git, tag)?;
        let files = OntologyLocator::new(
            snapshot.join(&self.config.ontology_dir),
            self.config.primary_ontology.clone(),
        )
        .locate()?;
        tracing::debug!(
            tag = %tag,
            path = %files.primary.display(),
            individuals = ?files.individuals,
            diagram = ?files.diagram,
            "Located ontology"
        );

        let graph = OntologyGraph::load(&files.primary)?;

        // Written by us, copied into out/<version> after the generator ran
        let staging = tempfile::Builder::new()
            .prefix(&format!("onto-release-{}-staging-", version))
            .tempdir()?;

        let iri_tables = self.write_iri_tables(&graph, &staging)?;

        let competency = run_competency_questions(
            &snapshot.join(&self.config.competency_questions),
            &files.primary,
            files.individuals.as_deref(),
            staging.path(),
        );

        let modified = self.git.commit_date(tag.name())?;
        let diagram_file = files.diagram_file_name();
        let info = ReleaseInfo {
            tag,
            previous,
            modified,
            short_name: &files.short_name,
            diagram_file: &diagram_file,
            languages: &self.config.languages,
            iri_tables: &iri_tables,
            competency_index: competency.index_link(),
        };
        let metadata = rewrite_metadata(&graph, &info)?;
        let release_file = write_release_file(&graph, &files.short_name)?;

        let version_dir = self.assembler.version_dir(version)?;
        let generation = self.generator.generate(release_file.path(), &version_dir)?;
        release_file.close()?;

        let staged = copy_tree(staging.path(), &version_dir)?;
        tracing::debug!(tag = %tag, files = staged, "Copied staged artifacts");

        let static_index = snapshot.join(&self.config.static_index);
        let mut optional = vec![static_index.as_path()];
        if let Some(diagram) = files.diagram.as_deref() {
            optional.insert(0, diagram);
        }
        let copied = self.assembler.copy_optional(&optional, &version_dir)?;

        if let Some(versions) = mirror {
            self.assembler.promote_latest(&version_dir, versions)?;
        }

        tracing::info!(
            tag = %tag,
            version,
            path = %version_dir.display(),
            status = if generation.success { "ok" } else { "generator-failed" },
            "Finished tag"
        );
        tracing::debug!(root = %snapshot.root().display(), "Dropping snapshot");

        Ok(TagReport {
            tag: tag.name().to_string(),
            version: version.to_string(),
            output_dir: version_dir,
            ontology: files
                .primary
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
            metadata,
            iri_tables: iri_tables.into_values().collect(),
            competency,
            generation,
            copied,
            latest: is_latest,
        })
    }

    /// Writes one table per configured language, skipping empty ones
    ///
    /// Returns language -> file name for the tables written.
    fn write_iri_tables(&self, graph: &OntologyGraph, staging: &TempDir) -> Result<BTreeMap<String, String>> {
        let mut written = BTreeMap::new();
        for lang in &self.config.languages {
            let table = iri_table(graph, lang)?;
            if table.is_empty() {
                tracing::warn!(lang = %lang, "No labelled IRIs, skipping table");
                continue;
            }
            let file_name = table_file_name(lang);
            fs::write(staging.path().join(&file_name), table)?;
            written.insert(lang.clone(), file_name);
        }
        Ok(written)
    }
}
