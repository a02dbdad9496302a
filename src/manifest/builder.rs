//! Manifest builder: walk, classify, resolve hard links, assemble

use crate::error::ManifestError;
use crate::manifest::assembler::Assembler;
use crate::manifest::classify::{Classified, Classifier, SkipReason, SymlinkPolicy};
use crate::manifest::entry::RawStat;
use crate::manifest::filter::{ExcludeNames, IncludeAll, InclusionFilter};
use crate::manifest::hardlink::HardLinkGroups;
use crate::manifest::hasher::DigestAlgorithm;
use crate::manifest::identity::{IdentityDatabase, IdentityResolver, SystemIdentities};
use crate::manifest::path;
use crate::manifest::walker::Walker;
use crate::manifest::Manifest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Options controlling one manifest build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Content digest algorithm
    #[serde(default)]
    pub digest: DigestAlgorithm,

    /// Path component names pruned from the walk
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Handling of relative symlinks that leave the root
    #[serde(default)]
    pub symlink_policy: SymlinkPolicy,

    /// Group database snapshotted once per build
    #[serde(default = "default_group_file")]
    pub group_file: PathBuf,

    /// Treat a hard-link group with a single alias under the root as an error
    #[serde(default)]
    pub strict_hard_links: bool,
}

fn default_group_file() -> PathBuf {
    PathBuf::from(crate::manifest::identity::DEFAULT_GROUP_FILE)
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::default(),
            exclude: Vec::new(),
            symlink_policy: SymlinkPolicy::default(),
            group_file: default_group_file(),
            strict_hard_links: false,
        }
    }
}

impl ManifestConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.group_file.as_os_str().is_empty() {
            return Err("Group file path cannot be empty".to_string());
        }
        for name in &self.exclude {
            if name.is_empty() || name.contains('/') {
                return Err(format!(
                    "Exclude entry '{}' must be a single path component",
                    name
                ));
            }
        }
        Ok(())
    }
}

/// Counters reported at the end of a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub visited: usize,
    pub directories: usize,
    pub sockets: usize,
    pub hard_link_groups: usize,
}

/// Builds a [`Manifest`] for one root directory
pub struct ManifestBuilder {
    root: PathBuf,
    config: ManifestConfig,
    identities: Option<Box<dyn IdentityDatabase>>,
    filter: Option<Box<dyn InclusionFilter>>,
}

impl ManifestBuilder {
    /// Create a builder with default configuration and the host identity
    /// database
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: ManifestConfig::default(),
            identities: None,
            filter: None,
        }
    }

    pub fn with_config(mut self, config: ManifestConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the identity database. Without one, names come from the host
    /// using `config.group_file`.
    pub fn with_identities<D>(mut self, identities: D) -> Self
    where
        D: IdentityDatabase + 'static,
    {
        self.identities = Some(Box::new(identities));
        self
    }

    /// Add an inclusion filter, applied together with `config.exclude`
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: InclusionFilter + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Build the manifest. Any error discards everything gathered so far.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<Manifest, ManifestError> {
        self.build_with_stats().map(|(manifest, _)| manifest)
    }

    /// Build the manifest and report traversal counters
    pub fn build_with_stats(&self) -> Result<(Manifest, BuildStats), ManifestError> {
        let start = Instant::now();
        info!(digest = %self.config.digest, "Starting manifest build");

        let root = path::canonicalize_root(&self.root)?;

        let system;
        let database: &dyn IdentityDatabase = match &self.identities {
            Some(identities) => identities.as_ref(),
            None => {
                system = SystemIdentities::with_group_file(self.config.group_file.clone());
                &system
            }
        };
        let identities = IdentityResolver::new(database)?;
        debug!(groups = identities.groups().len(), "Loaded group index");

        let excludes = ExcludeNames::new(self.config.exclude.clone());
        let user_filter: &dyn InclusionFilter = match &self.filter {
            Some(filter) => filter.as_ref(),
            None => &IncludeAll,
        };
        let filter =
            |path: &str, stat: &RawStat| excludes.include(path, stat) && user_filter.include(path, stat);

        let classifier = Classifier::new(
            &root,
            &identities,
            self.config.digest,
            self.config.symlink_policy,
        );
        let mut assembler = Assembler::new();
        let mut hard_links = HardLinkGroups::new();
        let mut stats = BuildStats::default();

        let walked = Walker::new(&root, &filter).walk(|node| {
            stats.visited += 1;
            match classifier.classify(&node)? {
                Classified::Entry(entry) => assembler.insert_classified(entry),
                Classified::Deferred { key, member } => hard_links.defer(key, member),
                Classified::Skipped(SkipReason::Directory) => stats.directories += 1,
                Classified::Skipped(SkipReason::Socket) => stats.sockets += 1,
                Classified::Skipped(SkipReason::UnknownType) => {}
            }
            Ok(())
        });
        if let Err(e) = walked {
            error!("Manifest walk failed: {}", e);
            return Err(e);
        }

        stats.hard_link_groups = hard_links.group_count();
        debug!(
            groups = stats.hard_link_groups,
            members = hard_links.member_count(),
            "Resolving hard links"
        );
        let resolved = hard_links
            .resolve(&root, self.config.digest, self.config.strict_hard_links)
            .map_err(|e| {
                error!("Hard-link resolution failed: {}", e);
                e
            })?;
        assembler.insert_resolved(resolved);

        let manifest = assembler.finish();
        info!(
            entries = manifest.len(),
            visited = stats.visited,
            duration_ms = start.elapsed().as_millis(),
            "Manifest build completed"
        );
        Ok((manifest, stats))
    }
}
