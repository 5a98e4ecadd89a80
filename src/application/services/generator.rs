//! Demo dataset generation service
//!
//! Runs the forward pipeline: sample ids, random tree, optional ultrametric
//! pass, Newick text, clade/lineage labels, metadata rows, then writes both
//! files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use crate::application::render::render_metadata_csv;
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{
    assign_clades_and_lineages, build_random_tree, generate_metadata, make_ultrametric,
    sample_ids, to_newick_document, validate_sample_count, CladeMap, MetadataRecord, TreeNode,
};
use crate::config::Settings;
use crate::infrastructure::traits::FileSystem;

/// Parameters for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Requested sample count; anything below 2 fails validation.
    pub samples: i64,
    pub ultrametric: bool,
    /// Fixed seed, any integer; `None` draws one from OS entropy.
    pub seed: Option<i64>,
    pub tree_out: PathBuf,
    pub metadata_out: PathBuf,
}

impl From<&Settings> for GenerationRequest {
    fn from(settings: &Settings) -> Self {
        Self {
            samples: settings.samples,
            ultrametric: settings.ultrametric,
            seed: settings.seed,
            tree_out: settings.tree_out.clone(),
            metadata_out: settings.metadata_out.clone(),
        }
    }
}

/// In-memory result of the generation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub sample_ids: Vec<String>,
    pub tree: TreeNode,
    /// Root-to-leaf distance after the ultrametric pass, if applied.
    pub ultrametric_target: Option<f64>,
    pub newick: String,
    pub clade_map: CladeMap,
    pub records: Vec<MetadataRecord>,
}

impl Dataset {
    /// Generate a dataset from an explicit rng.
    ///
    /// Draw order is fixed: tree, labels, metadata. The same rng state
    /// always yields the same dataset.
    pub fn generate<R: Rng + ?Sized>(
        samples: i64,
        ultrametric: bool,
        rng: &mut R,
    ) -> ApplicationResult<Self> {
        let samples = validate_sample_count(samples)?;
        let ids = sample_ids(samples);

        let mut shuffled = ids.clone();
        let mut tree = build_random_tree(&mut shuffled, rng)?;
        debug!(leaves = tree.leaf_count(), depth = tree.depth(), "built tree");

        let ultrametric_target = ultrametric.then(|| make_ultrametric(&mut tree));
        let newick = to_newick_document(&tree);

        let clade_map = assign_clades_and_lineages(&tree, rng);
        let records = generate_metadata(&ids, rng, &clade_map);

        Ok(Self {
            sample_ids: ids,
            tree,
            ultrametric_target,
            newick,
            clade_map,
            records,
        })
    }

    /// Metadata table text.
    pub fn metadata_csv(&self) -> String {
        render_metadata_csv(&self.records)
    }
}

/// Seeded rng for a user-facing seed; negative seeds keep their bit pattern.
fn rng_from_seed(seed: i64) -> StdRng {
    StdRng::seed_from_u64(seed as u64)
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Seed actually used, drawn or given.
    pub seed: i64,
    pub dataset: Dataset,
    pub tree_out: PathBuf,
    pub metadata_out: PathBuf,
}

/// Service generating and writing demo tree and metadata files.
pub struct GeneratorService {
    fs: Arc<dyn FileSystem>,
}

impl GeneratorService {
    /// Create a new generator service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Generate the dataset and write the tree, then the metadata table.
    ///
    /// Fails before any file is touched if the sample count is invalid.
    /// A failed write aborts the run; the tree file may already exist then.
    #[instrument(skip(self))]
    pub fn generate(&self, request: &GenerationRequest) -> ApplicationResult<GenerationReport> {
        let seed = match request.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<i64>();
                info!(seed, "no seed given, drew one from entropy");
                seed
            }
        };
        let mut rng = rng_from_seed(seed);

        let dataset = Dataset::generate(request.samples, request.ultrametric, &mut rng)?;
        if let Some(target) = dataset.ultrametric_target {
            info!(target, "tree made ultrametric");
        }

        self.write_output("write tree", &request.tree_out, &dataset.newick)?;
        self.write_output("write metadata", &request.metadata_out, &dataset.metadata_csv())?;

        Ok(GenerationReport {
            seed,
            dataset,
            tree_out: request.tree_out.clone(),
            metadata_out: request.metadata_out.clone(),
        })
    }

    fn write_output(&self, action: &str, path: &Path, content: &str) -> ApplicationResult<()> {
        debug!("{}: {} ({} bytes)", action, path.display(), content.len());
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs.write(path, content).with_path_context(action, path)
    }
}
