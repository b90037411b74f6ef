//! Per-pipeline catalogs, normalization plans and audit tables.

mod hts;
mod hts_index;
mod pmtct_hts;
mod prep;
mod radet;
mod testing;

use datim_model::PipelineKind;
use datim_normalize::{AuditSpec, NormalizationPlan};

use crate::catalog::IndicatorCatalog;

pub use testing::{NEGATIVE, POSITIVE, TESTED};

/// Everything the engine needs to run one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    pub kind: PipelineKind,
    pub keys: &'static [&'static str],
    pub plan: NormalizationPlan,
    pub catalog: IndicatorCatalog,
    pub audits: Vec<AuditSpec>,
}

pub fn spec(kind: PipelineKind) -> PipelineSpec {
    let (plan, catalog, audits) = match kind {
        PipelineKind::Radet => (radet::plan(), radet::catalog(), radet::audits()),
        PipelineKind::Hts => (hts::plan(), hts::catalog(), hts::audits()),
        PipelineKind::HtsIndex => (hts_index::plan(), hts_index::catalog(), Vec::new()),
        PipelineKind::PmtctHts => (pmtct_hts::plan(), pmtct_hts::catalog(), pmtct_hts::audits()),
        PipelineKind::Prep => (prep::plan(), prep::catalog(), Vec::new()),
    };
    PipelineSpec {
        kind,
        keys: kind.key_columns(),
        plan,
        catalog,
        audits,
    }
}
