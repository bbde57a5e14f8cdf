//! Report assembly: output model, tree builder, emitter and summary.

pub mod builder;
pub mod emitter;
pub mod model;
pub mod summary;

pub use builder::{TreeBuilder, substitute_placeholders};
pub use emitter::{ReportEmitter, SchemaValidator};
pub use model::{
    CommentReport, ElementReport, ElementType, Embedding, FeatureReport, StepMatch, StepReport,
    StepResult, TagReport, UNMATCHED_LOCATION,
};
pub use summary::ReportSummary;
