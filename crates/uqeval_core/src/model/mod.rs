mod adaptive;
mod node;
mod results;
mod trace;

pub use adaptive::AdaptiveSet;
pub use node::ParameterNode;
pub use results::{FeatureResult, LegacyRecord, ResultEntry, ResultSet};
pub use trace::{ModelOutput, RawTrace, nan_scalar, scalar};
