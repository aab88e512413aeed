//! Query services built on the index store: full-symbol matching, submatch
//! reconstruction, and duplicate clustering.

pub mod cluster;
pub mod matching;

pub use cluster::{clusters_for_source, Cluster, ClusterOptions};
pub use matching::{
    CancelToken, MatchService, SortDirection, SubmatchOrder, SubmatchPage, SubmatchQuery,
    SubmatchRow,
};
