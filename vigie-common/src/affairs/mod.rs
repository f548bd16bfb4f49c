//! Judicial affairs: duplicate detection

mod duplicates;

pub use duplicates::{
    normalize_url, title_similarity, AffairSummary, DuplicateDetector, DuplicateGroup,
};
