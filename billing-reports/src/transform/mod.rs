pub mod conflicts;
pub mod monthly;

pub use conflicts::{detect, group_by_premise, ConflictReport, ConflictTransform, PremiseGroup};
pub use monthly::{aggregate, GroupKey, MatrixRow, MonthlyMatrix, MonthlyUsageTransform};
