pub mod stage1_normalize;
pub mod stage2_score;
pub mod stage3_thresholds;
pub mod stage4_assemble;
pub mod stage5_cohort;
pub mod stage6_output;
