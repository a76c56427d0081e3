/// Units deposited by every heavenly stem into its own element.
pub const STEM_UNITS: f64 = 10.0;

/// Units carried by a year, day or hour branch, split across its hidden stems.
pub const BRANCH_UNITS: f64 = 20.0;

/// Units carried by the month branch (seasonal command counts double).
pub const MONTH_BRANCH_UNITS: f64 = 40.0;

/// Coefficient applied to every contribution of a void branch.
pub const VOID_FACTOR: f64 = 0.5;

/// Share of a void reduction given back when the branch joins a three-branch group.
pub const VOID_RESTORE_RATIO: f64 = 0.5;

/// Seasonal multipliers: wang, xiang, xiu, qiu, si.
pub const SEASON_WANG: f64 = 1.5;
pub const SEASON_XIANG: f64 = 1.2;
pub const SEASON_XIU: f64 = 0.7;
pub const SEASON_QIU: f64 = 0.4;
pub const SEASON_SI: f64 = 0.2;

/// Cap on what a single branch gives up to a three-branch group.
pub const GROUP_TRANSFER_CAP: f64 = 40.0;

/// Flat bonus from a half harmony that contains its center branch.
pub const HALF_HARMONY_BONUS: f64 = 20.0;

/// Stem pairing thresholds on the transformation success ratio.
pub const MERGE_FULL_RATIO: f64 = 0.8;
pub const MERGE_PARTIAL_RATIO: f64 = 0.4;

/// Keeps the success ratio finite when every involved score is zero.
pub const RATIO_EPSILON: f64 = 0.01;

/// Most a source element gives up in a stem merge.
pub const MERGE_SOURCE_CAP: f64 = 10.0;

/// Target gain of a full stem merge.
pub const MERGE_FULL_GAIN: f64 = 20.0;

/// Total transfer of a partial merge at the top of its band.
pub const MERGE_PARTIAL_MAX: f64 = 10.0;

/// Source damping when a pair neither merges nor separates.
pub const ENTANGLE_FACTOR: f64 = 0.85;

/// Residual pass: target gain with seasonal support, damping without it.
pub const RESIDUAL_MERGE_GAIN: f64 = 30.0;
pub const RESIDUAL_DAMPING: f64 = 0.8;

/// Rooting multipliers by the strongest matching hidden stem.
pub const ROOT_STRONG: f64 = 1.2;
pub const ROOT_MEDIUM: f64 = 1.0;
pub const ROOT_WEAK: f64 = 0.8;
pub const ROOT_NONE: f64 = 0.1;

/// Earth-earth clash coefficients.
pub const EARTH_CLASH_MAIN: f64 = 1.4;
pub const EARTH_CLASH_OTHER: f64 = 0.1;

/// Ordinary clash: scores closer than this are treated as an even fight.
pub const CLASH_EVEN_MARGIN: f64 = 10.0;
pub const CLASH_EVEN_FACTOR: f64 = 0.75;
pub const CLASH_WINNER_FACTOR: f64 = 0.9;
pub const CLASH_LOSER_FACTOR: f64 = 0.6;

/// Minor relation nudges, as a fraction of the participant element's score.
pub const MINOR_COMBINE: f64 = 0.18;
pub const MINOR_CLASH: f64 = -0.22;
pub const MINOR_HARM: f64 = -0.12;
pub const MINOR_PUNISHMENT: f64 = -0.10;
pub const MINOR_BREAK: f64 = -0.08;

/// Element level thresholds, as a ratio to the mean element score.
pub const LEVEL_VERY_STRONG: f64 = 1.6;
pub const LEVEL_STRONG: f64 = 1.25;
pub const LEVEL_WEAK: f64 = 0.8;
pub const LEVEL_VERY_WEAK: f64 = 0.55;

/// Day-master strength thresholds on the support share of the total.
pub const DM_VERY_STRONG: f64 = 0.6;
pub const DM_STRONG: f64 = 0.48;
pub const DM_WEAK: f64 = 0.36;
pub const DM_VERY_WEAK: f64 = 0.25;

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-9;
