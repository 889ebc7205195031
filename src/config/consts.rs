pub const METADATA_SUFFIX: &str = ".meta";
pub const ARCHIVE_SUFFIX: &str = ".tar.zst.crypt";
pub const MIGRATION_SUFFIX: &str = ".migration.bak";

pub const ANALYSIS_FILE: &str = "analysis.json";
