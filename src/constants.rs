//! Constants used throughout servgen

/// Extensions accepted for a placeholder file, mapped to their format
pub const JSON_EXTENSIONS: &[&str] = &["json"];
pub const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Indentation emitted per walker level
pub const DEFAULT_INDENT: &str = "  ";

/// Name under which the output template is registered in the environment
pub const TEMPLATE_NAME: &str = "dialect";

/// Deepest nesting of values the configuration parser accepts
pub const MAX_NESTING_DEPTH: usize = 128;

/// STDOUT indicator for the output argument
pub const STDOUT_INDICATOR: &str = "-";

/// Writer hook suffixes looked up per field
pub mod hooks {
    pub const OPEN: &str = "_open";
    pub const OPEN_ITEM: &str = "_open_item";
    pub const CLOSE_ITEM: &str = "_close_item";
    pub const CLOSE: &str = "_close";
}

/// Well-known keys rewritten by the structural transforms
pub mod keys {
    pub const SERVERS: &str = "servers";
    pub const LOCATIONS: &str = "locations";
    pub const HEADERS: &str = "headers";
}

/// Exit codes
pub mod exit_codes {
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
