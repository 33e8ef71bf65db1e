//! Logging facilities.
//!
//! The crate is instrumented with `tracing`. To see logs, install a tracing
//! subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lattice_fontstash::atlas=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Crate-wide target.
    pub const FONTSTASH: &str = "horizon_lattice_fontstash";
    /// Atlas creation and rectangle placement.
    pub const ATLAS: &str = "horizon_lattice_fontstash::atlas";
    /// Glyph cache hits and misses.
    pub const GLYPH_CACHE: &str = "horizon_lattice_fontstash::glyph_cache";
    /// Font loading, sized fonts and lifecycle of the font system.
    pub const FONT_SYSTEM: &str = "horizon_lattice_fontstash::font_system";
    /// Name table decoding.
    pub const NAME_TABLE: &str = "horizon_lattice_fontstash::name_table";
    /// Signal emission.
    pub const SIGNAL: &str = "horizon_lattice_fontstash::signal";
}
