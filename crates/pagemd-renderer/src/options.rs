//! Render options.

/// Whether a `table` block lists its row ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableListing {
    /// Always emit the `Table:` header and row id bullets.
    #[default]
    Always,
    /// Only emit them when diagnostics are on.
    DiagnosticsOnly,
}

/// Options shared by the block renderer and the assembler.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Append raw block metadata after every block.
    pub diagnostics: bool,
    /// Row listing policy for `table` blocks.
    pub table_listing: TableListing,
}

impl RenderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    #[must_use]
    pub fn with_table_listing(mut self, listing: TableListing) -> Self {
        self.table_listing = listing;
        self
    }

    /// Whether table blocks should list their rows under these options.
    #[must_use]
    pub fn lists_table_rows(&self) -> bool {
        match self.table_listing {
            TableListing::Always => true,
            TableListing::DiagnosticsOnly => self.diagnostics,
        }
    }
}
