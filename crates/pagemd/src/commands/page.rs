//! `pagemd page` command implementation.

use clap::Args;
use pagemd_blocks::BlockRecord;
use pagemd_config::{CliSettings, Config};
use pagemd_renderer::{
    Assembler, RenderOptions, TableListing, Traversal, render_block, render_page,
};
use pagemd_storage::BlockStore;

use super::{StoreArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Id of the page block to render.
    id: String,

    /// Print block counts and raw metadata after every block.
    #[arg(short, long)]
    debug: bool,

    /// Render fetched blocks one after another instead of as a tree.
    #[arg(long)]
    flat: bool,

    /// Skip blocks marked as deleted.
    #[arg(long)]
    live_only: bool,

    #[command(flatten)]
    store: StoreArgs,
}

/// How fetched blocks are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layout {
    /// Nested by hierarchy, starting from the page's children.
    Tree,
    /// Every fetched block in fetch order.
    Flat,
}

/// A rendered page and what went into it.
#[derive(Debug)]
pub(crate) struct RenderedPage {
    pub(crate) markdown: String,
    pub(crate) block_count: usize,
    pub(crate) root_found: bool,
}

impl PageArgs {
    /// Execute the page command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the store cannot be read.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let settings = CliSettings {
            diagnostics: self.debug.then_some(true),
            live_only: self.live_only.then_some(true),
            ..CliSettings::default()
        };
        let config = self.store.load_config(settings)?;
        let store = open_store(&config).await?;

        let layout = if self.flat { Layout::Flat } else { Layout::Tree };
        let page = render(
            &store,
            &self.id,
            &render_options(&config),
            config.render.live_only,
            layout,
        )
        .await?;

        if config.render.diagnostics {
            output.info(&format!("Found {} blocks", page.block_count));
        }
        if !page.root_found && layout == Layout::Tree {
            output.warning(&format!(
                "Page {} not found, rendering its fetched blocks as top-level",
                self.id
            ));
        }

        output.document(&page.markdown)?;
        Ok(())
    }
}

/// Build render options from the loaded config.
pub(crate) fn render_options(config: &Config) -> RenderOptions {
    let listing = match config.render.table_listing {
        pagemd_config::TableListing::Always => TableListing::Always,
        pagemd_config::TableListing::DiagnosticsOnly => TableListing::DiagnosticsOnly,
    };
    RenderOptions::new()
        .with_diagnostics(config.render.diagnostics)
        .with_table_listing(listing)
}

/// Fetch a page's blocks and render them under a `# Page content` header.
///
/// When the page block itself is missing, the fetched blocks whose parents
/// are not among them become top-level blocks and are walked recursively.
pub(crate) async fn render<S: BlockStore>(
    store: &S,
    page_id: &str,
    options: &RenderOptions,
    live_only: bool,
    layout: Layout,
) -> Result<RenderedPage, CliError> {
    let mut blocks = store.descendants(page_id).await?;
    if live_only {
        blocks.retain(BlockRecord::is_live);
    }
    let root = store.block(page_id).await?;

    tracing::debug!(page_id, count = blocks.len(), "Rendering page");

    let body = match (layout, &root) {
        (Layout::Flat, _) => render_flat(&blocks, options),
        (Layout::Tree, Some(root)) => render_page(root, &blocks, options.clone()),
        (Layout::Tree, None) => {
            let assembler = Assembler::new(&blocks, options.clone());
            assembler.assemble(&assembler.roots(), Traversal::Recursive)
        }
    };

    let mut markdown = format!("# Page content - {page_id}");
    if !body.is_empty() {
        markdown.push_str("\n\n");
        markdown.push_str(&body);
    }

    Ok(RenderedPage {
        markdown,
        block_count: blocks.len(),
        root_found: root.is_some(),
    })
}

/// Render every block on its own, separated by rules in diagnostics mode.
fn render_flat(blocks: &[BlockRecord], options: &RenderOptions) -> String {
    let separator = if options.diagnostics { "\n---\n" } else { "\n" };
    blocks
        .iter()
        .filter_map(|block| render_block(block, options))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use pagemd_storage::{MockStore, StoreErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn store(with_root: bool) -> MockStore {
        let store = MockStore::new().with_blocks([
            BlockRecord::new("h", "header")
                .with_parent("page")
                .with_title("Intro")
                .with_times(0, 100),
            BlockRecord::new("p", "text")
                .with_parent("page")
                .with_title("Hello")
                .with_content(["li"])
                .with_times(0, 200),
            BlockRecord::new("gone", "text")
                .with_parent("page")
                .with_title("Gone")
                .with_alive(false)
                .with_times(0, 300),
            BlockRecord::new("li", "bulleted_list")
                .with_parent("p")
                .with_title("Point")
                .with_times(0, 400),
        ]);
        if with_root {
            store.with_block(
                BlockRecord::new("page", "page")
                    .with_title("Doc")
                    .with_content(["h", "p", "gone"]),
            )
        } else {
            store
        }
    }

    #[tokio::test]
    async fn test_render_page_tree() {
        let page = render(&store(true), "page", &RenderOptions::new(), false, Layout::Tree)
            .await
            .unwrap();

        assert_eq!(page.markdown, "# Page content - page\n\n# Intro\nHello\nGone");
        assert_eq!(page.block_count, 4);
        assert!(page.root_found);
    }

    #[tokio::test]
    async fn test_render_page_live_only() {
        let page = render(&store(true), "page", &RenderOptions::new(), true, Layout::Tree)
            .await
            .unwrap();

        assert_eq!(page.markdown, "# Page content - page\n\n# Intro\nHello");
        assert_eq!(page.block_count, 3);
    }

    #[tokio::test]
    async fn test_render_missing_root_walks_fetched_blocks() {
        let page = render(&store(false), "page", &RenderOptions::new(), false, Layout::Tree)
            .await
            .unwrap();

        assert_eq!(
            page.markdown,
            "# Page content - page\n\n# Intro\nHello\n  - Point\nGone"
        );
        assert!(!page.root_found);
    }

    #[tokio::test]
    async fn test_render_flat() {
        let page = render(&store(true), "page", &RenderOptions::new(), false, Layout::Flat)
            .await
            .unwrap();

        assert_eq!(
            page.markdown,
            "# Page content - page\n\n# Intro\nHello\nGone\n- Point"
        );
    }

    #[tokio::test]
    async fn test_render_flat_diagnostics() {
        let options = RenderOptions::new().with_diagnostics(true);

        let page = render(&store(true), "page", &options, false, Layout::Flat)
            .await
            .unwrap();

        assert_eq!(page.markdown.matches("\n---\n").count(), 3);
        assert_eq!(page.markdown.matches("=== Metadata ===").count(), 4);
    }

    #[tokio::test]
    async fn test_render_unknown_page() {
        let page = render(&store(true), "nope", &RenderOptions::new(), false, Layout::Tree)
            .await
            .unwrap();

        assert_eq!(page.markdown, "# Page content - nope");
        assert_eq!(page.block_count, 0);
    }

    #[tokio::test]
    async fn test_render_store_failure() {
        let store = store(true).with_failure(StoreErrorKind::Unavailable);

        let err = render(&store, "page", &RenderOptions::new(), false, Layout::Tree)
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Store(_)));
    }

    #[test]
    fn test_render_options_from_config() {
        let mut config = Config::default();
        config.render.diagnostics = true;
        config.render.table_listing = pagemd_config::TableListing::DiagnosticsOnly;

        let options = render_options(&config);

        assert!(options.diagnostics);
        assert_eq!(options.table_listing, TableListing::DiagnosticsOnly);
    }
}
