//! One shopper action: validate the free text, resolve, render.

use crate::bike::BikeQuery;
use crate::catalog::StaticTable;
use crate::error::{CompatError, Result};
use crate::geometry::GeometrySource;
use crate::messages;
use crate::render::Renderer;
use crate::resolver::analyze;
use crate::verdict::CompatibilityVerdict;
use tracing::debug;

/// Run an analysis for the text typed in the widget.
///
/// Blank input renders the validation message and returns `EmptyInput`
/// without resolving anything. Otherwise a verdict is always rendered.
pub async fn analyze_text<R: Renderer + ?Sized>(
    text: &str,
    source: Option<&dyn GeometrySource>,
    table: &StaticTable,
    renderer: &mut R,
) -> Result<CompatibilityVerdict> {
    if text.trim().is_empty() {
        debug!("rejecting blank widget input");
        renderer.render_error(messages::EMPTY_INPUT);
        return Err(CompatError::EmptyInput(messages::EMPTY_INPUT.to_string()));
    }

    let query = BikeQuery::parse(text);
    let verdict = analyze(&query, source, table).await;
    renderer.render(&verdict);
    Ok(verdict)
}
