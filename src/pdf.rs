use std::fs::File;
use std::io::Write;
use std::path::Path;

use svg2pdf::usvg;
use svg2pdf::{ConversionOptions, PageOptions};

use crate::error::RenderError;

/// Font every chart label is typeset with, bundled so output does not depend on the host.
const CHART_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const CHART_FONT_FAMILY: &str = "DejaVu Sans";

fn svg_options() -> usvg::Options<'static> {
    let mut options = usvg::Options::default();

    let fontdb = options.fontdb_mut();
    fontdb.load_font_data(CHART_FONT.to_vec());
    fontdb.set_sans_serif_family(CHART_FONT_FAMILY);

    options
}

/// Parses the chart svg with the bundled font.
///
/// usvg silently drops text it has no font for, so a document with `<text>` elements that
/// comes back without text nodes is an error.
pub fn parse_svg(svg: &str) -> Result<usvg::Tree, RenderError> {
    parse_svg_with(svg, &svg_options())
}

fn parse_svg_with(svg: &str, options: &usvg::Options) -> Result<usvg::Tree, RenderError> {
    let tree = usvg::Tree::from_str(svg, options).map_err(|e| RenderError::Svg(e.to_string()))?;

    if svg.contains("<text") && !tree.has_text_nodes() {
        return Err(RenderError::Pdf(
            "no font could be resolved for the chart labels".to_string(),
        ));
    }

    Ok(tree)
}

/// Converts a complete svg document into a single page pdf.
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, RenderError> {
    let tree = parse_svg(svg)?;

    svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

/// Writes `bytes` to `path`, replacing whatever is there.
///
/// The file is only created once the document is fully built. A failed write removes the
/// partial file so no truncated pdf is left behind.
pub fn write_pdf(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let io_error = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(io_error)?;

    let written = file.write_all(bytes).and_then(|_| file.sync_all());
    drop(file);

    if let Err(source) = written {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), "cannot remove partial output: {e}");
        }
        return Err(io_error(source));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::plots::render_svg;
    use crate::reg_lin::LinearFit;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="60" viewBox="0 0 100 60"><rect x="10" y="10" width="40" height="40" fill="red"/></svg>"#;

    #[test]
    fn converts_svg_to_pdf() {
        let pdf = svg_to_pdf(SQUARE).unwrap();

        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn labels_survive_into_the_pdf() {
        let dataset = Dataset::from_pairs([
            (36., 160.),
            (38., 165.),
            (40., 170.),
            (42., 175.),
            (44., 180.),
        ]);
        let fit = LinearFit::fit(&dataset).unwrap();
        let svg = render_svg(&dataset, &fit).unwrap();

        let tree = parse_svg(&svg).unwrap();
        assert!(tree.has_text_nodes());

        let pdf = svg_to_pdf(&svg).unwrap();
        let raw = String::from_utf8_lossy(&pdf);
        assert!(raw.contains("/Font"));
    }

    const LABEL: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="40"><text x="5" y="25" font-family="sans-serif" font-size="16">Shoe Size</text></svg>"#;

    #[test]
    fn generic_sans_serif_uses_the_bundled_font() {
        let tree = parse_svg(LABEL).unwrap();

        assert!(tree.has_text_nodes());
    }

    #[test]
    fn missing_font_is_an_error() {
        // empty font database
        let err = parse_svg_with(LABEL, &usvg::Options::default()).unwrap_err();

        assert!(matches!(err, RenderError::Pdf(_)), "{err:?}");
    }

    #[test]
    fn rejects_broken_svg() {
        assert!(matches!(svg_to_pdf("<svg"), Err(RenderError::Svg(_))));
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = std::env::temp_dir().join(format!("skostr_hoyde_pdf_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("overwrite.pdf");
        std::fs::write(&path, b"previous contents that are longer").unwrap();

        write_pdf(&path, b"%PDF-1.7").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let path = std::env::temp_dir()
            .join("skostr_hoyde_no_such_dir")
            .join("nested")
            .join("out.pdf");

        let err = write_pdf(&path, b"%PDF-1.7").unwrap_err();

        assert!(matches!(err, RenderError::Io { .. }));
        assert!(!path.exists());
    }
}
