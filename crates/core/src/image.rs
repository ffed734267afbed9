//! Image URL resolution for product cards.
//!
//! Asset references look like `image-<assetId>-<width>x<height>-<format>` and
//! resolve to `https://cdn.sanity.io/images/<project>/<dataset>/<assetId>-<width>x<height>.<format>`.

use tracing::warn;

use crate::types::{ImageRef, PLACEHOLDER_IMAGE};

const CDN_BASE: &str = "https://cdn.sanity.io/images";

#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self { project_id: project_id.into(), dataset: dataset.into() }
    }

    /// URL for a card image. Missing or unresolvable images fall back to the
    /// placeholder path.
    pub fn url_for(&self, image: Option<&ImageRef>) -> String {
        let Some(asset) = image.and_then(|i| i.asset.as_ref()) else {
            return PLACEHOLDER_IMAGE.to_string();
        };
        if let Some(url) = asset.url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        match asset.reference.as_deref().and_then(|r| self.resolve_ref(r)) {
            Some(url) => url,
            None => {
                warn!(reference = ?asset.reference, "Unresolvable image reference");
                PLACEHOLDER_IMAGE.to_string()
            }
        }
    }

    fn resolve_ref(&self, reference: &str) -> Option<String> {
        let rest = reference.strip_prefix("image-")?;
        let (stem, format) = rest.rsplit_once('-')?;
        let (id, dims) = stem.rsplit_once('-')?;
        let (w, h) = dims.split_once('x')?;
        if id.is_empty() || format.is_empty() || w.parse::<u32>().is_err() || h.parse::<u32>().is_err()
        {
            return None;
        }
        Some(format!("{CDN_BASE}/{}/{}/{id}-{dims}.{format}", self.project_id, self.dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetRef;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("abc123", "production")
    }

    #[test]
    fn missing_image_uses_placeholder() {
        assert_eq!(builder().url_for(None), "/placeholder.svg");
        let no_asset = ImageRef { kind: Some("image".into()), asset: None };
        assert_eq!(builder().url_for(Some(&no_asset)), "/placeholder.svg");
    }

    #[test]
    fn reference_resolves_to_cdn_url() {
        let image = ImageRef::from_ref("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg");
        assert_eq!(
            builder().url_for(Some(&image)),
            "https://cdn.sanity.io/images/abc123/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg"
        );
    }

    #[test]
    fn dereferenced_url_is_used_as_is() {
        let image = ImageRef {
            kind: None,
            asset: Some(AssetRef { reference: None, url: Some("https://img.example/x.png".into()) }),
        };
        assert_eq!(builder().url_for(Some(&image)), "https://img.example/x.png");
    }

    #[test]
    fn malformed_reference_falls_back() {
        for bad in ["file-abc-pdf", "image-abc-png", "image-abc-axb-png", "image--10x10-png"] {
            let image = ImageRef::from_ref(bad);
            assert_eq!(builder().url_for(Some(&image)), "/placeholder.svg", "ref {bad}");
        }
    }
}
