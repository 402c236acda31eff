//! Dashboard files baked into the image.

use std::sync::OnceLock;

use super::etag::ETag;

pub struct Asset {
    pub path: &'static str,
    pub content_type: &'static str,
    pub body: &'static str,
    etag: OnceLock<ETag>,
}

impl Asset {
    const fn new(path: &'static str, content_type: &'static str, body: &'static str) -> Self {
        Self {
            path,
            content_type,
            body,
            etag: OnceLock::new(),
        }
    }

    /// Content hash, computed on first use.
    pub fn etag(&self) -> &ETag {
        self.etag.get_or_init(|| ETag::for_content(self.body))
    }
}

pub static INDEX_HTML: Asset = Asset::new(
    "/",
    "text/html; charset=utf-8",
    include_str!("../../www/index.html"),
);

pub static MAIN_JS: Asset = Asset::new(
    "/main.js",
    "text/javascript; charset=utf-8",
    include_str!("../../www/main.js"),
);
