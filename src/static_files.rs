use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug)]
pub enum StaticError {
    BadPath,
    NotFound,
}

pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let rel = url_path.trim_start_matches('/');
        if rel.is_empty() {
            return Some(self.base_dir.join("index.html"));
        }
        let mut pb = self.base_dir.clone();
        for comp in Path::new(rel).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    pub fn content_type(path: &Path) -> &'static str {
        match path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase().as_str() {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }

    pub async fn load(&self, url_path: &str) -> Result<(Vec<u8>, &'static str), StaticError> {
        let path = self.map_path(url_path).ok_or(StaticError::BadPath)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e: io::Error| {
            tracing::debug!(path = %path.display(), error = %e, "static file unavailable");
            StaticError::NotFound
        })?;
        Ok((bytes, Self::content_type(&path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_path_prevents_traversal() {
        let sf = StaticFiles::new("public");
        assert!(sf.map_path("/../Cargo.toml").is_none());
        assert!(sf.map_path("/css/../../secret").is_none());
        assert_eq!(sf.map_path("/./app.js"), Some(PathBuf::from("public/app.js")));
    }

    #[test]
    fn root_maps_to_index() {
        let sf = StaticFiles::new("public");
        assert_eq!(sf.map_path("/"), Some(PathBuf::from("public/index.html")));
    }

    #[test]
    fn content_types() {
        assert_eq!(StaticFiles::content_type(Path::new("a/B.JPG")), "image/jpeg");
        assert_eq!(StaticFiles::content_type(Path::new("x.svg")), "image/svg+xml");
        assert_eq!(StaticFiles::content_type(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn load_plain_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("style.css"), "body{}").unwrap();
        let sf = StaticFiles::new(tmp.path());
        let (bytes, ct) = sf.load("/style.css").await.unwrap();
        assert_eq!(ct, "text/css");
        assert_eq!(bytes, b"body{}");
        assert!(matches!(sf.load("/missing.js").await, Err(StaticError::NotFound)));
    }
}
